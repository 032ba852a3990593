//! 快照存储
//!
//! 只保存一份当前权威快照，每次更新整体替换。

use std::fmt;

use chrono::{DateTime, Local};
use protocol::{GameState, SnapshotError};

/// 快照标识，每次替换递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotId(u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 快照来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// 启动时的 REST 拉取
    InitialFetch,
    /// 推送通道
    Push,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::InitialFetch => f.write_str("fetch"),
            SnapshotSource::Push => f.write_str("push"),
        }
    }
}

/// 已接收的快照
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub state: GameState,
    pub source: SnapshotSource,
    pub received_at: DateTime<Local>,
}

/// 快照存储
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<Snapshot>,
    next_id: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换当前快照
    ///
    /// 不满足不变量的快照被拒绝，原快照保持不变。
    /// 每次成功替换都会得到新的标识，不比较内容。
    pub fn replace(
        &mut self,
        state: GameState,
        source: SnapshotSource,
    ) -> Result<SnapshotId, SnapshotError> {
        state.validate()?;

        self.next_id += 1;
        let id = SnapshotId(self.next_id);
        self.current = Some(Snapshot {
            id,
            state,
            source,
            received_at: Local::now(),
        });
        Ok(id)
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    pub fn state(&self) -> Option<&GameState> {
        self.current.as_ref().map(|s| &s.state)
    }

    pub fn current_id(&self) -> Option<SnapshotId> {
        self.current.as_ref().map(|s| s.id)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
