//! 游戏逻辑模块
//!
//! `GameSession` 是唯一的状态持有者：所有事件（快照、连接状态、
//! 用户输入、请求失败）按到达顺序在同一个任务中处理。

mod controls;
mod move_index;
mod selection;
mod store;

pub use controls::*;
pub use move_index::*;
pub use selection::*;
pub use store::*;

use tracing::{debug, error, info, warn};

use protocol::{ChaosLevel, GameState, Side, SquareIndex};

use crate::board::{BoardGeometry, BoardView};
use crate::error::RequestError;
use crate::network::{ConnectionStatus, DispatchFailure, OutboundRequest, PushEvent};

/// 用户输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// 点击格子
    Click(SquareIndex),
    /// 鼠标进入格子
    HoverEnter(SquareIndex),
    /// 鼠标离开棋盘
    HoverLeave,
    /// 选择升变棋子
    ChoosePromotion(String),
    /// 关闭升变选择
    CancelPromotion,
    /// 开始新对局（可同时指定混沌等级）
    NewGame(Option<ChaosLevel>),
    /// 调整混沌等级
    SetChaosLevel(ChaosLevel),
    /// 切换一方是否由机器人控制
    ToggleBot(Side),
}

/// 客户端事件
#[derive(Debug)]
pub enum ClientEvent {
    /// 启动时的状态拉取结果
    InitialStatus(Result<Option<GameState>, RequestError>),
    /// 推送通道事件
    Push(PushEvent),
    /// 用户输入
    Input(UserInput),
    /// 写请求失败
    RequestFailed(DispatchFailure),
}

impl From<PushEvent> for ClientEvent {
    fn from(event: PushEvent) -> Self {
        ClientEvent::Push(event)
    }
}

impl From<UserInput> for ClientEvent {
    fn from(input: UserInput) -> Self {
        ClientEvent::Input(input)
    }
}

/// 客户端会话
#[derive(Debug, Default)]
pub struct GameSession {
    store: SnapshotStore,
    index: MoveOptionIndex,
    selection: SelectionState,
    controls: Controls,
    connection: ConnectionStatus,
    /// 初始拉取失败信息（收到快照后清除）
    load_error: Option<String>,
    /// 最近一次写请求失败
    last_failure: Option<String>,
}

impl GameSession {
    pub fn new(controls: Controls) -> Self {
        Self {
            controls,
            ..Self::default()
        }
    }

    /// 处理一个事件，返回需要发送的写请求（如果有）
    pub fn handle_event(&mut self, event: ClientEvent) -> Option<OutboundRequest> {
        match event {
            ClientEvent::InitialStatus(Ok(Some(state))) => {
                self.apply_snapshot(state, SnapshotSource::InitialFetch);
                None
            }
            ClientEvent::InitialStatus(Ok(None)) => {
                info!("No game on server yet");
                None
            }
            ClientEvent::InitialStatus(Err(e)) => {
                error!("Failed to fetch initial game state: {}", e);
                self.load_error = Some(e.to_string());
                None
            }
            ClientEvent::Push(PushEvent::Snapshot(state)) => {
                self.apply_snapshot(state, SnapshotSource::Push);
                None
            }
            ClientEvent::Push(PushEvent::Status(status)) => {
                if status != self.connection {
                    info!("推送通道状态: {}", status);
                }
                self.connection = status;
                None
            }
            ClientEvent::Input(input) => self.handle_input(input),
            ClientEvent::RequestFailed(failure) => {
                self.last_failure = Some(failure.error.to_string());
                None
            }
        }
    }

    /// 替换快照，重建走法索引并重置选择
    ///
    /// 无效快照被丢弃，当前状态保持不变。
    pub fn apply_snapshot(&mut self, state: GameState, source: SnapshotSource) -> Option<SnapshotId> {
        match self.store.replace(state, source) {
            Ok(id) => {
                if let Some(state) = self.store.state() {
                    self.index = MoveOptionIndex::build(&state.pseudolegal_move_options);
                    debug!(
                        "Snapshot {} from {:?}: {} to move, {} move options",
                        id,
                        source,
                        state.color_to_move,
                        self.index.len()
                    );
                    if state.is_over() {
                        info!("Game over: {:?}", state.game_outcome);
                    }
                }
                self.selection.reset();
                self.load_error = None;
                Some(id)
            }
            Err(e) => {
                warn!("Rejected snapshot from {:?}: {}", source, e);
                None
            }
        }
    }

    fn handle_input(&mut self, input: UserInput) -> Option<OutboundRequest> {
        match input {
            UserInput::Click(square) => {
                let Some(state) = self.store.state() else {
                    debug!("Click on square {} ignored: no game loaded", square);
                    return None;
                };
                self.selection
                    .click(state, &self.index, square)
                    .map(OutboundRequest::Move)
            }
            UserInput::HoverEnter(square) => {
                self.selection.hover_enter(square);
                None
            }
            UserInput::HoverLeave => {
                self.selection.hover_leave();
                None
            }
            UserInput::ChoosePromotion(piece_name) => {
                let state = self.store.state()?;
                match self.selection.choose_promotion(state, &piece_name) {
                    Ok(request) => Some(OutboundRequest::Move(request)),
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                }
            }
            UserInput::CancelPromotion => {
                self.selection.cancel_promotion();
                None
            }
            UserInput::NewGame(level) => {
                if let Some(level) = level {
                    self.controls.set_chaos_level(level);
                }
                Some(OutboundRequest::NewGame(self.controls.new_game_request()))
            }
            UserInput::SetChaosLevel(level) => {
                self.controls.set_chaos_level(level);
                None
            }
            UserInput::ToggleBot(side) => {
                Some(OutboundRequest::BotConfig(self.controls.toggle_bot(side)))
            }
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.store.state()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.store.current()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn index(&self) -> &MoveOptionIndex {
        &self.index
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn geometry(&self) -> Option<BoardGeometry> {
        self.store
            .state()
            .and_then(|s| BoardGeometry::new(s.width, s.height))
    }

    /// 当前棋盘视图；尚无快照时返回 None
    pub fn board_view(&self) -> Option<BoardView> {
        self.store
            .state()
            .map(|state| BoardView::build(state, &self.index, &self.selection))
    }
}
