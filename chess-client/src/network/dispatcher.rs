//! 请求分发
//!
//! 每个写请求在独立任务中发送，不阻塞事件循环。
//! 失败通过类型化通道回报，不回滚本地状态，也不重试。

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use protocol::{BotConfigRequest, MoveRequest, NewGameRequest};

use super::GameApi;
use crate::error::RequestError;

/// 待发送的写请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundRequest {
    Move(MoveRequest),
    NewGame(NewGameRequest),
    BotConfig(BotConfigRequest),
}

impl fmt::Display for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundRequest::Move(req) => write!(f, "move {}", req),
            OutboundRequest::NewGame(req) => write!(f, "new game (chaos level {})", req.chaos_level),
            OutboundRequest::BotConfig(req) => {
                let names: Vec<&str> = req.bot_color_names.iter().map(|s| s.as_str()).collect();
                write!(f, "bot config [{}]", names.join(", "))
            }
        }
    }
}

/// 请求失败报告
#[derive(Debug)]
pub struct DispatchFailure {
    pub request: OutboundRequest,
    pub error: RequestError,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.request, self.error)
    }
}

/// 请求分发器
pub struct MoveDispatcher<A: GameApi + 'static> {
    api: Arc<A>,
    failures: mpsc::UnboundedSender<DispatchFailure>,
}

impl<A: GameApi + 'static> Clone for MoveDispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            failures: self.failures.clone(),
        }
    }
}

impl<A: GameApi + 'static> MoveDispatcher<A> {
    /// 创建分发器及其失败通道
    pub fn new(api: Arc<A>) -> (Self, mpsc::UnboundedReceiver<DispatchFailure>) {
        let (failures, rx) = mpsc::unbounded_channel();
        (Self { api, failures }, rx)
    }

    /// 发送请求（立即返回）
    pub fn dispatch(&self, request: OutboundRequest) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let failures = self.failures.clone();

        tokio::spawn(async move {
            debug!("Dispatching {}", request);
            let result = match &request {
                OutboundRequest::Move(req) => api.make_move(req).await,
                OutboundRequest::NewGame(req) => api.new_game(req).await,
                OutboundRequest::BotConfig(req) => api.set_bot_config(req).await,
            };

            if let Err(error) = result {
                let failure = DispatchFailure { request, error };
                error!("{}", failure);
                // 接收端已关闭说明客户端正在退出
                let _ = failures.send(failure);
            }
        })
    }
}
