//! REST 请求通道
//!
//! 初始状态拉取与三个写接口。写接口成功时服务端返回 204，
//! 新状态只通过推送通道到达。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

use protocol::{
    ApiEndpoint, BotConfigRequest, ErrorBody, GameState, MoveRequest, NewGameRequest,
    API_BASE_PATH,
};

use crate::error::RequestError;

/// 服务端错误体中没有可用信息时的文案
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// 游戏服务接口
#[async_trait]
pub trait GameApi: Send + Sync {
    /// 拉取当前状态，尚无对局时返回 None
    async fn fetch_status(&self) -> Result<Option<GameState>, RequestError>;

    /// 开始新对局
    async fn new_game(&self, request: &NewGameRequest) -> Result<(), RequestError>;

    /// 提交走法
    async fn make_move(&self, request: &MoveRequest) -> Result<(), RequestError>;

    /// 设置由机器人控制的阵营
    async fn set_bot_config(&self, request: &BotConfigRequest) -> Result<(), RequestError>;
}

/// 基于 reqwest 的实现
#[derive(Debug, Clone)]
pub struct HttpGameApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGameApi {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}{}", server_url.trim_end_matches('/'), API_BASE_PATH),
        })
    }

    fn url(&self, endpoint: ApiEndpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    async fn post<T: Serialize + Sync>(
        &self,
        endpoint: ApiEndpoint,
        body: &T,
    ) -> Result<(), RequestError> {
        let url = self.url(endpoint);
        debug!("POST {}", url);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(server_error(status, &body));
        }
        Ok(())
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn fetch_status(&self) -> Result<Option<GameState>, RequestError> {
        let url = self.url(ApiEndpoint::Status);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(server_error(status, &body));
        }
        if status == StatusCode::NO_CONTENT {
            info!("服务端暂无对局");
            return Ok(None);
        }

        let body = resp.text().await?;
        let state: Option<GameState> = if body.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&body)?
        };
        if state.is_none() {
            info!("服务端暂无对局");
        }
        Ok(state)
    }

    async fn new_game(&self, request: &NewGameRequest) -> Result<(), RequestError> {
        self.post(ApiEndpoint::NewGame, request).await
    }

    async fn make_move(&self, request: &MoveRequest) -> Result<(), RequestError> {
        self.post(ApiEndpoint::Move, request).await
    }

    async fn set_bot_config(&self, request: &BotConfigRequest) -> Result<(), RequestError> {
        self.post(ApiEndpoint::BotConfig, request).await
    }
}

fn server_error(status: StatusCode, body: &str) -> RequestError {
    RequestError::Server {
        status: status.as_u16(),
        message: error_message(status, body),
    }
}

/// 从错误响应中提取用户可读的信息
///
/// 优先使用 JSON 体中的 `message`；JSON 无该字段时为 `Unknown error`；
/// 响应体无法解析时使用状态码的标准短语。
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
        Err(_) => status
            .canonical_reason()
            .unwrap_or(UNKNOWN_ERROR_MESSAGE)
            .to_string(),
    }
}
