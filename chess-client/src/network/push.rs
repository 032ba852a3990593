//! 快照推送通道
//!
//! 在 WebSocket 上完成 STOMP 握手并订阅快照主题，
//! 把每个 MESSAGE 帧解码为 `GameState` 投递到事件通道。
//! 断线后按重连策略退避重试；`shutdown` 之后不会再投递任何事件。

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use protocol::{GameState, StompCommand, StompFrame, MAX_MESSAGE_SIZE, SUBSCRIPTION_ID};

use super::{ConnectionStatus, PushEvent, ReconnectPolicy};
use crate::error::TransportError;
use crate::settings::ClientSettings;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 推送通道配置
#[derive(Debug, Clone, PartialEq)]
pub struct PushConfig {
    /// ws:// 或 wss:// 地址
    pub url: String,
    /// STOMP `host` 头
    pub host: String,
    /// 订阅主题
    pub topic: String,
    pub connect_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl PushConfig {
    /// 由 http(s) 服务器地址推导 ws(s) 地址
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransportError> {
        let invalid = || TransportError::InvalidUrl(settings.server_url.clone());

        let mut url = Url::parse(&settings.server_url).map_err(|_| invalid())?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            _ => return Err(invalid()),
        };
        url.set_scheme(scheme).map_err(|_| invalid())?;
        url.set_path(&settings.push_path);

        let host = url.host_str().ok_or_else(invalid)?.to_string();
        Ok(Self {
            url: url.to_string(),
            host,
            topic: settings.state_topic.clone(),
            connect_timeout: settings.connect_timeout(),
            reconnect: settings.reconnect_policy(),
        })
    }
}

/// 推送通道句柄
///
/// 句柄被丢弃时后台任务随之取消。
pub struct PushChannel {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PushChannel {
    /// 启动后台连接任务
    pub fn start<E>(config: PushConfig, events: mpsc::Sender<E>) -> Self
    where
        E: From<PushEvent> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_push_loop(config, events, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// 关闭通道并等待后台任务结束
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("推送任务异常退出: {}", e);
            }
        }
        info!("推送通道已关闭");
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// 投递事件；通道已取消或接收端已关闭时返回 false
async fn deliver<E: From<PushEvent>>(
    events: &mpsc::Sender<E>,
    cancel: &CancellationToken,
    event: PushEvent,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = events.send(E::from(event)) => sent.is_ok(),
    }
}

async fn run_push_loop<E>(config: PushConfig, events: mpsc::Sender<E>, cancel: CancellationToken)
where
    E: From<PushEvent> + Send + 'static,
{
    let mut attempt: u32 = 0;

    loop {
        let status = match attempt {
            0 => ConnectionStatus::Connecting,
            n => ConnectionStatus::Reconnecting { attempt: n },
        };
        if !deliver(&events, &cancel, PushEvent::Status(status)).await {
            return;
        }

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = connect_and_subscribe(&config) => result,
        };

        match connected {
            Ok(ws) => {
                info!("推送通道已连接: {} (topic {})", config.url, config.topic);
                attempt = 0;
                if !deliver(&events, &cancel, PushEvent::Status(ConnectionStatus::Connected)).await {
                    return;
                }
                match pump(ws, &events, &cancel).await {
                    Ok(()) => return,
                    Err(e) => warn!("推送通道断开: {}", e),
                }
            }
            Err(e) => warn!("推送通道连接失败: {}", e),
        }

        attempt += 1;
        if config.reconnect.is_exhausted(attempt) {
            error!("推送通道重连 {} 次后放弃", attempt - 1);
            deliver(&events, &cancel, PushEvent::Status(ConnectionStatus::Disconnected)).await;
            return;
        }

        let delay = config.reconnect.delay_for_attempt(attempt);
        debug!("{:?} 后重连 (attempt {})", delay, attempt);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// 建立 WebSocket 连接并完成 STOMP 握手与订阅
async fn connect_and_subscribe(config: &PushConfig) -> Result<WsStream, TransportError> {
    tokio::time::timeout(config.connect_timeout, handshake(config))
        .await
        .map_err(|_| TransportError::ConnectTimeout)?
}

async fn handshake(config: &PushConfig) -> Result<WsStream, TransportError> {
    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = Some(MAX_MESSAGE_SIZE);
    ws_config.max_frame_size = Some(MAX_MESSAGE_SIZE);
    let (mut ws, _) =
        tokio_tungstenite::connect_async_with_config(config.url.as_str(), Some(ws_config), false)
            .await?;

    send_frame(&mut ws, &StompFrame::connect(&config.host)).await?;

    loop {
        let msg = ws.next().await.ok_or(TransportError::ConnectionClosed)??;
        let Some(frame) = decode_message(msg)? else {
            continue;
        };
        match frame.command {
            StompCommand::Connected => {
                debug!(
                    "STOMP CONNECTED (version {})",
                    frame.header("version").unwrap_or("?")
                );
                break;
            }
            StompCommand::Error => {
                return Err(TransportError::HandshakeRejected(error_text(&frame)));
            }
            other => debug!("握手阶段忽略帧: {}", other),
        }
    }

    send_frame(&mut ws, &StompFrame::subscribe(SUBSCRIPTION_ID, &config.topic)).await?;
    Ok(ws)
}

/// 接收循环
///
/// 返回 Ok 表示主动停止（取消或接收端关闭），Err 表示需要重连。
async fn pump<E: From<PushEvent>>(
    ws: WsStream,
    events: &mpsc::Sender<E>,
    cancel: &CancellationToken,
) -> Result<(), TransportError> {
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let disconnect = Message::Text(StompFrame::disconnect().encode().into());
                let _ = write.send(disconnect).await;
                let _ = write.close().await;
                return Ok(());
            }
            msg = read.next() => {
                let msg = msg.ok_or(TransportError::ConnectionClosed)??;
                let frame = match decode_message(msg) {
                    Ok(Some(frame)) => frame,
                    Ok(None) => continue,
                    Err(TransportError::Protocol(e)) => {
                        warn!("无法解析 STOMP 帧，已跳过: {}", e);
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                match frame.command {
                    StompCommand::Message => match GameState::from_json(&frame.body) {
                        Ok(state) => {
                            trace!("收到快照 {}x{}, {} to move", state.width, state.height, state.color_to_move);
                            if !deliver(events, cancel, PushEvent::Snapshot(state)).await {
                                // 已取消时回到循环顶部发送 DISCONNECT
                                if cancel.is_cancelled() {
                                    continue;
                                }
                                return Ok(());
                            }
                        }
                        Err(e) => warn!("快照无效，已跳过: {}", e),
                    },
                    StompCommand::Error => error!("STOMP ERROR: {}", error_text(&frame)),
                    other => debug!("忽略帧: {}", other),
                }
            }
        }
    }
}

async fn send_frame(ws: &mut WsStream, frame: &StompFrame) -> Result<(), TransportError> {
    ws.send(Message::Text(frame.encode().into())).await?;
    Ok(())
}

/// WebSocket 消息转 STOMP 帧；心跳与控制帧返回 None
fn decode_message(msg: Message) -> Result<Option<StompFrame>, TransportError> {
    match msg {
        Message::Text(text) => Ok(StompFrame::decode(text.as_str())?),
        Message::Binary(data) => Ok(StompFrame::decode(&String::from_utf8_lossy(&data))?),
        Message::Close(_) => Err(TransportError::ConnectionClosed),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(None),
    }
}

fn error_text(frame: &StompFrame) -> String {
    frame
        .header("message")
        .map(str::to_string)
        .unwrap_or_else(|| frame.body.trim().to_string())
}
