//! 客户端主循环
//!
//! 单个任务串行处理推送事件、请求失败和终端输入。

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::board::render_session;
use crate::game::{ClientEvent, Controls, GameSession};
use crate::network::{GameApi, HttpGameApi, MoveDispatcher, PushChannel, PushConfig, PushEvent};
use crate::settings::ClientSettings;
use crate::terminal::{parse_command, Command, HELP_TEXT};

/// 事件通道容量
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 处理一行输入后的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// 继续，可选输出
    Continue(Option<String>),
    Quit,
}

/// 会话与请求分发的组合
pub struct Client<A: GameApi + 'static> {
    session: GameSession,
    dispatcher: MoveDispatcher<A>,
    in_flight: Vec<JoinHandle<()>>,
}

impl<A: GameApi + 'static> Client<A> {
    pub fn new(session: GameSession, dispatcher: MoveDispatcher<A>) -> Self {
        Self {
            session,
            dispatcher,
            in_flight: Vec::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// 处理事件，需要时发送请求
    pub fn handle_event(&mut self, event: ClientEvent) {
        if let Some(request) = self.session.handle_event(event) {
            self.in_flight.retain(|h| !h.is_finished());
            self.in_flight.push(self.dispatcher.dispatch(request));
        }
    }

    /// 处理一行终端输入
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let geometry = self.session.geometry();
        match parse_command(line, geometry.as_ref()) {
            Ok(None) => Flow::Continue(None),
            Ok(Some(Command::Input(input))) => {
                self.handle_event(ClientEvent::Input(input));
                Flow::Continue(Some(render_session(&self.session)))
            }
            Ok(Some(Command::Show)) => Flow::Continue(Some(render_session(&self.session))),
            Ok(Some(Command::Help)) => Flow::Continue(Some(HELP_TEXT.to_string())),
            Ok(Some(Command::Quit)) => Flow::Quit,
            Err(e) => Flow::Continue(Some(e.to_string())),
        }
    }

    /// 等待所有已发出的请求结束
    pub async fn drain(&mut self) {
        for handle in self.in_flight.drain(..) {
            if let Err(e) = handle.await {
                warn!("请求任务异常退出: {}", e);
            }
        }
    }
}

/// 运行终端客户端直到用户退出或输入结束
pub async fn run(settings: ClientSettings) -> Result<()> {
    info!("连接服务器: {}", settings.server_url);

    let api = Arc::new(HttpGameApi::new(&settings.server_url, settings.request_timeout())?);
    let (dispatcher, mut failures) = MoveDispatcher::new(Arc::clone(&api));
    let (events_tx, mut events_rx) = mpsc::channel::<ClientEvent>(EVENT_CHANNEL_CAPACITY);

    // 初始状态拉取
    let fetch = {
        let api = Arc::clone(&api);
        let tx = events_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_status().await;
            let _ = tx.send(ClientEvent::InitialStatus(result)).await;
        })
    };

    let push = PushChannel::start(PushConfig::from_settings(&settings)?, events_tx);

    let mut client = Client::new(
        GameSession::new(Controls::new(settings.chaos_level())),
        dispatcher,
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP_TEXT);

    loop {
        tokio::select! {
            Some(event) = events_rx.recv() => {
                let redraw = matches!(
                    event,
                    ClientEvent::InitialStatus(_) | ClientEvent::Push(PushEvent::Snapshot(_))
                );
                client.handle_event(event);
                if redraw {
                    println!("{}", render_session(client.session()));
                }
            }
            Some(failure) = failures.recv() => {
                println!("Request failed: {}", failure.error);
                client.handle_event(ClientEvent::RequestFailed(failure));
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match client.handle_line(&line) {
                    Flow::Continue(Some(output)) => println!("{}", output),
                    Flow::Continue(None) => {}
                    Flow::Quit => break,
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("读取输入失败: {}", e);
                    break;
                }
            },
        }
    }

    fetch.abort();
    push.shutdown().await;
    client.drain().await;
    info!("客户端已退出");
    Ok(())
}
