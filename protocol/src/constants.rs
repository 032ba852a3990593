//! 协议常量定义

/// 默认服务器地址
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// REST 接口前缀
pub const API_BASE_PATH: &str = "/api/game";

/// 推送通道端点（SockJS 端点下的原生 WebSocket 通道）
pub const PUSH_ENDPOINT_PATH: &str = "/ws/websocket";

/// 棋局快照推送主题
pub const GAME_STATE_TOPIC: &str = "/topic/game-state";

/// STOMP 协议版本
pub const STOMP_VERSION: &str = "1.2";

/// 订阅 ID（客户端只订阅一个主题）
pub const SUBSCRIPTION_ID: &str = "sub-0";

/// 推送消息最大大小
pub const MAX_MESSAGE_SIZE: usize = 1 << 20;

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 请求超时（秒）
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// 重连初始间隔（毫秒）
pub const RECONNECT_INITIAL_DELAY_MS: u64 = 500;

/// 重连最大间隔（毫秒）
pub const RECONNECT_MAX_DELAY_MS: u64 = 10_000;
