//! 客户端设置模块
//!
//! 提供设置数据结构和从配置文件加载的逻辑。
//! 设置只读取，不回写（界面偏好不做持久化）。

use std::path::{Path, PathBuf};
use std::time::Duration;

use protocol::{
    ChaosLevel, CONNECT_TIMEOUT_SECS, DEFAULT_SERVER_URL, GAME_STATE_TOPIC, PUSH_ENDPOINT_PATH,
    RECONNECT_INITIAL_DELAY_MS, RECONNECT_MAX_DELAY_MS, REQUEST_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

use crate::network::ReconnectPolicy;

/// 覆盖服务器地址的环境变量
pub const SERVER_ENV_VAR: &str = "CHAOS_CHESS_SERVER";

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// tracing-subscriber 过滤指令中的级别名
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 断线重连设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    /// 首次重连间隔（毫秒）
    pub initial_delay_ms: u64,
    /// 最大重连间隔（毫秒）
    pub max_delay_ms: u64,
    /// 最大重连次数，0 表示不限
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: RECONNECT_INITIAL_DELAY_MS,
            max_delay_ms: RECONNECT_MAX_DELAY_MS,
            max_attempts: 0,
        }
    }
}

/// 客户端设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    // === 网络设置 ===
    /// 服务器地址（http 或 https）
    pub server_url: String,
    /// 推送通道路径
    pub push_path: String,
    /// 快照推送主题
    pub state_topic: String,
    /// REST 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 推送通道握手超时（秒）
    pub connect_timeout_secs: u64,
    /// 断线重连
    pub reconnect: ReconnectSettings,

    // === 游戏设置 ===
    /// 新对局默认混沌等级（0-2）
    pub default_chaos_level: i32,

    // === 高级设置 ===
    /// 日志级别
    pub log_level: LogLevel,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            push_path: PUSH_ENDPOINT_PATH.to_string(),
            state_topic: GAME_STATE_TOPIC.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            reconnect: ReconnectSettings::default(),
            default_chaos_level: 0,
            log_level: LogLevel::default(),
        }
    }
}

impl ClientSettings {
    /// 获取设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("chaos-chess");
            path.push("client.json");
            path
        })
    }

    /// 从默认位置加载设置，并应用环境变量覆盖
    pub fn load() -> Self {
        let settings = match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("无法获取配置目录，使用默认设置");
                Self::default()
            }
        };
        settings.with_server_override(std::env::var(SERVER_ENV_VAR).ok())
    }

    /// 从指定文件加载设置，文件缺失或无效时回退到默认值
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("设置文件不存在，使用默认设置");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("已加载设置: {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("设置文件格式无效: {}，使用默认设置", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("无法读取设置文件: {}，使用默认设置", e);
                Self::default()
            }
        }
    }

    /// 用非空的覆盖值替换服务器地址
    pub fn with_server_override(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = server_url.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            tracing::info!("服务器地址由环境变量覆盖: {}", url);
            self.server_url = url;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn chaos_level(&self) -> ChaosLevel {
        ChaosLevel::from_level(self.default_chaos_level)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.reconnect.initial_delay_ms),
            max_delay: Duration::from_millis(self.reconnect.max_delay_ms),
            backoff_factor: 2.0,
            max_attempts: match self.reconnect.max_attempts {
                0 => None,
                n => Some(n),
            },
        }
    }
}
