//! STOMP 1.2 帧编解码
//!
//! 推送通道在 WebSocket 文本消息上承载 STOMP 帧，
//! 每条 WebSocket 消息恰好是一个帧（或一个心跳换行）。

use std::fmt;

use crate::constants::STOMP_VERSION;
use crate::error::{ProtocolError, Result};

/// STOMP 命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StompCommand {
    // === 客户端帧 ===
    Connect,
    Stomp,
    Send,
    Subscribe,
    Unsubscribe,
    Disconnect,

    // === 服务端帧 ===
    Connected,
    Message,
    Receipt,
    Error,
}

impl StompCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            StompCommand::Connect => "CONNECT",
            StompCommand::Stomp => "STOMP",
            StompCommand::Send => "SEND",
            StompCommand::Subscribe => "SUBSCRIBE",
            StompCommand::Unsubscribe => "UNSUBSCRIBE",
            StompCommand::Disconnect => "DISCONNECT",
            StompCommand::Connected => "CONNECTED",
            StompCommand::Message => "MESSAGE",
            StompCommand::Receipt => "RECEIPT",
            StompCommand::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let command = match s {
            "CONNECT" => StompCommand::Connect,
            "STOMP" => StompCommand::Stomp,
            "SEND" => StompCommand::Send,
            "SUBSCRIBE" => StompCommand::Subscribe,
            "UNSUBSCRIBE" => StompCommand::Unsubscribe,
            "DISCONNECT" => StompCommand::Disconnect,
            "CONNECTED" => StompCommand::Connected,
            "MESSAGE" => StompCommand::Message,
            "RECEIPT" => StompCommand::Receipt,
            "ERROR" => StompCommand::Error,
            _ => return None,
        };
        Some(command)
    }

    /// CONNECT / CONNECTED 帧的头部不做转义
    fn escapes_headers(&self) -> bool {
        !matches!(self, StompCommand::Connect | StompCommand::Connected)
    }
}

impl fmt::Display for StompCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// STOMP 帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StompFrame {
    pub command: StompCommand,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StompFrame {
    pub fn new(command: StompCommand) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// 追加头部
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 设置消息体
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// 读取头部（重复头部以第一个为准）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 连接帧，禁用心跳
    pub fn connect(host: &str) -> Self {
        Self::new(StompCommand::Connect)
            .with_header("accept-version", STOMP_VERSION)
            .with_header("host", host)
            .with_header("heart-beat", "0,0")
    }

    /// 订阅帧
    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(StompCommand::Subscribe)
            .with_header("id", id)
            .with_header("destination", destination)
            .with_header("ack", "auto")
    }

    /// 断开帧
    pub fn disconnect() -> Self {
        Self::new(StompCommand::Disconnect)
    }

    /// 编码为线上文本（以 NUL 结尾）
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');

        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }

        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// 解码一条线上文本
    ///
    /// 纯心跳（只有换行）返回 `Ok(None)`。
    pub fn decode(raw: &str) -> Result<Option<Self>> {
        let frame = raw.trim_start_matches(['\r', '\n']);
        if frame.is_empty() {
            return Ok(None);
        }

        let (head, rest) = split_head(frame)?;
        let mut lines = head.lines();

        let command_line = lines
            .next()
            .ok_or_else(|| ProtocolError::stomp("missing command"))?;
        let command = StompCommand::parse(command_line)
            .ok_or_else(|| ProtocolError::stomp(format!("unknown command: {}", command_line)))?;
        let unescape = command.escapes_headers();

        let mut headers = Vec::new();
        for line in lines.filter(|line| !line.is_empty()) {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ProtocolError::stomp(format!("invalid header line: {}", line)))?;
            if unescape {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let mut frame = Self {
            command,
            headers,
            body: String::new(),
        };
        frame.body = match frame.header("content-length") {
            Some(len) => {
                let len: usize = len
                    .trim()
                    .parse()
                    .map_err(|_| ProtocolError::stomp(format!("invalid content-length: {}", len)))?;
                rest.get(..len)
                    .ok_or_else(|| ProtocolError::stomp("body shorter than content-length"))?
                    .to_string()
            }
            None => match rest.find('\0') {
                Some(end) => rest[..end].to_string(),
                None => rest.to_string(),
            },
        };

        Ok(Some(frame))
    }
}

/// 在第一个空行处拆分头部与消息体
fn split_head(frame: &str) -> Result<(&str, &str)> {
    let lf = frame.find("\n\n").map(|pos| (pos, 2));
    let crlf = frame.find("\r\n\r\n").map(|pos| (pos, 4));
    let (pos, sep) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 < b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => {
            // 没有头部的帧，如 "DISCONNECT\n\0"
            let trimmed = frame.trim_end_matches('\0');
            let head = trimmed.trim_end_matches(['\r', '\n']);
            if head.lines().count() == 1 {
                return Ok((head, ""));
            }
            return Err(ProtocolError::stomp("missing header terminator"));
        }
    };
    Ok((&frame[..pos], &frame[pos + sep..]))
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_header(value: &str) -> Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(ProtocolError::stomp(format!(
                    "invalid header escape: \\{}",
                    other.map(String::from).unwrap_or_default()
                )))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_connect() {
        let text = StompFrame::connect("localhost:8080").encode();
        assert_eq!(
            text,
            "CONNECT\naccept-version:1.2\nhost:localhost:8080\nheart-beat:0,0\n\n\0"
        );
    }

    #[test]
    fn test_encode_subscribe() {
        let text = StompFrame::subscribe("sub-0", "/topic/game-state").encode();
        assert!(text.starts_with("SUBSCRIBE\n"));
        assert!(text.contains("destination:/topic/game-state\n"));
        assert!(text.ends_with("\n\n\0"));
    }

    #[test]
    fn test_decode_message_with_content_length() {
        let raw = "MESSAGE\ndestination:/topic/game-state\ncontent-type:application/json\n\
                   subscription:sub-0\nmessage-id:1\ncontent-length:7\n\n{\"a\":1}\0";
        let frame = StompFrame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, StompCommand::Message);
        assert_eq!(frame.header("destination"), Some("/topic/game-state"));
        assert_eq!(frame.body, "{\"a\":1}");
    }

    #[test]
    fn test_decode_without_content_length_stops_at_nul() {
        let raw = "ERROR\nmessage:bad\n\nsomething broke\0\n";
        let frame = StompFrame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, StompCommand::Error);
        assert_eq!(frame.header("message"), Some("bad"));
        assert_eq!(frame.body, "something broke");
    }

    #[test]
    fn test_decode_heartbeat() {
        assert_eq!(StompFrame::decode("\n").unwrap(), None);
        assert_eq!(StompFrame::decode("\r\n").unwrap(), None);
    }

    #[test]
    fn test_decode_connected_crlf() {
        let raw = "CONNECTED\r\nversion:1.2\r\nheart-beat:0,0\r\n\r\n\0";
        let frame = StompFrame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, StompCommand::Connected);
        assert_eq!(frame.header("version"), Some("1.2"));
        assert!(frame.body.is_empty());
    }

    #[test]
    fn test_header_escaping() {
        let frame = StompFrame::new(StompCommand::Send)
            .with_header("destination", "/queue/a:b")
            .with_body("x");
        let text = frame.encode();
        assert!(text.contains("destination:/queue/a\\cb\n"));

        let decoded = StompFrame::decode(&text).unwrap().unwrap();
        assert_eq!(decoded.header("destination"), Some("/queue/a:b"));
        assert_eq!(decoded.body, "x");
    }

    #[test]
    fn test_repeated_header_first_wins() {
        let raw = "MESSAGE\nfoo:1\nfoo:2\n\n\0";
        let frame = StompFrame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.header("foo"), Some("1"));
    }

    #[test]
    fn test_unknown_command() {
        assert!(StompFrame::decode("HELLO\n\n\0").is_err());
    }

    #[test]
    fn test_frame_without_headers() {
        let frame = StompFrame::decode("DISCONNECT\n\0").unwrap().unwrap();
        assert_eq!(frame.command, StompCommand::Disconnect);
        assert!(frame.headers.is_empty());
    }
}
