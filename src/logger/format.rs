//! Access log format module
//!
//! Supports three line formats:
//! - `simple` (default): `GET /path HTTP/1.1 <200> - [127.0.0.1] curl/8.0`
//! - `combined` (Apache/Nginx combined format)
//! - `json` (one JSON object per line)

use chrono::Local;
use std::net::IpAddr;

/// Access log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessLogFormat {
    #[default]
    Simple,
    Combined,
    Json,
}

impl AccessLogFormat {
    /// Parse a configured format name, unknown names fall back to `simple`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "combined" => Self::Combined,
            "json" => Self::Json,
            _ => Self::Simple,
        }
    }
}

/// Access log entry for one completed request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: IpAddr,
    /// Time the entry was created
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Protocol as sent on the wire, e.g. `HTTP/1.1`
    pub protocol: String,
    /// Final response status code
    pub status: u16,
    /// First User-Agent header value, empty if absent
    pub user_agent: String,
    /// Body bytes the response announces
    pub body_bytes: u64,
}

impl AccessLogEntry {
    /// Format the log entry according to the specified format
    pub fn format(&self, format: AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Simple => self.format_simple(),
            AccessLogFormat::Combined => self.format_combined(),
            AccessLogFormat::Json => self.format_json(),
        }
    }

    fn format_simple(&self) -> String {
        format!(
            "{} {} {} <{}> - [{}] {}",
            self.method, self.path, self.protocol, self.status, self.remote_addr, self.user_agent
        )
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "-" "$http_user_agent"`
    fn format_combined(&self) -> String {
        let user_agent = if self.user_agent.is_empty() {
            "-"
        } else {
            &self.user_agent
        };
        format!(
            "{} - - [{}] \"{} {} {}\" {} {} \"-\" \"{}\"",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.protocol,
            self.status,
            self.body_bytes,
            user_agent,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "time": self.time.to_rfc3339(),
            "remote_addr": self.remote_addr.to_string(),
            "method": self.method,
            "path": self.path,
            "protocol": self.protocol,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "user_agent": self.user_agent,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn create_test_entry() -> AccessLogEntry {
        AccessLogEntry {
            remote_addr: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)),
            time: Local::now(),
            method: "GET".to_string(),
            path: "/videos/clip.mp4".to_string(),
            protocol: "HTTP/1.1".to_string(),
            status: 206,
            user_agent: "Mozilla/5.0".to_string(),
            body_bytes: 500,
        }
    }

    #[test]
    fn test_format_simple() {
        let log = create_test_entry().format(AccessLogFormat::Simple);
        assert_eq!(
            log,
            "GET /videos/clip.mp4 HTTP/1.1 <206> - [192.168.1.1] Mozilla/5.0"
        );
    }

    #[test]
    fn test_format_simple_without_user_agent() {
        let mut entry = create_test_entry();
        entry.user_agent.clear();
        entry.status = 404;
        let log = entry.format(AccessLogFormat::Simple);
        assert_eq!(log, "GET /videos/clip.mp4 HTTP/1.1 <404> - [192.168.1.1] ");
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().format(AccessLogFormat::Combined);
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"GET /videos/clip.mp4 HTTP/1.1\" 206 500"));
        assert!(log.ends_with("\"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format(AccessLogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "192.168.1.1");
        assert_eq!(value["status"], 206);
        assert_eq!(value["body_bytes"], 500);
        assert_eq!(value["user_agent"], "Mozilla/5.0");
    }

    #[test]
    fn test_parse_format_names() {
        assert_eq!(AccessLogFormat::parse("JSON"), AccessLogFormat::Json);
        assert_eq!(AccessLogFormat::parse("combined"), AccessLogFormat::Combined);
        assert_eq!(AccessLogFormat::parse("whatever"), AccessLogFormat::Simple);
    }
}
