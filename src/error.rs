//! 客户端错误类型。

use thiserror::Error;

/// 云盘 API 调用过程中可能出现的错误。
#[derive(Error, Debug)]
pub enum DriveError {
    /// 未配置凭证；登录流程暂不支持。
    #[error("no authorization configured; login is not supported yet")]
    Unauthenticated,

    /// 连接、TLS、超时等底层 I/O 失败。
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 服务端返回了非 2xx 状态码。
    #[error("request to {url} failed with HTTP {status}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },

    /// 请求体序列化或响应解析失败。
    #[error("failed to parse API payload: {0}")]
    Parse(String),

    #[error("upload range {offset}+{length} exceeds buffer of {len} bytes")]
    InvalidRange {
        offset: usize,
        length: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, DriveError>;

impl DriveError {
    pub(crate) fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DriveError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// `Api` 错误对应的 HTTP 状态码。
    pub fn status(&self) -> Option<u16> {
        match self {
            DriveError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, DriveError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_api_error_display_contains_url_and_status() {
        let error = DriveError::Api {
            url: "https://api.example.com/v2/file/list".to_string(),
            status: 404,
            body: "not found".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "request to https://api.example.com/v2/file/list failed with HTTP 404"
        );
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_transport_error_keeps_source() {
        let error = DriveError::transport(
            "https://api.example.com/v2/user/get",
            io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"),
        );

        assert!(error.to_string().contains("reset by peer"));
        assert!(error.source().is_some());
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_unauthenticated_helper() {
        assert!(DriveError::Unauthenticated.is_unauthenticated());
        assert!(!DriveError::Parse("x".to_string()).is_unauthenticated());
    }
}
