//! HTTP 传输层：客户端只依赖 `HttpTransport`，默认实现基于 reqwest 的阻塞客户端。

use crate::error::{DriveError, Result};
use reqwest::{blocking::Client, redirect::Policy};
use std::fmt;
use std::io::{Cursor, Read};
use std::time::Duration;

/// 默认请求超时；大文件上传下载也走同一个客户端，因此放得比较宽。
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}

/// 单次请求的描述，url 已经是绝对地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// 响应：状态码 + 惰性读取的 body。body 被 drop 时连接随之释放。
pub struct HttpResponse {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, Cursor::new(body.into()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 读完整个 body 并按 UTF-8（容错）解码。
    pub fn into_text(mut self) -> std::io::Result<String> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// 阻塞式 HTTP 传输。实现必须可以跨线程共享。
pub trait HttpTransport: Send + Sync {
    /// 发出请求并在收到响应头后返回；body 由调用方负责读取或丢弃。
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// 基于 `reqwest::blocking::Client` 的默认传输实现。
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_blocking_client(timeout)?,
        })
    }

    /// 复用调用方已经配置好的 reqwest 客户端。
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method.into(), &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(bytes) = body {
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .map_err(|e| DriveError::transport(&url, e))?;
        let status = response.status().as_u16();
        Ok(HttpResponse::new(status, response))
    }
}

/// 构建带统一超时与重定向策略的阻塞式 HTTP 客户端。
pub(crate) fn build_blocking_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(Policy::limited(10))
        .build()
        .map_err(|e| DriveError::transport("<client builder>", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_collects_headers_and_body() {
        let request = HttpRequest::new(HttpMethod::Post, "https://api.example.com/v2/user/get")
            .header("Content-Type", "application/json; charset=utf-8")
            .body(b"{}".to_vec());

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.header_value("content-type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::from_bytes(200, "").is_success());
        assert!(HttpResponse::from_bytes(299, "").is_success());
        assert!(!HttpResponse::from_bytes(199, "").is_success());
        assert!(!HttpResponse::from_bytes(300, "").is_success());
        assert!(!HttpResponse::from_bytes(404, "").is_success());
    }

    #[test]
    fn test_response_into_text() {
        let response = HttpResponse::from_bytes(200, "{\"ok\":true}");
        assert_eq!(response.into_text().unwrap(), "{\"ok\":true}");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(reqwest::Method::from(HttpMethod::Put), reqwest::Method::PUT);
    }

    #[test]
    fn test_build_blocking_client() {
        assert!(ReqwestTransport::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
