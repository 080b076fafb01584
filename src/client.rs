//! 云盘 REST API 客户端，供 WebDAV 映射层调用。

use crate::config::ClientConfig;
use crate::error::{DriveError, Result};
use crate::models::UserInfoDto;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use serde::Serialize;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// 身份接口，返回的 JSON 中包含 `default_drive_id`。
pub const USER_INFO_PATH: &str = "/user/get";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// 失败响应中最多读取多少字节用于日志与错误信息。
const ERROR_BODY_LIMIT: u64 = 4096;

/// 云盘 API 的唯一出口。
///
/// `init` 需要 `&mut self`，其余调用只需 `&self`：先完成 `init`，
/// 再放进 `Arc` 交给并发的调用方，drive_id 之后不会再变化。
/// 客户端内部没有锁，也不做重试、限流与缓存。
pub struct DriveApiClient {
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

impl DriveApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// 使用默认的 reqwest 传输层构建客户端。
    pub fn with_default_transport(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(ReqwestTransport::new()?), config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 当前的 drive_id；`init` 成功之前为空字符串。
    pub fn drive_id(&self) -> &str {
        &self.config.drive_id
    }

    /// 清空已解析的 drive_id，下一次 `init` 会重新请求身份接口。
    pub fn reset_drive_id(&mut self) {
        self.config.drive_id.clear();
    }

    /// 启动时调用一次：校验凭证，并在 drive_id 为空时通过身份接口解析它。
    /// 重复调用是安全的，drive_id 已存在时不会产生网络请求。
    #[instrument(skip_all)]
    pub fn init(&mut self) -> Result<()> {
        self.login()?;
        if self.config.has_drive_id() {
            debug!("drive id already resolved: {}", self.config.drive_id);
            return Ok(());
        }

        let payload = self.post(USER_INFO_PATH, &serde_json::Map::new())?;
        let drive_id = parse_default_drive_id(&payload)?;
        info!("resolved default drive id {}", drive_id);
        self.config.drive_id = drive_id;
        Ok(())
    }

    // 登录流程尚未实现，只接受预先配置好的凭证。
    fn login(&self) -> Result<()> {
        if self.config.is_logged_in() {
            return Ok(());
        }
        error!("no authorization configured and login is not supported");
        Err(DriveError::Unauthenticated)
    }

    /// 把 API 相对路径拼成绝对地址；以 `http` 开头的视为已签名的绝对地址，原样返回。
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        format!("{}{}", self.config.base_url, path)
    }

    /// 以流的形式下载绝对地址上的文件内容。
    ///
    /// 返回的 reader 持有底层连接，调用方读完或丢弃它时连接才会释放。
    #[instrument(skip_all, fields(url = %url))]
    pub fn download(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        let response = self.send(HttpRequest::new(HttpMethod::Get, url))?;
        info!("download {}, code {}", url, response.status);
        if !response.is_success() {
            return Err(api_failure(url, response));
        }
        Ok(response.body)
    }

    /// 把 `data[offset..offset + length]` 作为 PUT 请求体上传，不设置 Content-Type。
    #[instrument(skip_all, fields(url = %url, offset = offset, length = length))]
    pub fn upload(&self, url: &str, data: &[u8], offset: usize, length: usize) -> Result<()> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= data.len())
            .ok_or(DriveError::InvalidRange {
                offset,
                length,
                len: data.len(),
            })?;

        let request = HttpRequest::new(HttpMethod::Put, url).body(data[offset..end].to_vec());
        let response = self.send(request)?;
        info!("upload {}, code {}", url, response.status);
        if !response.is_success() {
            return Err(api_failure(url, response));
        }
        drain(url, response);
        Ok(())
    }

    /// 以 JSON 发送 POST 请求，返回响应文本（无 body 时为空字符串）。
    #[instrument(skip_all, fields(path = %path))]
    pub fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        self.send_json(HttpMethod::Post, path, body)
    }

    /// 与 `post` 相同，但使用 PUT。
    #[instrument(skip_all, fields(path = %path))]
    pub fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        self.send_json(HttpMethod::Put, path, body)
    }

    /// GET 请求，`params` 逐个追加为 URL 查询参数。
    #[instrument(skip_all, fields(path = %path))]
    pub fn get<I, K, V>(&self, path: &str, params: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let resolved = self.resolve_url(path);
        let mut url = Url::parse(&resolved).map_err(|e| {
            error!("invalid request url {}: {}", resolved, e);
            DriveError::transport(&resolved, e)
        })?;

        let pairs: Vec<(K, V)> = params.into_iter().collect();
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));
        }

        let url = url.to_string();
        let response = self.send(HttpRequest::new(HttpMethod::Get, &url))?;
        info!("get {}, code {}", url, response.status);
        read_text(&url, response)
    }

    fn send_json<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &T,
    ) -> Result<String> {
        let url = self.resolve_url(path);
        let payload = serde_json::to_vec(body).map_err(|e| {
            error!("failed to serialize request body for {}: {}", url, e);
            DriveError::Parse(format!("failed to serialize request body: {e}"))
        })?;
        debug!(
            "{} {}, body {}",
            method.as_str(),
            url,
            String::from_utf8_lossy(&payload)
        );

        let request = HttpRequest::new(method, &url)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body(payload);
        let response = self.send(request)?;
        info!("{} {}, code {}", method.as_str(), url, response.status);
        read_text(&url, response)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.transport.execute(request).map_err(|e| {
            error!("request to {} failed: {}", url, e);
            e
        })
    }
}

fn parse_default_drive_id(payload: &str) -> Result<String> {
    let info: UserInfoDto = serde_json::from_str(payload).map_err(|e| {
        error!("failed to parse user info: {}", e);
        DriveError::Parse(format!("failed to parse user info: {e}"))
    })?;

    info.default_drive_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            error!("user info response has no default_drive_id");
            DriveError::Parse("missing default_drive_id in user info".to_string())
        })
}

/// 校验状态码并读取完整响应文本。
fn read_text(url: &str, response: HttpResponse) -> Result<String> {
    if !response.is_success() {
        return Err(api_failure(url, response));
    }
    response.into_text().map_err(|e| {
        error!("failed to read response body from {}: {}", url, e);
        DriveError::transport(url, e)
    })
}

/// 尽力读取失败响应的 body 用于诊断；读取本身出错时不覆盖原始错误。
fn api_failure(url: &str, response: HttpResponse) -> DriveError {
    let status = response.status;
    let mut buf = Vec::new();
    if let Err(e) = response.body.take(ERROR_BODY_LIMIT).read_to_end(&mut buf) {
        warn!("failed to read error body from {}: {}", url, e);
    }
    let body = String::from_utf8_lossy(&buf).into_owned();
    error!("request failed, url={}, code={}, body={}", url, status, body);
    DriveError::Api {
        url: url.to_string(),
        status,
        body,
    }
}

// 读掉剩余的 body，让连接可以复用。
fn drain(url: &str, mut response: HttpResponse) {
    if let Err(e) = io::copy(&mut response.body, &mut io::sink()) {
        debug!("failed to drain response body from {}: {}", url, e);
    }
}
