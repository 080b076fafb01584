//! WebDAV 网关使用的云盘 REST API 客户端。
//!
//! 调用方先构建 [`ClientConfig`]，创建 [`DriveApiClient`] 后调用一次 `init`，
//! 之后按文件系统操作调用 `get` / `post` / `put` / `download` / `upload`。

pub mod client;
pub mod config;
pub mod error;
mod models;
pub mod transport;

pub use client::{DriveApiClient, USER_INFO_PATH};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{DriveError, Result};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
