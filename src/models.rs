use serde::Deserialize;

/// 身份接口 `/user/get` 的响应中我们关心的字段。
#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoDto {
    pub default_drive_id: Option<String>,
}
