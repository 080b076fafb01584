use serde::{Deserialize, Serialize};

/// 云盘 API 的默认地址。
pub const DEFAULT_BASE_URL: &str = "https://api.aliyundrive.com/v2";

/// 客户端配置：由外部加载器填充 base_url 与 authorization，
/// drive_id 只在 `DriveApiClient::init` 中写入。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(alias = "url")]
    pub base_url: String,
    pub authorization: String,
    #[serde(alias = "driveId")]
    pub drive_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            authorization: String::new(),
            drive_id: String::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            authorization: authorization.into(),
            drive_id: String::new(),
        }
    }

    /// 空字符串表示尚未登录。
    pub fn is_logged_in(&self) -> bool {
        !self.authorization.trim().is_empty()
    }

    pub fn has_drive_id(&self) -> bool {
        !self.drive_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.is_logged_in());
        assert!(!config.has_drive_id());
    }

    #[test]
    fn test_deserialize_with_property_names() {
        let raw = r#"{
            "url": "https://drive.example.com/v2",
            "authorization": "token-1",
            "driveId": "d1"
        }"#;

        let config: ClientConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.base_url, "https://drive.example.com/v2");
        assert_eq!(config.authorization, "token-1");
        assert_eq!(config.drive_id, "d1");
        assert!(config.is_logged_in());
    }

    #[test]
    fn test_deserialize_missing_fields_falls_back_to_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"authorization":"t"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.drive_id.is_empty());
    }

    #[test]
    fn test_whitespace_token_is_not_logged_in() {
        let config = ClientConfig::new("https://drive.example.com", "   ");
        assert!(!config.is_logged_in());
    }
}
