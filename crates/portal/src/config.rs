//! Runtime configuration.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

const CHANNEL_PATH: &str = "/auth/stream";

/// Endpoints and storage location for one portal instance.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the REST API.
    pub api_url: String,
    /// Explicit push-channel URL; derived from `api_url` when unset.
    pub channel_url: Option<String>,
    /// Override for the session blob directory; OS data dir when unset.
    pub storage_dir: Option<PathBuf>,
}

impl PortalConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            channel_url: None,
            storage_dir: None,
        }
    }

    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let api_url = std::env::var("STAFFROOM_API_URL").unwrap_or_else(|_| {
            tracing::warn!("STAFFROOM_API_URL not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        let channel_url = std::env::var("STAFFROOM_CHANNEL_URL").ok();
        let storage_dir = std::env::var("STAFFROOM_DATA_DIR").ok().map(PathBuf::from);

        Self {
            api_url,
            channel_url,
            storage_dir,
        }
    }

    /// URL of the push channel.
    ///
    /// An explicit value wins; otherwise derived from `api_url` by swapping
    /// the scheme `http(s)` to `ws(s)` and appending the stream path.
    pub fn channel_url(&self) -> String {
        if let Some(url) = &self.channel_url {
            return url.clone();
        }

        let base = self.api_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };

        format!("{ws_base}{CHANNEL_PATH}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_url_is_derived_from_api_url() {
        let config = PortalConfig::new("http://portal.school.test:8080/");
        assert_eq!(
            config.channel_url(),
            "ws://portal.school.test:8080/auth/stream"
        );

        let tls = PortalConfig::new("https://portal.school.test");
        assert_eq!(tls.channel_url(), "wss://portal.school.test/auth/stream");
    }

    #[test]
    fn explicit_channel_url_wins() {
        let mut config = PortalConfig::new("http://portal.school.test");
        config.channel_url = Some("ws://push.school.test/stream".to_string());
        assert_eq!(config.channel_url(), "ws://push.school.test/stream");
    }
}
