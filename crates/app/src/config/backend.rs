use std::time::Duration;

use clap::Args;

use crate::backend::HttpBackendConfig;

#[derive(Debug, Args)]
pub struct BackendConfig {
    /// Backend scheme and host
    #[arg(long, env = "KIOSK_BACKEND_URL")]
    pub backend_url: String,

    /// Path prefix of kiosk endpoints
    #[arg(long, env = "KIOSK_API_PATH", default_value = "swayam")]
    pub kiosk_path: String,

    /// Path prefix of public API endpoints
    #[arg(long, env = "KIOSK_PUBLIC_API_PATH", default_value = "api/public/v1")]
    pub public_path: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "KIOSK_REQUEST_TIMEOUT_SECONDS", default_value_t = 30)]
    pub request_timeout_seconds: u64,
}

impl BackendConfig {
    pub fn to_http(&self) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: self.backend_url.clone(),
            kiosk_path: self.kiosk_path.clone(),
            public_path: self.public_path.clone(),
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }
}
