use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store_url: String,
    pub store_username: String,
    pub store_password: String,
    /// Accept self-signed store certificates. Off unless a dev cluster
    /// explicitly opts in.
    pub store_insecure: bool,
    pub gateway_url: String,
    pub bot_token: String,
    pub api_bind: String,
    pub crawl_interval_secs: u64,
    pub notify_interval_secs: u64,
}

impl Settings {
    /// Credentials and hosts default to empty strings when unset; the process
    /// still starts and the first external call fails with a clear store or
    /// source error instead.
    pub fn from_env() -> Self {
        let store_url = std::env::var("SIFT_STORE_URL").unwrap_or_default();
        let store_username = std::env::var("SIFT_STORE_USERNAME").unwrap_or_default();
        let store_password = std::env::var("SIFT_STORE_PASSWORD").unwrap_or_default();
        let store_insecure = std::env::var("SIFT_STORE_INSECURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let gateway_url = std::env::var("SIFT_TG_GATEWAY_URL").unwrap_or_default();
        let bot_token = std::env::var("SIFT_TG_BOT_TOKEN").unwrap_or_default();
        let api_bind =
            std::env::var("SIFT_API_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let crawl_interval_secs = std::env::var("SIFT_CRAWL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60 * 15);
        let notify_interval_secs = std::env::var("SIFT_NOTIFY_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60 * 60);

        Self {
            store_url,
            store_username,
            store_password,
            store_insecure,
            gateway_url,
            bot_token,
            api_bind,
            crawl_interval_secs,
            notify_interval_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insecure_store_requires_explicit_opt_in() {
        std::env::remove_var("SIFT_STORE_INSECURE");
        assert!(!Settings::from_env().store_insecure);

        std::env::set_var("SIFT_STORE_INSECURE", "true");
        assert!(Settings::from_env().store_insecure);

        std::env::set_var("SIFT_STORE_INSECURE", "0");
        assert!(!Settings::from_env().store_insecure);

        std::env::remove_var("SIFT_STORE_INSECURE");
    }
}
