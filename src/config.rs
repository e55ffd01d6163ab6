use std::net::IpAddr;
use std::time::Duration;

pub const MIN_POLL_INTERVAL_MS: u64 = 250;
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    /// Interval advertised to polling clients, already clamped.
    pub poll_interval_ms: u64,
    /// Upper bound on course queues created by writes.
    pub max_courses: usize,
    pub proxy: Option<ProxyConfig>,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub backend_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("OHQ_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid OHQ_HOST: {e}"))?;

        let port: u16 = env_or("OHQ_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid OHQ_PORT: {e}"))?;

        let log_level = env_or("OHQ_LOG_LEVEL", "info");

        let max_body_size: usize = env_or("OHQ_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid OHQ_MAX_BODY_SIZE: {e}"))?;

        let poll_interval_ms: u64 = env_or("OHQ_POLL_INTERVAL_MS", "5000")
            .parse()
            .map_err(|e| format!("Invalid OHQ_POLL_INTERVAL_MS: {e}"))?;

        let max_courses: usize = env_or("OHQ_MAX_COURSES", "256")
            .parse()
            .map_err(|e| format!("Invalid OHQ_MAX_COURSES: {e}"))?;

        let proxy = match std::env::var("OHQ_PROXY_BACKEND_URL").ok() {
            Some(url) if !url.trim().is_empty() => {
                let timeout_secs: u64 = env_or("OHQ_PROXY_TIMEOUT_SECS", "30")
                    .parse()
                    .map_err(|e| format!("Invalid OHQ_PROXY_TIMEOUT_SECS: {e}"))?;
                Some(ProxyConfig::new(&url, Duration::from_secs(timeout_secs))?)
            }
            _ => None,
        };

        Ok(Config {
            host,
            port,
            log_level,
            max_body_size,
            poll_interval_ms: clamp_poll_interval(poll_interval_ms),
            max_courses,
            proxy,
        })
    }
}

impl ProxyConfig {
    /// Normalizes the backend base URL so forwarded paths can be appended with a single `/`.
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, String> {
        let backend_url = backend_url.trim().trim_end_matches('/').to_string();
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(format!(
                "Invalid OHQ_PROXY_BACKEND_URL '{backend_url}': must start with http:// or https://"
            ));
        }
        Ok(ProxyConfig {
            backend_url,
            timeout,
        })
    }
}

pub fn clamp_poll_interval(ms: u64) -> u64 {
    ms.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
