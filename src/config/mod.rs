use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub is_dev: bool,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub max_body_bytes: usize,
    /// Skip the private-address guard. Only for local development and tests.
    pub allow_private_hosts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            is_dev: true,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            allow_private_hosts: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Config::default();
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            is_dev: env::var("APP_ENV").as_deref() != Ok("production"),
            fetch_timeout: Duration::from_secs(parse_nonzero_var(
                "FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )),
            user_agent: env::var("FETCH_USER_AGENT")
                .ok()
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            max_body_bytes: parse_nonzero_var("MAX_BODY_BYTES", defaults.max_body_bytes),
            allow_private_hosts: parse_var("ALLOW_PRIVATE_HOSTS", defaults.allow_private_hosts),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Read and parse `key`, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            default
        }),
        Err(_) => default,
    }
}

/// Like [`parse_var`], but zero also falls back to `default`.
fn parse_nonzero_var<T: FromStr + Copy + Default + PartialEq>(key: &str, default: T) -> T {
    let value = parse_var(key, default);
    if value == T::default() {
        tracing::warn!(key, "Ignoring zero configuration value");
        return default;
    }
    value
}
