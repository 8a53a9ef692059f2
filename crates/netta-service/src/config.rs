//! Service configuration.

/// Secret used when `SECRET_KEY` is not set. Tokens signed with it are forgeable.
pub const DEV_SECRET_KEY: &str = "netta-development-secret-change-me";

/// Default listen port.
const DEFAULT_PORT: u16 = 5000;

/// Default session lifetime: seven days.
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:5000").
    pub listen_addr: String,

    /// SQLite connection URL (default: "sqlite://netta.db?mode=rwc").
    pub database_url: String,

    /// HMAC key for signing session tokens.
    pub secret_key: String,

    /// Session lifetime in seconds.
    pub token_ttl_seconds: i64,

    /// Insert demo users and posts into an empty database on startup.
    pub seed_demo_data: bool,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// `LISTEN_ADDR` wins over `PORT`; `PORT` alone binds all interfaces.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let listen_addr = std::env::var("LISTEN_ADDR").ok().unwrap_or_else(|| {
            std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .map_or(defaults.listen_addr.clone(), |port| format!("0.0.0.0:{port}"))
        });

        let secret_key = std::env::var("SECRET_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("SECRET_KEY not set - using the development key");
                defaults.secret_key.clone()
            });

        Self {
            listen_addr,
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            secret_key,
            token_ttl_seconds: parse_var("TOKEN_TTL_SECONDS")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.token_ttl_seconds),
            seed_demo_data: std::env::var("SEED_DEMO_DATA")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.seed_demo_data),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: parse_var("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Whether tokens are signed with the built-in development key.
    #[must_use]
    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }

    /// Session lifetime as a `chrono` duration.
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_seconds)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            database_url: "sqlite://netta.db?mode=rwc".into(),
            secret_key: DEV_SECRET_KEY.into(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            seed_demo_data: true,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024, // 1MB
            request_timeout_seconds: 30,
        }
    }
}
