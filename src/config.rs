use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Application configuration, layered from built-in defaults, optional
/// `config/{env}.toml` files, and `APP__`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Secret used to validate bearer tokens issued by the identity provider.
    /// No default: it must come from the environment or a config file.
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub auth_issuer: String,
    pub auth_audience: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub auto_migrate: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Quantity at or below which a supply shows up on the low-stock report.
    pub low_stock_threshold: i32,
    /// Comma-separated list of allowed CORS origins; unset means permissive
    /// CORS in development and a startup error in production.
    pub cors_allowed_origins: Option<String>,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Programmatic constructor, used by tests and tooling.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        database_url: String,
        jwt_secret: String,
        jwt_expiration: u64,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            auth_issuer: "supplydesk-auth".to_string(),
            auth_audience: "supplydesk-api".to_string(),
            host,
            port,
            environment,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: 10,
            db_min_connections: 1,
            low_stock_threshold: 2,
            cors_allowed_origins: None,
            request_timeout_secs: 30,
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        !self.is_production()
    }

    pub fn log_level(&self) -> &str {
        if self.log_level.trim().is_empty() {
            DEFAULT_LOG_LEVEL
        } else {
            &self.log_level
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Load configuration for the environment selected by `RUN_ENV`/`APP_ENV`.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://supplydesk.db?mode=rwc")?
        .set_default("jwt_expiration", 3600)?
        .set_default("auth_issuer", "supplydesk-auth")?
        .set_default("auth_audience", "supplydesk-api")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("auto_migrate", true)?
        .set_default("db_max_connections", 10)?
        .set_default("db_min_connections", 1)?
        .set_default("low_stock_threshold", 2)?
        .set_default("request_timeout_secs", 30)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // jwt_secret has no default so an insecure placeholder can never reach
    // production; fail with a clear message instead of a deserialize error.
    if config.get_string("jwt_secret").is_err() {
        return Err(AppConfigError::Missing(
            "jwt_secret (set APP__JWT_SECRET or add it to a config file)",
        ));
    }

    Ok(config.try_deserialize()?)
}

/// Install the global tracing subscriber.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("supplydesk_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programmatic_config_defaults() {
        let cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "test-secret".into(),
            3600,
            "127.0.0.1".into(),
            8080,
            "test".into(),
        );
        assert!(cfg.is_development());
        assert_eq!(cfg.low_stock_threshold, 2);
        assert_eq!(cfg.log_level(), "info");
    }
}
