use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub schedule: ScheduleConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub serve_origin: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn serve_origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the server origin URL.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.serve_origin {
            origin.clone()
        } else {
            self.serve_origin()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Scheduling knobs passed explicitly into every calendar and attendance request.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Timezone used when a facility has none configured.
    pub default_timezone: String,
    /// Longest query window accepted by the calendar builder.
    pub max_window_days: u32,
    pub default_per_page: u32,
    pub max_per_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Upper bound for a single gateway operation.
    pub timeout_ms: u64,
    /// JSON file with facilities, classes, users and enrollments to load at startup.
    pub seed_path: Option<String>,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `config.toml` values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating the result fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("logging.level", "debug")?
            .set_default("schedule.default_timezone", "America/Chicago")?
            .set_default("schedule.max_window_days", 366)?
            .set_default("schedule.default_per_page", 20)?
            .set_default("schedule.max_per_page", 100)?
            .set_default("gateway.timeout_ms", 5000)?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env vars, e.g. CADENCE__SCHEDULE__DEFAULT_TIMEZONE
            .add_source(
                config::Environment::with_prefix("CADENCE")
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks cross-field constraints that serde cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` when a value is out of range.
    pub fn validate(&self) -> CoreResult<()> {
        if self.schedule.max_window_days == 0 {
            return Err(CoreError::ConfigError(
                "schedule.max_window_days must be at least 1".to_string(),
            ));
        }
        if self.schedule.default_per_page == 0
            || self.schedule.default_per_page > self.schedule.max_per_page
        {
            return Err(CoreError::ConfigError(format!(
                "schedule.default_per_page must be between 1 and {}",
                self.schedule.max_per_page
            )));
        }
        if self.gateway.timeout_ms == 0 {
            return Err(CoreError::ConfigError(
                "gateway.timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8698,
                serve_origin: None,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
            schedule: ScheduleConfig {
                default_timezone: "America/Chicago".to_string(),
                max_window_days: 366,
                default_per_page: 20,
                max_per_page: 100,
            },
            gateway: GatewayConfig {
                timeout_ms: 5000,
                seed_path: None,
            },
        }
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    tracing::debug!("Loading settings");
    Settings::load()
}
