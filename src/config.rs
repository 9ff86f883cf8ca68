use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

use notify_core::CodeTemplate;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Eskiz gateway credentials and endpoint
    pub eskiz: EskizConfig,
    /// SMS sending behavior
    pub sms: SmsConfig,
    /// Expo push configuration
    pub expo: ExpoConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Eskiz gateway configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EskizConfig {
    /// Account email for `/auth/login`
    pub email: String,
    /// Account password for `/auth/login`
    pub password: String,
    /// API base URL (default: the production gateway)
    pub base_url: String,
}

/// SMS sending behavior
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SmsConfig {
    /// Registered sender name (default: OsonIsh)
    pub sender: String,
    /// Send real SMS even outside production (default: false)
    pub force_production: bool,
    /// Moderation-approved verification text with a `{code}` placeholder
    pub template: CodeTemplate,
}

/// Expo push configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExpoConfig {
    /// Access token for projects with enhanced push security (default: none)
    pub access_token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: pretty or json (default: pretty)
    pub format: String,
}

/// Whether verification codes actually leave the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsMode {
    /// Codes are logged locally, nothing is sent, no balance is spent.
    Development,
    /// Codes go out through the gateway.
    Production,
}

impl fmt::Display for SmsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmsMode::Development => f.write_str("development"),
            SmsMode::Production => f.write_str("production"),
        }
    }
}

impl Default for EskizConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            base_url: notify_eskiz::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            sender: "OsonIsh".to_string(),
            force_production: false,
            template: CodeTemplate::default(),
        }
    }
}

impl Default for ExpoConfig {
    fn default() -> Self {
        Self { access_token: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    ///
    /// Precedence, lowest first: built-in defaults, `config/default`,
    /// `config/{RUN_MODE}`, `config/local` (gitignored), then
    /// `OSONISH_`-prefixed environment variables with `__` as the key
    /// separator (e.g. `OSONISH_ESKIZ__EMAIL`).
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("OSONISH").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Whether codes are really sent or only logged.
    pub fn mode(&self) -> SmsMode {
        if self.sms.force_production {
            SmsMode::Production
        } else {
            SmsMode::Development
        }
    }

    /// Collects everything that would stop the tooling from working.
    ///
    /// Empty result means the configuration is usable. Problems are
    /// returned together so one run shows all of them.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.eskiz.email.is_empty() {
            problems.push("eskiz.email is not set (OSONISH_ESKIZ__EMAIL)".to_string());
        }
        if self.eskiz.password.is_empty() {
            problems.push("eskiz.password is not set (OSONISH_ESKIZ__PASSWORD)".to_string());
        }
        if self.eskiz.base_url.is_empty() {
            problems.push("eskiz.base_url is empty".to_string());
        }
        if self.sms.sender.is_empty() {
            problems.push("sms.sender is empty".to_string());
        }
        problems
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            eskiz: EskizConfig::default(),
            sms: SmsConfig::default(),
            expo: ExpoConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_production_gateway() {
        let config = AppConfig::default();
        assert_eq!(config.eskiz.base_url, "https://notify.eskiz.uz/api");
        assert_eq!(config.sms.sender, "OsonIsh");
        assert!(!config.sms.force_production);
        assert_eq!(config.mode(), SmsMode::Development);
    }

    #[test]
    fn test_validate_reports_all_missing_credentials() {
        let config = AppConfig::default();
        let problems = config.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("eskiz.email"));
        assert!(problems[1].contains("eskiz.password"));
    }

    #[test]
    fn test_validate_passes_with_credentials() {
        let mut config = AppConfig::default();
        config.eskiz.email = "ops@osonish.uz".to_string();
        config.eskiz.password = "secret".to_string();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_force_production_switches_mode() {
        let mut config = AppConfig::default();
        config.sms.force_production = true;
        assert_eq!(config.mode(), SmsMode::Production);
        assert_eq!(config.mode().to_string(), "production");
    }
}
