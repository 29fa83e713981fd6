use crate::error::{env_error, InviteResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Host serving the calendar generation endpoint
pub const DEFAULT_ICS_SERVICE_HOST: &str = "ics.inviteday.app";

/// Domain part of generated event UIDs
pub const DEFAULT_UID_DOMAIN: &str = "inviteday.app";

/// Optional file overriding the non-secret settings
pub const CONFIG_FILE: &str = "config/inviteday.toml";

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP service binds to
    pub bind_addr: String,
    /// Port the HTTP service listens on
    pub port: u16,
    /// Host of the calendar generation service used in webcal/ICS links
    pub ics_service_host: String,
    /// Domain used for generated calendar UIDs
    pub uid_domain: String,
    /// Language code used when a request carries none (or an unknown one)
    pub default_locale: String,
    /// Redis URL for the RSVP store; RSVP is disabled when absent
    pub redis_url: Option<String>,
    /// File for remembered attendee names; disabled when absent
    pub remembered_path: Option<PathBuf>,
}

/// Settings that may come from `config/inviteday.toml`
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    ics_service_host: Option<String>,
    uid_domain: Option<String>,
    default_locale: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> InviteResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| String::from("127.0.0.1"));

        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| env_error("PORT"))?,
            Err(_) => 8787,
        };

        let ics_service_host =
            env::var("ICS_SERVICE_HOST").unwrap_or_else(|_| DEFAULT_ICS_SERVICE_HOST.to_string());
        let uid_domain = env::var("UID_DOMAIN").unwrap_or_else(|_| DEFAULT_UID_DOMAIN.to_string());
        let default_locale = env::var("DEFAULT_LOCALE").unwrap_or_else(|_| String::from("en"));

        let redis_url = env::var("REDIS_URL").ok().filter(|url| !url.is_empty());
        let remembered_path = env::var("REMEMBERED_PATH")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let mut config = Config {
            bind_addr,
            port,
            ics_service_host,
            uid_domain,
            default_locale,
            redis_url,
            remembered_path,
        };

        if Path::new(CONFIG_FILE).exists() {
            let content = fs::read_to_string(CONFIG_FILE)?;
            config.apply_overrides(&content)?;
        }

        Ok(config)
    }

    /// Merge overrides from TOML content into this config
    pub fn apply_overrides(&mut self, content: &str) -> InviteResult<()> {
        let overrides: FileOverrides = toml::from_str(content)?;

        if let Some(host) = overrides.ics_service_host {
            self.ics_service_host = host;
        }
        if let Some(domain) = overrides.uid_domain {
            self.uid_domain = domain;
        }
        if let Some(locale) = overrides.default_locale {
            self.default_locale = locale;
        }

        Ok(())
    }

    /// Config with every optional collaborator disabled
    pub fn for_tests() -> Self {
        Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            ics_service_host: DEFAULT_ICS_SERVICE_HOST.to_string(),
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
            default_locale: "en".to_string(),
            redis_url: None,
            remembered_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::for_tests();
        config
            .apply_overrides("ics_service_host = \"ics.example.org\"\ndefault_locale = \"fi\"\n")
            .unwrap();

        assert_eq!(config.ics_service_host, "ics.example.org");
        assert_eq!(config.default_locale, "fi");
        // Untouched fields keep their values
        assert_eq!(config.uid_domain, DEFAULT_UID_DOMAIN);
    }

    #[test]
    fn test_apply_overrides_rejects_bad_toml() {
        let mut config = Config::for_tests();
        assert!(config.apply_overrides("ics_service_host = ").is_err());
    }
}
