use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

const APP_NAME: &str = "auraflow-seed";

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Connection parameters for the hosted backend.
#[derive(Clone)]
pub struct Config {
    pub url: String,
    pub service_key: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Read both values from the process environment. A `.env` file is
    /// expected to have been loaded into the environment beforehand.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary lookup. Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let url = read(URL_ENV);
        let service_key = read(KEY_ENV);

        match (url, service_key) {
            (Some(url), Some(service_key)) => Ok(Config {
                url: url.trim_end_matches('/').to_string(),
                service_key,
            }),
            (url, key) => {
                let missing: Vec<&str> = [(URL_ENV, url.is_none()), (KEY_ENV, key.is_none())]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                bail!(
                    "missing {}\nPlease create a .env file with:\n  {}=your-project-url\n  {}=your-service-role-key",
                    missing.join(" and "),
                    URL_ENV,
                    KEY_ENV
                )
            }
        }
    }
}

/// Return the application config directory path, creating it if missing.
pub fn get_app_config_path() -> Result<PathBuf> {
    let mut path = if cfg!(target_os = "macos") {
        dirs_next::home_dir().map(|h| h.join(".config"))
    } else {
        dirs_next::config_dir()
    }
    .ok_or_else(|| anyhow::anyhow!("failed to find os config dir."))?;

    path.push(APP_NAME);
    fs::create_dir_all(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_both_values() {
        let config = Config::from_lookup(lookup(&[
            (URL_ENV, "https://demo.supabase.co/"),
            (KEY_ENV, "secret"),
        ]))
        .unwrap();
        assert_eq!(config.url, "https://demo.supabase.co");
        assert_eq!(config.service_key, "secret");
    }

    #[test]
    fn names_every_missing_value() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err().to_string();
        assert!(err.contains("missing SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY"));
    }

    #[test]
    fn missing_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[(URL_ENV, "https://demo.supabase.co")]))
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("missing SUPABASE_SERVICE_ROLE_KEY"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[(URL_ENV, "  "), (KEY_ENV, "secret")]))
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("missing SUPABASE_URL\n"));
    }

    #[test]
    fn debug_hides_the_key() {
        let config = Config {
            url: "https://demo.supabase.co".into(),
            service_key: "secret".into(),
        };
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
