use std::env;

pub const DEFAULT_API_BASE: &str = "https://fantasy.premierleague.com/api";

/// Credentials and endpoint overrides, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api_base: Option<String>,
    pub cookie: Option<String>,
    pub x_api_auth: Option<String>,
}

impl Settings {
    /// Reads `FPL_API_BASE`, `FPL_COOKIE` and `FPL_X_API_AUTH`.
    /// Blank values count as unset.
    pub fn from_env() -> Self {
        Self {
            api_base: env_value("FPL_API_BASE"),
            cookie: env_value("FPL_COOKIE"),
            x_api_auth: env_value("FPL_X_API_AUTH"),
        }
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .map(|base| base.trim_end_matches('/'))
            .unwrap_or(DEFAULT_API_BASE)
    }

    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }
}

/// Loads `.env.local` then `.env` into the process environment, if present.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| non_empty(&val))
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_API_BASE, Settings, non_empty};

    #[test]
    fn blank_values_are_unset() {
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(" abc "), Some("abc".to_string()));
    }

    #[test]
    fn api_base_defaults_and_strips_trailing_slash() {
        let settings = Settings::default();
        assert_eq!(settings.api_base(), DEFAULT_API_BASE);

        let settings = Settings {
            api_base: Some("http://localhost:8080/api/".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.api_base(), "http://localhost:8080/api");
        assert!(!settings.has_session());
    }
}
