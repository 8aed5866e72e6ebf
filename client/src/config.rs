use std::env;

pub const LOCAL_API_URL: &str = "http://localhost:3000";
pub const PRODUCTION_API_URL: &str = "https://api.nest-home.app";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "local" | "development" | "dev" => Environment::Local,
            _ => Environment::Production,
        }
    }
}

/// Where the nest API lives. Resolved once at startup and never changed.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub environment: Environment,
}

impl ClientConfig {
    /// Reads `NEST_ENV` and `NEST_API_URL`. An explicit URL wins over the
    /// environment's default.
    pub fn from_env() -> Self {
        let environment = env::var("NEST_ENV")
            .map(|name| Environment::from_name(&name))
            .unwrap_or(Environment::Production);

        let api_url = env::var("NEST_API_URL").unwrap_or_else(|_| match environment {
            Environment::Local => LOCAL_API_URL.to_string(),
            Environment::Production => PRODUCTION_API_URL.to_string(),
        });

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            environment,
        }
    }

    /// Like [`ClientConfig::from_env`], after loading a `.env` file if present.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            environment: Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure config tests run serially (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("NEST_ENV");
        env::remove_var("NEST_API_URL");
    }

    #[test]
    fn test_config_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = ClientConfig::from_env();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.api_url, PRODUCTION_API_URL);
    }

    #[test]
    fn test_config_local_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        env::set_var("NEST_ENV", "LOCAL");

        let config = ClientConfig::from_env();

        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.api_url, LOCAL_API_URL);

        clear_env();
    }

    #[test]
    fn test_config_explicit_url_wins() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        env::set_var("NEST_ENV", "local");
        env::set_var("NEST_API_URL", "http://10.0.2.2:3000/");

        let config = ClientConfig::from_env();

        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.api_url, "http://10.0.2.2:3000");

        clear_env();
    }

    #[test]
    fn test_load_keeps_process_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        env::set_var("NEST_API_URL", "http://127.0.0.1:4000");

        let config = ClientConfig::load();

        assert_eq!(config.api_url, "http://127.0.0.1:4000");

        clear_env();
    }

    #[test]
    fn test_with_api_url_trims_trailing_slash() {
        let config = ClientConfig::with_api_url("https://example.test/api/");
        assert_eq!(config.api_url, "https://example.test/api");
    }
}
