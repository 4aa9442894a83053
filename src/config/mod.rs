use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

const DEFAULT_JWT_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    #[serde(default)]
    oauth: OAuth,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    jwt: String,
    #[serde(default = "default_jwt_ttl_hours")]
    jwt_ttl_hours: i64,
    database_uri: String,
    #[serde(default = "default_frontend_url")]
    frontend_url: String,
    #[serde(default)]
    docs: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct OAuth {
    google: Option<GoogleOAuth>,
}

/// Credentials of the Google OAuth client. Sign-in with Google is disabled when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleOAuth {
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

fn default_jwt_ttl_hours() -> i64 {
    DEFAULT_JWT_TTL_HOURS
}

fn default_frontend_url() -> String {
    String::from("http://localhost:3000")
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    Self::from_toml(&bytes)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn from_toml(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        Ok(config)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn google(&self) -> Option<&GoogleOAuth> {
        self.oauth.google.as_ref()
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn jwt_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt_ttl_hours)
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn frontend_url(&self) -> &str {
        self.frontend_url.trim_end_matches('/')
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}

impl GoogleOAuth {
    pub fn new<S: Into<String>>(client_id: S, client_secret: S, redirect_url: S) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
        }
    }

    #[inline]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[inline]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    #[inline]
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
    }

    #[test]
    fn config_defaults_test() {
        let config = Config::from_toml(
            br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            database_uri = "postgres://localhost/db"
            "#,
        )
        .unwrap();

        assert_eq!(config.app().jwt_ttl(), chrono::Duration::hours(168));
        assert_eq!(config.app().frontend_url(), "http://localhost:3000");
        assert!(!config.app().docs());
        assert!(config.google().is_none());
    }

    #[test]
    fn config_google_section_test() {
        let config = Config::from_toml(
            br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "secret"
            jwt_ttl_hours = 2
            database_uri = "postgres://localhost/db"
            frontend_url = "https://courses.example.com/"

            [oauth.google]
            client_id = "id"
            client_secret = "shh"
            redirect_url = "https://api.example.com/api/auth/google/callback"
            "#,
        )
        .unwrap();

        assert_eq!(config.app().jwt_ttl(), chrono::Duration::hours(2));
        assert_eq!(config.app().frontend_url(), "https://courses.example.com");
        let google = config.google().expect("google section");
        assert_eq!(google.client_id(), "id");
        assert_eq!(google.client_secret(), "shh");
    }

    #[test]
    fn config_missing_app_section_test() {
        let result = Config::from_toml(b"[host]\nbindto = \"127.0.0.1:1\"\n");
        assert!(matches!(result, Err(ConfigError::TomlDeError(_))));
    }
}
