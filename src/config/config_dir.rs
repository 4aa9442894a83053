use std::path::PathBuf;

use super::error::{ConfigError, ConfigResult};

const CONFIG_FILE: &str = "config.toml";

fn local_config_path() -> PathBuf {
    PathBuf::from(".").join(CONFIG_FILE)
}

/// `$HOME/.config/coursehub/config.toml` on unix, `%APPDATA%\coursehub\config.toml` on windows.
fn user_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    let base = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
    #[cfg(windows)]
    let base = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let base: Option<PathBuf> = None;

    base.map(|dir| dir.join(crate::APPLICATION_NAME).join(CONFIG_FILE))
}

/// Local mode always reads `./config.toml`. Otherwise the per-user file wins when it exists.
pub fn find_config_file(use_local: bool) -> PathBuf {
    if use_local {
        return local_config_path();
    }

    user_config_path()
        .filter(|path| path.is_file())
        .unwrap_or_else(local_config_path)
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let path = find_config_file(use_local);
    tracing::trace!("looking for config at: {}", path.display());

    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound);
    }

    let path = path.canonicalize()?;
    tracing::debug!("using {} as configuration file", path.display());

    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::Config;

    #[test]
    fn local_mode_reads_working_dir_test() {
        assert_eq!(find_config_file(true), PathBuf::from("./config.toml"));

        let config = Config::from_toml(&read_config(true).unwrap()).unwrap();
        assert_eq!(config.host().bindto(), "127.0.0.1:5000");
        assert!(config.app().docs());
        assert!(config.google().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn user_config_dir_test() {
        let home = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var("HOME", home.path());
        }

        // nothing installed for the user yet
        assert_eq!(find_config_file(false), local_config_path());

        let app_dir = home.path().join(".config").join("coursehub");
        fs::create_dir_all(&app_dir).unwrap();
        let installed = app_dir.join("config.toml");
        fs::write(
            &installed,
            r#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            jwt = "installed-secret"
            database_uri = "postgres://db.internal/coursehub"
            frontend_url = "https://courses.example.com"

            [oauth.google]
            client_id = "coursehub-web"
            client_secret = "shh"
            redirect_url = "https://api.example.com/api/auth/google/callback"
            "#,
        )
        .unwrap();

        assert_eq!(find_config_file(false), installed);

        let config = Config::from_toml(&read_config(false).unwrap()).unwrap();
        assert_eq!(config.host().bindto(), "0.0.0.0:8080");
        assert_eq!(config.app().jwt(), "installed-secret");
        assert_eq!(config.app().frontend_url(), "https://courses.example.com");
        assert_eq!(config.google().map(|g| g.client_id()), Some("coursehub-web"));
    }
}
