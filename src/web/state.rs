use crate::{Config, auth::oauth::GoogleClient, model::ModelManager};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    config: &'static Config,
    google: Option<GoogleClient>,
}

impl AppState {
    pub fn new(mm: ModelManager, config: &'static Config) -> Self {
        let google = config.google().cloned().map(GoogleClient::new);
        Self { mm, config, google }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn config(&self) -> &'static Config {
        self.config
    }

    /// `None` when Google sign-in isn't configured.
    pub fn google(&self) -> Option<&GoogleClient> {
        self.google.as_ref()
    }
}
