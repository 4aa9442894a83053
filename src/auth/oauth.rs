//! Google sign-in (OAuth 2.0 authorization code flow).

use reqwest::Url;
use serde::Deserialize;

use crate::{
    auth::error::{OAuthError, OAuthResult},
    config::GoogleOAuth,
};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

/// Cookie holding the `state` parameter between the redirect and the callback.
pub static OAUTH_STATE: &str = "oauth_state";

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleProfile {
    pub fn verified_email(&self) -> OAuthResult<String> {
        match &self.email {
            Some(email) if self.email_verified => Ok(email.trim().to_lowercase()),
            _ => Err(OAuthError::MissingEmail),
        }
    }

    /// Display name, falling back to the local part of the email.
    pub fn display_name(&self, email: &str) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => email.split('@').next().unwrap_or(email).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct GoogleClient {
    config: GoogleOAuth,
    http: reqwest::Client,
}

impl GoogleClient {
    pub fn new(config: GoogleOAuth) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn authorize_url(&self, state: &str) -> OAuthResult<Url> {
        Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id()),
                ("redirect_uri", self.config.redirect_url()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| OAuthError::InvalidUrl(e.to_string()))
    }

    #[tracing::instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> OAuthResult<String> {
        let response: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id()),
                ("client_secret", self.config.client_secret()),
                ("redirect_uri", self.config.redirect_url()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.access_token)
    }

    #[tracing::instrument(skip_all)]
    pub async fn fetch_profile(&self, access_token: &str) -> OAuthResult<GoogleProfile> {
        let profile = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(profile)
    }
}

pub fn generate_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    fn client() -> GoogleClient {
        GoogleClient::new(GoogleOAuth::new(
            "client-id",
            "client-secret",
            "http://localhost:5000/api/auth/google/callback",
        ))
    }

    #[test]
    fn authorize_url_test() {
        let url = client().authorize_url("xyz").unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "client-id".into())));
        assert!(pairs.contains(&("state".into(), "xyz".into())));
        assert!(pairs.contains(&("scope".into(), "openid email profile".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:5000/api/auth/google/callback".into()
        )));
        assert!(!url.as_str().contains("client-secret"));
    }

    #[test]
    fn state_is_random_test() {
        assert_ne!(generate_state(), generate_state());
        assert_eq!(generate_state().len(), 32);
    }

    #[test]
    fn profile_email_test() {
        let profile = GoogleProfile {
            sub: "1".into(),
            email: Some("Someone@Gmail.com".into()),
            email_verified: true,
            name: None,
            picture: None,
        };
        let email = profile.verified_email().unwrap();
        assert_eq!(email, "someone@gmail.com");
        assert_eq!(profile.display_name(&email), "someone");

        let unverified = GoogleProfile {
            email_verified: false,
            ..profile
        };
        assert!(matches!(
            unverified.verified_email(),
            Err(OAuthError::MissingEmail)
        ));
    }
}
