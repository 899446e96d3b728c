//! Google sign-in: consent URL, code exchange and profile lookup.

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::auth::OAuthProfile;
use crate::models::config::ServerConfig;

const AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

/// Session key holding the state of a pending sign-in.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("google sign-in is not configured")]
    NotConfigured,
    #[error("invalid oauth url: {0}")]
    Url(String),
    #[error("oauth request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("google rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
}

impl From<UserInfo> for OAuthProfile {
    fn from(info: UserInfo) -> Self {
        OAuthProfile {
            subject: info.sub,
            email: info.email,
            email_verified: info.email_verified,
            name: info.name,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GoogleOAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleOAuth {
    pub fn from_config(config: &ServerConfig) -> Result<Self, OAuthError> {
        if !config.google_enabled() {
            return Err(OAuthError::NotConfigured);
        }
        Ok(Self {
            client: Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.google_redirect_url.clone(),
        })
    }

    /// Consent page URL carrying `state`.
    pub fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = Url::parse_with_params(
            AUTHORIZATION_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|err| OAuthError::Url(err.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Rejected(format!("{status}: {body}")));
        }

        Ok(response.json::<TokenResponse>().await?.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, OAuthError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OAuthError::Rejected(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        Ok(response.json::<UserInfo>().await?.into())
    }

    /// Trades the authorization code from the callback for the user's profile.
    pub async fn profile_for_code(&self, code: &str) -> Result<OAuthProfile, OAuthError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_profile(&access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(client_id: &str) -> ServerConfig {
        ServerConfig {
            domain: "localhost".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            database_url: ":memory:".to_string(),
            secret: "s".repeat(64),
            session_ttl_hours: 1,
            cookie_secure: false,
            google_client_id: client_id.to_string(),
            google_client_secret: "shh".to_string(),
            google_redirect_url: "http://localhost:8080/api/auth/google/callback".to_string(),
            frontend_url: "http://localhost:3000/".to_string(),
        }
    }

    #[test]
    fn consent_url_carries_state_and_redirect() {
        let oauth = GoogleOAuth::from_config(&config("client-1")).unwrap();
        let url = Url::parse(&oauth.authorization_url("abc123").unwrap()).unwrap();

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("state".to_string(), "abc123".to_string())));
        assert!(params.contains(&("client_id".to_string(), "client-1".to_string())));
        assert!(params.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:8080/api/auth/google/callback".to_string()
        )));
    }

    #[test]
    fn missing_credentials_disable_google() {
        assert!(matches!(
            GoogleOAuth::from_config(&config("")),
            Err(OAuthError::NotConfigured)
        ));
    }

    #[test]
    fn userinfo_maps_to_profile() {
        let info: UserInfo = serde_json::from_str(
            r#"{"sub":"1089","email":"ana@pools.test","email_verified":true,"name":"Ana"}"#,
        )
        .unwrap();
        let profile = OAuthProfile::from(info);
        assert_eq!(profile.subject, "1089");
        assert!(profile.email_verified);
    }
}
