use reqwest::Client;
use serde::Deserialize;

use crate::config::GoogleConfig;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Google sign-in is not configured")]
    NotConfigured,
    #[error("{0}")]
    Rejected(String),
    #[error("Google request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

/// Subset of the tokeninfo payload. Google returns booleans as strings here.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenInfo {
    pub aud: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Verified identity extracted from a Google id_token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub email: String,
    pub full_name: String,
    pub image_url: Option<String>,
}

impl GoogleTokenInfo {
    pub fn verify(self, client_id: &str) -> Result<GoogleIdentity, OAuthError> {
        if self.aud != client_id {
            return Err(OAuthError::Rejected("Google token was issued for another client".to_string()));
        }
        if !matches!(self.email_verified.as_deref(), Some("true")) {
            return Err(OAuthError::Rejected("Google account email is not verified".to_string()));
        }
        let email = self
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| OAuthError::Rejected("Google token carries no email".to_string()))?;

        let full_name = self.name.unwrap_or_else(|| email.clone());
        Ok(GoogleIdentity {
            email: email.trim().to_lowercase(),
            full_name,
            image_url: self.picture,
        })
    }
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: Client,
    config: GoogleConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Exchange an authorization code and verify the resulting id_token
    pub async fn authenticate(&self, code: &str) -> Result<GoogleIdentity, OAuthError> {
        if !self.config.is_configured() {
            return Err(OAuthError::NotConfigured);
        }

        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let response = self.http.post(&self.config.token_endpoint).form(&params).send().await?;
        if !response.status().is_success() {
            tracing::warn!("Google code exchange failed with status {}", response.status());
            return Err(OAuthError::Rejected("Google authorization code was rejected".to_string()));
        }
        let id_token = response
            .json::<TokenResponse>()
            .await?
            .id_token
            .ok_or_else(|| OAuthError::Rejected("Google response carries no id_token".to_string()))?;

        let response = self
            .http
            .get(&self.config.tokeninfo_endpoint)
            .query(&[("id_token", id_token.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(OAuthError::Rejected("Google id_token is invalid".to_string()));
        }

        response.json::<GoogleTokenInfo>().await?.verify(&self.config.client_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, verified: Option<&str>) -> GoogleTokenInfo {
        GoogleTokenInfo {
            aud: aud.to_string(),
            email: Some("Parent@Example.com".to_string()),
            email_verified: verified.map(str::to_string),
            name: Some("A Parent".to_string()),
            picture: None,
        }
    }

    #[test]
    fn verified_token_for_our_client_is_accepted() {
        let identity = info("client-1", Some("true")).verify("client-1").unwrap();
        assert_eq!(identity.email, "parent@example.com");
        assert_eq!(identity.full_name, "A Parent");
    }

    #[test]
    fn audience_must_match() {
        assert!(matches!(
            info("someone-else", Some("true")).verify("client-1"),
            Err(OAuthError::Rejected(_))
        ));
    }

    #[test]
    fn unverified_email_is_rejected() {
        assert!(info("client-1", Some("false")).verify("client-1").is_err());
        assert!(info("client-1", None).verify("client-1").is_err());
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_before_any_request() {
        let client = GoogleOAuthClient::new(GoogleConfig::defaults("http://localhost/callback"));
        assert!(matches!(client.authenticate("code").await, Err(OAuthError::NotConfigured)));
    }
}
