use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl UserIdentity {
    /// "Hello, Ada!" or, without a first name, "Hello, User user_2ab!".
    pub fn greeting(&self) -> String {
        match self.first_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("Hello, {name}!"),
            _ => {
                let short: String = self.id.chars().take(8).collect();
                format!("Hello, User {short}!")
            }
        }
    }
}

/// Resolves a session token to a user. `Ok(None)` means no valid session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn lookup_session(&self, token: &str) -> Result<Option<UserIdentity>>;
}

/// Looks sessions up with a bearer-authenticated GET against one endpoint.
pub struct HttpIdentityProvider {
    http: Client,
    session_url: String,
}

impl HttpIdentityProvider {
    pub fn new(session_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            session_url: session_url.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn lookup_session(&self, token: &str) -> Result<Option<UserIdentity>> {
        let resp = self
            .http
            .get(&self.session_url)
            .bearer_auth(token)
            .send()
            .await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(resp.json().await?)),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(MarketError::Api {
                    status: s.as_u16(),
                    body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_prefers_first_name() {
        let u = UserIdentity {
            id: "user_2abcdefghij".into(),
            first_name: Some("Ada".into()),
        };
        assert_eq!(u.greeting(), "Hello, Ada!");
    }

    #[test]
    fn greeting_falls_back_to_short_id() {
        let u = UserIdentity {
            id: "user_2abcdefghij".into(),
            first_name: Some("  ".into()),
        };
        assert_eq!(u.greeting(), "Hello, User user_2ab!");
    }
}
