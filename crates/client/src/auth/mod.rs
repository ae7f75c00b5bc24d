//! Token guard for the remote catalog API.
//!
//! The API hands out an opaque token in exchange for an API key
//! (`POST {base}/auth`). Every authenticated request attaches that token as
//! its Authorization header. One guard instance owns the token for one
//! client; the token and its renewal flag live behind a single async mutex,
//! so concurrent header requests that observe the flag set queue behind
//! exactly one renewal call instead of issuing duplicates.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use imago_core::Error;

/// Request body for the token exchange.
#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

/// Response body of the token exchange.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    auth: bool,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    renew: bool,
}

/// Serialized holder of the shared auth credential.
///
/// Created with the renewal flag set, so the first header request performs
/// the initial token exchange.
#[derive(Debug)]
pub struct TokenGuard {
    http: reqwest::Client,
    auth_url: String,
    api_key: String,
    state: Mutex<TokenState>,
}

impl TokenGuard {
    pub fn new(http: reqwest::Client, auth_url: String, api_key: String) -> Self {
        Self {
            http,
            auth_url,
            api_key,
            state: Mutex::new(TokenState { token: None, renew: true }),
        }
    }

    /// Current token, renewing it first if the renewal flag is set.
    ///
    /// The check-and-renew sequence is atomic under the guard's lock:
    /// whichever caller holds the lock while the flag is set performs the
    /// one renewal call and clears the flag; callers queued behind it see
    /// the fresh token.
    ///
    /// # Errors
    ///
    /// A failed exchange (network fault or `auth: false`) fails this call
    /// with `Error::Auth` and leaves the flag set, so the next header
    /// request repeats the exchange. The guard itself never retries.
    pub async fn authorization_header(&self) -> Result<String, Error> {
        let mut state = self.state.lock().await;
        if state.renew {
            let token = self.exchange().await?;
            tracing::debug!("auth token renewed");
            state.token = Some(token);
            state.renew = false;
        }
        state
            .token
            .clone()
            .ok_or_else(|| Error::Auth("no token available".into()))
    }

    /// Force the next header request to re-authenticate.
    pub async fn mark_for_renewal(&self) {
        let mut state = self.state.lock().await;
        state.renew = true;
    }

    /// Exchange the API key for a fresh token.
    async fn exchange(&self) -> Result<String, Error> {
        let response = self
            .http
            .post(&self.auth_url)
            .json(&AuthRequest { api_key: &self.api_key })
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token exchange failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Auth(format!("token exchange returned status {status}")));
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("malformed auth response: {e}")))?;

        if !body.auth {
            return Err(Error::Auth("API key rejected".into()));
        }

        body.token.ok_or_else(|| Error::Auth("auth response carried no token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn guard_for(server: &MockServer, api_key: &str) -> TokenGuard {
        TokenGuard::new(
            reqwest::Client::new(),
            format!("{}/auth", server.uri()),
            api_key.to_string(),
        )
    }

    #[tokio::test]
    async fn test_first_header_performs_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .and(body_json(serde_json::json!({"apiKey": "key-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "auth": true,
                "token": "tok-abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let guard = guard_for(&server, "key-1");
        assert_eq!(guard.authorization_header().await.unwrap(), "tok-abc");
        // second call must reuse the token, not re-exchange
        assert_eq!(guard.authorization_header().await.unwrap(), "tok-abc");
    }

    #[tokio::test]
    async fn test_concurrent_headers_trigger_one_renewal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "auth": true,
                "token": "tok-once"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let guard = Arc::new(guard_for(&server, "key-1"));
        let calls = (0..16).map(|_| {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.authorization_header().await })
        });
        for call in calls {
            assert_eq!(call.await.unwrap().unwrap(), "tok-once");
        }
    }

    #[tokio::test]
    async fn test_rejected_key_fails_and_keeps_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"auth": false})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "auth": true,
                "token": "tok-later"
            })))
            .mount(&server)
            .await;

        let guard = guard_for(&server, "bad-key");
        let err = guard.authorization_header().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));

        // the flag stayed set, so the next call re-attempts the exchange
        assert_eq!(guard.authorization_header().await.unwrap(), "tok-later");
    }

    #[tokio::test]
    async fn test_mark_for_renewal_forces_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "auth": true,
                "token": "tok"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let guard = guard_for(&server, "key-1");
        guard.authorization_header().await.unwrap();
        guard.mark_for_renewal().await;
        guard.authorization_header().await.unwrap();
    }
}
