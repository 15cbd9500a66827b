use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use ci_core::domain::{Registration, StaffUser};
use ci_core::ports::{AuthApiError, AuthApiPort, LoginSuccess, TokenStorePort};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Backend response envelope: every endpoint answers with an explicit
/// `success` flag plus an optional message and payload.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    success: Option<bool>,
    message: Option<String>,
    user: Option<StaffUser>,
    token: Option<String>,
}

/// Stateless HTTP wrapper around the ClinIntake backend.
///
/// Reads the token store for request authorization only; it never writes a
/// credential (the auth flow owns that).
pub struct AuthApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStorePort>,
}

impl AuthApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStorePort>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("TLS backend unavailable");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiEnvelope, AuthApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);
        if let Some(token) = self.tokens.get() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| AuthApiError::Network(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AuthApiError::Network(err.to_string()))?;

        let envelope: Option<ApiEnvelope> = serde_json::from_str(&text).ok();

        // A reachable server that answers non-2xx has denied the call.
        if !status.is_success() {
            let message = envelope
                .and_then(|e| e.message)
                .unwrap_or_else(|| default_denial_message(status));
            log::debug!("{url} denied: {status}");
            return Err(AuthApiError::Rejected { message });
        }

        let Some(envelope) = envelope else {
            return Err(AuthApiError::Malformed(format!(
                "{path}: body is not valid JSON"
            )));
        };
        match envelope.success {
            Some(true) => Ok(envelope),
            Some(false) => Err(AuthApiError::Rejected {
                message: envelope
                    .message
                    .unwrap_or_else(|| "Operação recusada pelo servidor".to_string()),
            }),
            None => Err(AuthApiError::Malformed(format!(
                "{path}: success flag missing"
            ))),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiEnvelope, AuthApiError> {
        self.request(Method::POST, path, Some(body)).await
    }
}

fn default_denial_message(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            "Credenciais inválidas ou sessão expirada".to_string()
        }
        _ => format!("Solicitação recusada ({status})"),
    }
}

#[async_trait]
impl AuthApiPort for AuthApiClient {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginSuccess, AuthApiError> {
        let body = json!({ "identifier": identifier, "password": password });
        let envelope = self.post("/auth/login", &body).await?;
        match (envelope.user, envelope.token) {
            (Some(user), Some(token)) => Ok(LoginSuccess { user, token }),
            _ => Err(AuthApiError::Malformed(
                "/auth/login: user or token missing".to_string(),
            )),
        }
    }

    async fn verify_current_user(&self) -> Result<StaffUser, AuthApiError> {
        let envelope = self.request(Method::GET, "/auth/me", None).await?;
        envelope
            .user
            .ok_or_else(|| AuthApiError::Malformed("/auth/me: user missing".to_string()))
    }

    async fn register(&self, registration: &Registration) -> Result<(), AuthApiError> {
        let body = serde_json::to_value(registration)
            .map_err(|err| AuthApiError::Malformed(err.to_string()))?;
        self.post("/auth/register", &body).await.map(|_| ())
    }

    async fn send_verification_email(&self, email: &str) -> Result<(), AuthApiError> {
        self.post("/auth/send-verification-email", &json!({ "email": email }))
            .await
            .map(|_| ())
    }

    async fn verify_email_code(&self, email: &str, code: &str) -> Result<(), AuthApiError> {
        self.post(
            "/auth/verify-email-code",
            &json!({ "email": email, "code": code }),
        )
        .await
        .map(|_| ())
    }

    async fn logout(&self) -> Result<(), AuthApiError> {
        self.post("/auth/logout", &json!({})).await.map(|_| ())
    }

    async fn submit_intake(&self, record: &Map<String, Value>) -> Result<(), AuthApiError> {
        self.post("/intake", &Value::Object(record.clone()))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubTokens(Option<String>);

    impl TokenStorePort for StubTokens {
        fn get(&self) -> Option<String> {
            self.0.clone()
        }

        fn set(&self, _credential: &str) {}

        fn clear(&self) {}
    }

    fn client_for(url: &str, token: Option<&str>) -> AuthApiClient {
        AuthApiClient::new(url, Arc::new(StubTokens(token.map(str::to_string))))
    }

    #[tokio::test]
    async fn login_success_returns_user_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "success": true,
                    "user": {"id": "u-1", "login_identifier": "a@b.com", "display_name": "Dra. A"},
                    "token": "tok-1"
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        let result = client.login("a@b.com", "Segura123").await.unwrap();
        assert_eq!(result.token, "tok-1");
        assert_eq!(result.user.display_name, "Dra. A");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn denied_login_is_rejected_with_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(r#"{"success": false, "message": "Credenciais inválidas"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        let err = client.login("a@b.com", "wrong").await.unwrap_err();
        assert_eq!(
            err,
            AuthApiError::Rejected {
                message: "Credenciais inválidas".to_string()
            }
        );
    }

    #[tokio::test]
    async fn non_2xx_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/me")
            .with_status(401)
            .with_body(r#"{"success": false}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), Some("stale"));
        let err = client.verify_current_user().await.unwrap_err();
        assert!(matches!(err, AuthApiError::Rejected { .. }));
    }

    #[tokio::test]
    async fn missing_success_flag_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(r#"{"user": null, "token": null}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        let err = client.login("a@b.com", "Segura123").await.unwrap_err();
        assert!(matches!(err, AuthApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/logout")
            .with_status(200)
            .with_body("<html>proxy error</html>")
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        let err = client.logout().await.unwrap_err();
        assert!(matches!(err, AuthApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        // Nothing listens on this port.
        let client = client_for("http://127.0.0.1:9", None);
        let err = client.logout().await.unwrap_err();
        assert!(matches!(err, AuthApiError::Network(_)));
    }

    #[tokio::test]
    async fn stored_credential_is_attached_as_bearer_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/me")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_body(
                r#"{
                    "success": true,
                    "user": {"id": "u-1", "login_identifier": "a@b.com", "display_name": "Dra. A"}
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url(), Some("tok-1"));
        client.verify_current_user().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn intake_submission_posts_the_whole_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/intake")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"leito": "3B"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), Some("tok-1"));
        let mut record = Map::new();
        record.insert("leito".to_string(), Value::String("3B".to_string()));
        client.submit_intake(&record).await.unwrap();
        mock.assert_async().await;
    }
}
