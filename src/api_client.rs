use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ConsoleError,
    models::{
        API_SUCCESS_CODE, ApiEnvelope, CreateListenerRequest, ListenerData, LoginRequestData,
        LoginTokenInfo,
    },
    session::SessionState,
};

// 1. ConsoleApi Contract
/// ConsoleApi
///
/// The backend calls the console makes. Every call but `login` carries the
/// current session token; a rejected token silently resets the session.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Exchanges credentials for a token. Does not touch the session.
    async fn login(&self, credentials: &LoginRequestData) -> Result<LoginTokenInfo, ConsoleError>;

    async fn list_https_listeners(&self) -> Result<Vec<ListenerData>, ConsoleError>;

    async fn create_https_listener(
        &self,
        request: &CreateListenerRequest,
    ) -> Result<ListenerData, ConsoleError>;

    async fn delete_https_listener(&self, uuid: Uuid) -> Result<(), ConsoleError>;

    /// Flips the listener between enabled and disabled.
    async fn change_https_listener_status(&self, uuid: Uuid) -> Result<ListenerData, ConsoleError>;
}

/// ApiState
///
/// The shared handle the shell's handlers use.
pub type ApiState = Arc<dyn ConsoleApi>;

// 2. The Real Implementation (reqwest)
/// HttpConsoleApi
///
/// Talks JSON to the listener backend. Responses come wrapped in an
/// `ApiEnvelope` whose `code` must be 200.
#[derive(Clone)]
pub struct HttpConsoleApi {
    client: reqwest::Client,
    base_url: String,
    login_url: String,
    session: SessionState,
}

impl HttpConsoleApi {
    pub fn new(base_url: &str, login_url: &str, session: SessionState) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            login_url: login_url.to_string(),
            session,
        }
    }

    fn listeners_url(&self) -> String {
        format!("{}/api/listener/https", self.base_url)
    }

    /// Attaches `Authorization: Bearer <token>` when a token is held.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.session.token();
        if token.is_empty() {
            return request;
        }
        request.header(header::AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Unwraps the envelope. A 401 (HTTP status or envelope code) resets the
    /// session token before reporting `Unauthorized`.
    async fn read_envelope<T: DeserializeOwned>(&self, response: Response) -> Result<Option<T>, ConsoleError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.reject_session());
        }

        let body = response.text().await?;
        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ConsoleError::Upstream {
                    code: i64::from(status.as_u16()),
                    message: body,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if envelope.code == i64::from(StatusCode::UNAUTHORIZED.as_u16()) {
            return Err(self.reject_session());
        }
        if envelope.code != API_SUCCESS_CODE {
            tracing::warn!(code = envelope.code, msg = %envelope.msg, "backend call failed");
            return Err(ConsoleError::Upstream {
                code: envelope.code,
                message: envelope.msg,
            });
        }
        Ok(envelope.data)
    }

    fn reject_session(&self) -> ConsoleError {
        tracing::warn!("backend rejected the session token");
        self.session.reset_token();
        ConsoleError::Unauthorized
    }
}

fn required<T>(data: Option<T>, what: &str) -> Result<T, ConsoleError> {
    data.ok_or_else(|| ConsoleError::Serialization(format!("response carried no {what}")))
}

#[async_trait]
impl ConsoleApi for HttpConsoleApi {
    async fn login(&self, credentials: &LoginRequestData) -> Result<LoginTokenInfo, ConsoleError> {
        let response = self
            .client
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await?;
        let info: LoginTokenInfo = required(self.read_envelope(response).await?, "token")?;
        if info.token_value.is_empty() {
            return Err(ConsoleError::invalid_argument("backend returned an empty token"));
        }
        tracing::info!(login_id = %info.login_id, "login succeeded");
        Ok(info)
    }

    async fn list_https_listeners(&self) -> Result<Vec<ListenerData>, ConsoleError> {
        let response = self
            .authorized(self.client.get(self.listeners_url()))
            .send()
            .await?;
        Ok(self.read_envelope(response).await?.unwrap_or_default())
    }

    async fn create_https_listener(
        &self,
        request: &CreateListenerRequest,
    ) -> Result<ListenerData, ConsoleError> {
        let response = self
            .authorized(self.client.post(self.listeners_url()).json(request))
            .send()
            .await?;
        required(self.read_envelope(response).await?, "listener")
    }

    async fn delete_https_listener(&self, uuid: Uuid) -> Result<(), ConsoleError> {
        let url = format!("{}/{uuid}", self.listeners_url());
        let response = self.authorized(self.client.delete(url)).send().await?;
        self.read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn change_https_listener_status(&self, uuid: Uuid) -> Result<ListenerData, ConsoleError> {
        let url = format!("{}/{uuid}/status", self.listeners_url());
        let response = self.authorized(self.client.put(url)).send().await?;
        required(self.read_envelope(response).await?, "listener")
    }
}
