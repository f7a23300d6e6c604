use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};

use crate::console::ConsoleState;

/// ActiveSession Extractor Result
///
/// Proof that the console held an authenticated session when the request
/// arrived. Handlers that proxy to the backend take it as an argument.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub token: String,
}

/// ActiveSession Extractor Implementation
///
/// Rejects with 401 when the console has no authenticated session. This is a
/// convenience for the shell; the backend still validates the token itself.
impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
    ConsoleState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let console = ConsoleState::from_ref(state);
        let session = console.session.snapshot();
        if !session.is_authenticated {
            tracing::debug!("rejecting request without an authenticated session");
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(ActiveSession {
            token: session.token,
        })
    }
}
