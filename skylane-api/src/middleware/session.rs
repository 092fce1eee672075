use axum::{extract::FromRequestParts, http::request::Parts};
use skylane_core::{Capability, Role, Session};

use crate::error::AppError;

// Set by the gateway that owns authentication; tokens never reach this service.
pub const USER_HEADER: &str = "x-skylane-user";
pub const ROLE_HEADER: &str = "x-skylane-role";

/// The caller's session, rebuilt from gateway headers on every request.
#[derive(Debug, Clone)]
pub struct Caller(pub Session);

impl Caller {
    pub fn require(&self, capability: Capability) -> Result<&Session, AppError> {
        self.0.require(capability).map_err(AppError::from_session)?;
        Ok(&self.0)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        let header = |name: &'static str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let user_id = header(USER_HEADER)
            .ok_or_else(|| AppError::AuthenticationError("Missing session user".to_string()))?;
        let role: Role = header(ROLE_HEADER)
            .ok_or_else(|| AppError::AuthenticationError("Missing session role".to_string()))?
            .parse()
            .map_err(AppError::from_session)?;

        Ok(Caller(Session::new(user_id, role)))
    }
}
