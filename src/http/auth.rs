use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::user::Actor;

/// Headers injected by the authentication proxy in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Acting identity for one request, as resolved by the identity provider.
/// Extraction never fails; an absent or empty id header yields an
/// anonymous actor and the service layer rejects it.
pub struct Identity {
    pub actor: Actor,
    pub email: Option<String>,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        Ok(match header(USER_ID_HEADER) {
            Some(id) => Identity {
                actor: Actor::authenticated(id),
                email: header(USER_EMAIL_HEADER),
            },
            None => Identity { actor: Actor::anonymous(), email: None },
        })
    }
}
