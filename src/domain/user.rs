use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Opaque identifier issued by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The identity an operation runs on behalf of. `None` means the identity
/// provider produced no valid session for the request.
#[derive(Debug, Clone, Default)]
pub struct Actor(pub Option<UserId>);

impl Actor {
    pub fn authenticated(id: impl Into<String>) -> Self { Self(Some(UserId::new(id))) }

    pub fn anonymous() -> Self { Self(None) }

    pub fn require(&self) -> Result<&UserId> {
        self.0.as_ref().ok_or(Error::Unauthenticated)
    }
}
