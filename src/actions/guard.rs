use serde::{Deserialize, Serialize};

use crate::dao::session::SessionUser;
use crate::error::{AdminError, AdminResult};

/// Caller identity resolved from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub is_admin: bool,
}

impl From<SessionUser> for Session {
    fn from(user: SessionUser) -> Self {
        Self {
            user_id: user.user_id,
            is_admin: user.is_admin,
        }
    }
}

/// The one authorization check every admin operation runs first.
pub fn require_admin(session: Option<&Session>) -> AdminResult<&Session> {
    match session {
        Some(session) if session.is_admin => Ok(session),
        _ => Err(AdminError::NotAllowed),
    }
}
