use dealwatch_core::UserId;

/// Caller identity for a request.
///
/// Always present on every route; `None` means the caller is anonymous.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct UserContext {
    user_id: Option<UserId>,
}

impl UserContext {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }
}
