//! Ownership-based visibility shared by every owned record in the domain.

/// Anything that may belong to a single user or be globally visible.
pub trait Owned {
    /// `None` marks a global record.
    fn owner_user_id(&self) -> Option<&str>;

    fn is_global(&self) -> bool {
        self.owner_user_id().is_none()
    }

    fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_user_id() == Some(user_id)
    }

    /// Admins see everything, everyone sees global records, owners see their own.
    fn can_user_access(&self, user_id: &str, is_admin: bool) -> bool {
        is_admin || self.is_global() || self.is_owned_by(user_id)
    }
}
