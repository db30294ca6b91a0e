//! Lifecycle hooks around user persistence
//!
//! Creating a user always builds its blank [`Profile`], which the repository
//! writes in the same transaction. After every successful save the manager
//! hands a [`PostSave`] event to each registered [`SaveListener`].

use serde::Serialize;

use crate::models::{Profile, User};

pub use crate::models::UserKind;

/// Notification sent after a user row was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSave {
    pub sender: UserKind,
    pub user: User,
    /// True only for the insert that created the row
    pub created: bool,
}

/// Receiver of post-save events
///
/// Listeners run synchronously on the saving task, after the write has
/// committed, and cannot fail the save.
#[cfg_attr(test, mockall::automock)]
pub trait SaveListener: Send + Sync {
    fn post_save(&self, event: &PostSave);
}

/// Logs every save at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl SaveListener for TracingListener {
    fn post_save(&self, event: &PostSave) {
        tracing::debug!(
            user_id = %event.user.id,
            sender = %event.sender,
            created = event.created,
            "User saved"
        );
    }
}

/// Companion profile for a user about to be inserted
pub fn profile_for_new_user(user: &User) -> Profile {
    Profile::blank(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtraFields;

    #[test]
    fn test_profile_for_new_user_is_bound_and_blank() {
        let user = User::new("h@example.com".into(), String::new(), ExtraFields::new());
        let profile = profile_for_new_user(&user);

        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.user_email, user.email);
        assert_eq!(profile.get_fullname(), crate::models::NEW_USER_LABEL);
    }

    #[test]
    fn test_tracing_listener_accepts_events() {
        let user = User::new("h@example.com".into(), String::new(), ExtraFields::new());
        TracingListener.post_save(&PostSave {
            sender: UserKind::User,
            user,
            created: true,
        });
    }
}
