//! Managers: the public entry points for account operations
//!
//! [`UserManager`] owns the repository and the registered listeners. The
//! role managers borrow its creation and save paths, so every write goes
//! through the same profile hook and notification step.

mod addresses;
mod customers;
mod owners;

pub use addresses::AddressManager;
pub use customers::CustomerManager;
pub use owners::OwnerManager;

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AccountError, AccountResult};
use crate::hooks::{PostSave, SaveListener, UserKind, profile_for_new_user};
use crate::models::{ExtraFields, NewUser, Profile, Scope, UpdateProfile, User, UserQuery};
use crate::password::hash_password;
use crate::repository::AccountRepository;
use crate::validators::normalize_email;

pub struct UserManager<R: AccountRepository> {
    repository: Arc<R>,
    listeners: Arc<Vec<Arc<dyn SaveListener>>>,
}

impl<R: AccountRepository> Clone for UserManager<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<R: AccountRepository> UserManager<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            listeners: Arc::new(Vec::new()),
        }
    }

    /// Register a listener for post-save events
    pub fn with_listener(mut self, listener: Arc<dyn SaveListener>) -> Self {
        Arc::make_mut(&mut self.listeners).push(listener);
        self
    }

    pub fn customers(&self) -> CustomerManager<R> {
        CustomerManager::new(self.clone())
    }

    pub fn owners(&self) -> OwnerManager<R> {
        OwnerManager::new(self.clone())
    }

    pub fn addresses(&self) -> AddressManager<R> {
        AddressManager::new(self.clone())
    }

    pub(crate) fn repository(&self) -> &R {
        &self.repository
    }

    /// Create a regular user
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        extra: ExtraFields,
    ) -> AccountResult<User> {
        self.create(UserKind::User, email, password, extra).await
    }

    /// Create a superuser; staff, superuser and active default to true
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        extra: ExtraFields,
    ) -> AccountResult<User> {
        let extra = extra.or_defaults(ExtraFields::new().staff(true).superuser(true).active(true));

        if extra.is_staff != Some(true) {
            return Err(AccountError::InvalidArgument(
                "Superuser must have is_staff=True.".to_string(),
            ));
        }
        if extra.is_superuser != Some(true) {
            return Err(AccountError::InvalidArgument(
                "Superuser must have is_superuser=True.".to_string(),
            ));
        }

        self.create_user(email, password, extra).await
    }

    /// Shared creation path for every kind of user
    pub(crate) async fn create(
        &self,
        kind: UserKind,
        email: &str,
        password: &str,
        extra: ExtraFields,
    ) -> AccountResult<User> {
        if email.trim().is_empty() {
            return Err(AccountError::InvalidArgument(
                "The Email must be set".to_string(),
            ));
        }

        let new_user = NewUser {
            email: normalize_email(email),
        };
        new_user.validate()?;

        let password_hash = hash_password(password)?;
        let mut user = User::new(new_user.email, password_hash, extra);
        kind.apply_save_rules(&mut user, true);

        let profile = profile_for_new_user(&user);
        let user = self.repository.insert_user(user, profile).await?;

        tracing::info!(user_id = %user.id, email = %user.email, kind = %kind, "Created user");
        self.notify(kind, &user, true);

        Ok(user)
    }

    /// Shared update path; applies the kind's flag rules first
    pub(crate) async fn save_as(&self, kind: UserKind, mut user: User) -> AccountResult<User> {
        kind.apply_save_rules(&mut user, false);

        let user = self.repository.update_user(user).await?;

        tracing::info!(user_id = %user.id, kind = %kind, "Updated user");
        self.notify(kind, &user, false);

        Ok(user)
    }

    fn notify(&self, sender: UserKind, user: &User, created: bool) {
        if self.listeners.is_empty() {
            return;
        }

        let event = PostSave {
            sender,
            user: user.clone(),
            created,
        };
        for listener in self.listeners.iter() {
            listener.post_save(&event);
        }
    }

    /// Persist changes to an existing user
    pub async fn save(&self, user: User) -> AccountResult<User> {
        self.save_as(UserKind::User, user).await
    }

    pub async fn get(&self, id: Uuid) -> AccountResult<User> {
        tracing::debug!(user_id = %id, "Fetching user");
        self.repository
            .get_user(id)
            .await?
            .ok_or_else(|| AccountError::not_found("User", id))
    }

    pub async fn get_by_email(&self, email: &str) -> AccountResult<User> {
        let email = normalize_email(email);
        tracing::debug!(email = %email, "Fetching user by email");
        self.repository
            .get_user_by_email(&email, Scope::All)
            .await?
            .ok_or_else(|| AccountError::not_found("User", email))
    }

    /// Users matching the query, plus the total ignoring paging
    pub async fn list(&self, query: UserQuery) -> AccountResult<(Vec<User>, usize)> {
        let total = self.repository.count_users(query.clone()).await?;
        let users = self.repository.list_users(query).await?;
        Ok((users, total))
    }

    pub async fn count(&self, query: UserQuery) -> AccountResult<usize> {
        self.repository.count_users(query).await
    }

    /// Delete a user and its profile; address links keep the row with the customer cleared
    pub async fn delete(&self, id: Uuid) -> AccountResult<()> {
        if !self.repository.delete_user(id).await? {
            return Err(AccountError::not_found("User", id));
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    pub async fn set_password(&self, id: Uuid, raw: &str) -> AccountResult<User> {
        let mut user = self.get(id).await?;
        user.set_password(raw)?;
        self.save(user).await
    }

    /// Check credentials of an active user and record the login time
    pub async fn authenticate(&self, email: &str, password: &str) -> AccountResult<User> {
        let email = normalize_email(email);

        let Some(mut user) = self
            .repository
            .get_user_by_email(&email, Scope::All)
            .await?
        else {
            tracing::warn!(email = %email, "Login for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !user.is_active || !user.check_password(password) {
            tracing::warn!(user_id = %user.id, "Rejected credentials");
            return Err(AccountError::InvalidCredentials);
        }

        user.last_login = Some(Utc::now());
        self.save(user).await
    }

    pub async fn verify_email(&self, id: Uuid) -> AccountResult<User> {
        let mut user = self.get(id).await?;
        user.is_verified = true;
        self.save(user).await
    }

    pub async fn profile(&self, user_id: Uuid) -> AccountResult<Profile> {
        self.repository
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AccountError::not_found("Profile", user_id))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: UpdateProfile,
    ) -> AccountResult<Profile> {
        update.validate()?;

        let mut profile = self.profile(user_id).await?;
        profile.apply_update(update);

        let profile = self.repository.update_profile(profile).await?;
        tracing::info!(user_id = %user_id, profile_id = %profile.id, "Updated profile");

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::MockSaveListener;
    use crate::repository::MockAccountRepository;
    use mockall::predicate::{always, eq};

    fn stored(email: &str, extra: ExtraFields) -> User {
        let mut user = User::new(email.to_string(), String::new(), extra);
        user.set_password("correct-horse").unwrap();
        user
    }

    #[tokio::test]
    async fn test_create_user_rejects_blank_email() {
        let mock_repo = MockAccountRepository::new();
        let manager = UserManager::new(mock_repo);

        for email in ["", "   "] {
            let result = manager.create_user(email, "pw", ExtraFields::new()).await;
            assert!(
                matches!(result, Err(AccountError::InvalidArgument(ref msg)) if msg == "The Email must be set")
            );
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_malformed_email() {
        let manager = UserManager::new(MockAccountRepository::new());
        let result = manager
            .create_user("not-an-email", "pw", ExtraFields::new())
            .await;
        assert!(matches!(result, Err(AccountError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_inserts_user_with_blank_profile() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_insert_user()
            .times(1)
            .withf(|user, profile| {
                user.email == "Ali@example.com"
                    && profile.user_id == user.id
                    && profile.first_name.is_empty()
                    && !user.is_staff
                    && !user.is_superuser
                    && user.is_active
            })
            .returning(|user, _| Ok(user));

        let manager = UserManager::new(mock_repo);
        let user = manager
            .create_user(" Ali@EXAMPLE.com ", "pw-123", ExtraFields::new())
            .await
            .unwrap();

        assert!(user.check_password("pw-123"));
        assert_ne!(user.password_hash, "pw-123");
    }

    #[tokio::test]
    async fn test_create_superuser_defaults_and_guards() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_insert_user()
            .times(1)
            .returning(|user, _| Ok(user));
        let manager = UserManager::new(mock_repo);

        let admin = manager
            .create_superuser("root@example.com", "pw", ExtraFields::new())
            .await
            .unwrap();
        assert!(admin.is_staff && admin.is_superuser && admin.is_active);

        let not_staff = manager
            .create_superuser("a@example.com", "pw", ExtraFields::new().staff(false))
            .await;
        assert!(matches!(not_staff, Err(AccountError::InvalidArgument(ref m)) if m.contains("is_staff")));

        let not_super = manager
            .create_superuser("b@example.com", "pw", ExtraFields::new().superuser(false))
            .await;
        assert!(matches!(not_super, Err(AccountError::InvalidArgument(ref m)) if m.contains("is_superuser")));
    }

    #[tokio::test]
    async fn test_listener_sees_created_then_updated() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo.expect_insert_user().returning(|user, _| Ok(user));
        mock_repo.expect_update_user().returning(|user| Ok(user));

        let mut listener = MockSaveListener::new();
        let mut seq = mockall::Sequence::new();
        listener
            .expect_post_save()
            .withf(|event| event.created && event.sender == UserKind::User)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        listener
            .expect_post_save()
            .withf(|event| !event.created && event.user.is_verified)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let manager = UserManager::new(mock_repo).with_listener(Arc::new(listener));
        let mut user = manager
            .create_user("l@example.com", "pw", ExtraFields::new())
            .await
            .unwrap();
        user.is_verified = true;
        manager.save(user).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_insert_notifies_nobody() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_insert_user()
            .returning(|user, _| Err(AccountError::DuplicateEmail(user.email)));

        let mut listener = MockSaveListener::new();
        listener.expect_post_save().never();

        let manager = UserManager::new(mock_repo).with_listener(Arc::new(listener));
        let result = manager
            .create_user("dup@example.com", "pw", ExtraFields::new())
            .await;
        assert!(matches!(result, Err(AccountError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let mut mock_repo = MockAccountRepository::new();
        let id = Uuid::now_v7();
        mock_repo
            .expect_get_user()
            .with(eq(id))
            .returning(|_| Ok(None));

        let manager = UserManager::new(mock_repo);
        let result = manager.get(id).await;
        assert!(matches!(result, Err(AccountError::NotFound { entity: "User", .. })));
    }

    #[tokio::test]
    async fn test_authenticate_updates_last_login() {
        let user = stored("in@example.com", ExtraFields::new());
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_get_user_by_email()
            .with(eq("in@example.com"), eq(Scope::All))
            .returning(move |_, _| Ok(Some(user.clone())));
        mock_repo
            .expect_update_user()
            .withf(|user| user.last_login.is_some())
            .times(1)
            .returning(|user| Ok(user));

        let manager = UserManager::new(mock_repo);
        let user = manager
            .authenticate("in@EXAMPLE.com", "correct-horse")
            .await
            .unwrap();
        assert!(user.last_login.is_some());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_wrong_password_and_inactive() {
        let active = stored("a@example.com", ExtraFields::new());
        let inactive = stored("i@example.com", ExtraFields::new().active(false));
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_get_user_by_email()
            .with(eq("a@example.com"), always())
            .returning(move |_, _| Ok(Some(active.clone())));
        mock_repo
            .expect_get_user_by_email()
            .with(eq("i@example.com"), always())
            .returning(move |_, _| Ok(Some(inactive.clone())));
        mock_repo
            .expect_get_user_by_email()
            .with(eq("nobody@example.com"), always())
            .returning(|_, _| Ok(None));
        mock_repo.expect_update_user().never();

        let manager = UserManager::new(mock_repo);
        for (email, password) in [
            ("a@example.com", "wrong"),
            ("i@example.com", "correct-horse"),
            ("nobody@example.com", "correct-horse"),
        ] {
            let result = manager.authenticate(email, password).await;
            assert!(matches!(result, Err(AccountError::InvalidCredentials)), "{email}");
        }
    }

    #[tokio::test]
    async fn test_update_profile_validates_before_lookup() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo.expect_get_profile().never();

        let manager = UserManager::new(mock_repo);
        let result = manager
            .update_profile(
                Uuid::now_v7(),
                UpdateProfile {
                    phone_number: Some("0098".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AccountError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo.expect_delete_user().returning(|_| Ok(false));

        let manager = UserManager::new(mock_repo);
        assert!(matches!(
            manager.delete(Uuid::now_v7()).await,
            Err(AccountError::NotFound { .. })
        ));
    }
}
