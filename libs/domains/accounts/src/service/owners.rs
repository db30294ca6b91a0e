use uuid::Uuid;

use super::UserManager;
use crate::error::{AccountError, AccountResult};
use crate::hooks::UserKind;
use crate::models::{ExtraFields, Owner, Scope, UserQuery};
use crate::repository::AccountRepository;
use crate::validators::normalize_email;

/// Restaurant owners; every read is limited to `Scope::Owners`
pub struct OwnerManager<R: AccountRepository> {
    users: UserManager<R>,
}

impl<R: AccountRepository> OwnerManager<R> {
    pub fn new(users: UserManager<R>) -> Self {
        Self { users }
    }

    pub async fn create_restaurant_owner(
        &self,
        email: &str,
        password: &str,
        extra: ExtraFields,
    ) -> AccountResult<Owner> {
        let extra = extra.or_defaults(
            ExtraFields::new()
                .staff(true)
                .superuser(false)
                .customer(false),
        );
        let user = self
            .users
            .create(UserKind::Owner, email, password, extra)
            .await?;

        Ok(Owner::from_user(user))
    }

    /// Persist changes, re-asserting the owner flags
    pub async fn save(&self, owner: Owner) -> AccountResult<Owner> {
        let user = self
            .users
            .save_as(UserKind::Owner, owner.into_user())
            .await?;

        Ok(Owner::from_user(user))
    }

    pub async fn get(&self, id: Uuid) -> AccountResult<Owner> {
        let user = self.users.get(id).await?;
        if !Scope::Owners.matches(&user) {
            return Err(AccountError::not_found("Owner", id));
        }
        Ok(Owner::from_user(user))
    }

    pub async fn get_by_email(&self, email: &str) -> AccountResult<Owner> {
        let email = normalize_email(email);
        self.users
            .repository()
            .get_user_by_email(&email, Scope::Owners)
            .await?
            .map(Owner::from_user)
            .ok_or_else(|| AccountError::not_found("Owner", email))
    }

    pub async fn list(&self, limit: usize, offset: usize) -> AccountResult<(Vec<Owner>, usize)> {
        let query = UserQuery::scoped(Scope::Owners).page(limit, offset);
        let (users, total) = self.users.list(query).await?;
        Ok((users.into_iter().map(Owner::from_user).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::MockSaveListener;
    use crate::models::User;
    use crate::repository::MockAccountRepository;
    use mockall::predicate::eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_owner_flags_and_sender() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_insert_user()
            .withf(|user, _| {
                user.is_staff && !user.is_superuser && user.is_active && !user.is_customer
            })
            .times(1)
            .returning(|user, _| Ok(user));

        let mut listener = MockSaveListener::new();
        listener
            .expect_post_save()
            .withf(|event| event.created && event.sender == UserKind::Owner)
            .times(1)
            .return_const(());

        let manager = UserManager::new(mock_repo).with_listener(Arc::new(listener));
        let owner = manager
            .owners()
            .create_restaurant_owner(
                "chef@example.com",
                "pw",
                ExtraFields::new().superuser(true).active(false).customer(true),
            )
            .await
            .unwrap();

        assert!(owner.is_owner());
        assert!(owner.is_active);
        assert!(!owner.is_customer);
        assert_eq!(owner.get_profile_url(), "/owner/dashboard/");
    }

    #[tokio::test]
    async fn test_every_save_reasserts_owner_flags() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_update_user()
            .withf(|user| {
                user.is_staff && !user.is_superuser && user.is_active && !user.is_customer
            })
            .times(1)
            .returning(|user| Ok(user));

        let user = User::new(
            "chef@example.com".into(),
            String::new(),
            ExtraFields::new().staff(true),
        );
        let mut owner = Owner::try_from(user).unwrap();
        owner.is_staff = false;
        owner.is_superuser = true;
        owner.is_active = false;
        owner.is_customer = true;

        let saved = UserManager::new(mock_repo)
            .owners()
            .save(owner)
            .await
            .unwrap();
        assert!(saved.is_staff && !saved.is_superuser && saved.is_active);
    }

    #[tokio::test]
    async fn test_get_by_email_uses_owner_scope() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_get_user_by_email()
            .with(eq("admin@example.com"), eq(Scope::Owners))
            .returning(|_, _| Ok(None));

        let result = UserManager::new(mock_repo)
            .owners()
            .get_by_email("admin@example.com")
            .await;
        assert!(matches!(result, Err(AccountError::NotFound { entity: "Owner", .. })));
    }

    #[tokio::test]
    async fn test_get_rejects_superuser() {
        let admin = User::new(
            "root@example.com".into(),
            String::new(),
            ExtraFields::new().staff(true).superuser(true),
        );
        let id = admin.id;
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_get_user()
            .returning(move |_| Ok(Some(admin.clone())));

        let result = UserManager::new(mock_repo).owners().get(id).await;
        assert!(matches!(result, Err(AccountError::NotFound { entity: "Owner", .. })));
    }
}
