use uuid::Uuid;

use super::UserManager;
use crate::error::{AccountError, AccountResult};
use crate::hooks::UserKind;
use crate::models::{Address, Customer, CustomerAddress, ExtraFields, Scope, UserQuery};
use crate::repository::AccountRepository;
use crate::validators::normalize_email;

/// Customer accounts and their address book
pub struct CustomerManager<R: AccountRepository> {
    users: UserManager<R>,
}

impl<R: AccountRepository> CustomerManager<R> {
    pub fn new(users: UserManager<R>) -> Self {
        Self { users }
    }

    /// Create a customer; the customer flags win over any override
    pub async fn create_customer(
        &self,
        email: &str,
        password: &str,
        extra: ExtraFields,
    ) -> AccountResult<Customer> {
        let extra = extra.or_defaults(ExtraFields::new().customer(true).staff(false).superuser(false));
        let user = self
            .users
            .create(UserKind::Customer, email, password, extra)
            .await?;

        Ok(Customer::from_user(user))
    }

    /// Persist changes; flags are only forced when the customer is created
    pub async fn save(&self, customer: Customer) -> AccountResult<Customer> {
        let user = self
            .users
            .save_as(UserKind::Customer, customer.into_user())
            .await?;

        Ok(Customer::from_user(user))
    }

    /// `None` when no customer has this email
    pub async fn get_customer_by_email(&self, email: &str) -> AccountResult<Option<Customer>> {
        let email = normalize_email(email);
        let user = self
            .users
            .repository()
            .get_user_by_email(&email, Scope::Customers)
            .await?;

        if user.is_none() {
            tracing::debug!(email = %email, "No customer with email");
        }

        Ok(user.map(Customer::from_user))
    }

    pub async fn get(&self, id: Uuid) -> AccountResult<Customer> {
        let user = self.users.get(id).await?;
        if !Scope::Customers.matches(&user) {
            return Err(AccountError::not_found("Customer", id));
        }
        Ok(Customer::from_user(user))
    }

    pub async fn list(&self, limit: usize, offset: usize) -> AccountResult<(Vec<Customer>, usize)> {
        let query = UserQuery::scoped(Scope::Customers).page(limit, offset);
        let (users, total) = self.users.list(query).await?;
        Ok((users.into_iter().map(Customer::from_user).collect(), total))
    }

    pub async fn delete(&self, id: Uuid) -> AccountResult<()> {
        self.get(id).await?;
        self.users.delete(id).await
    }

    /// Link an existing address to the customer
    pub async fn add_address(
        &self,
        customer_id: Uuid,
        address_id: Uuid,
        main_address: bool,
    ) -> AccountResult<CustomerAddress> {
        self.get(customer_id).await?;

        let link = self
            .users
            .repository()
            .insert_customer_address(CustomerAddress::new(customer_id, address_id, main_address))
            .await?;

        tracing::info!(
            customer_id = %customer_id,
            address_id = %address_id,
            link_id = %link.id,
            main_address,
            "Linked address"
        );
        Ok(link)
    }

    /// Every link of the customer, main address first
    pub async fn addresses(
        &self,
        customer_id: Uuid,
    ) -> AccountResult<Vec<(CustomerAddress, Option<Address>)>> {
        self.get(customer_id).await?;
        self.users
            .repository()
            .list_customer_addresses(customer_id)
            .await
    }

    pub async fn main_address(&self, customer_id: Uuid) -> AccountResult<Option<Address>> {
        let links = self.addresses(customer_id).await?;
        Ok(links
            .into_iter()
            .find(|(link, _)| link.main_address)
            .and_then(|(_, address)| address))
    }

    /// Make `link_id` the only main address of the customer
    pub async fn set_main_address(&self, customer_id: Uuid, link_id: Uuid) -> AccountResult<()> {
        self.users
            .repository()
            .set_main_address(customer_id, link_id)
            .await?;

        tracing::info!(customer_id = %customer_id, link_id = %link_id, "Changed main address");
        Ok(())
    }

    pub async fn customer_address(&self, link_id: Uuid) -> AccountResult<CustomerAddress> {
        self.users
            .repository()
            .get_customer_address(link_id)
            .await?
            .ok_or_else(|| AccountError::not_found("CustomerAddress", link_id))
    }

    /// Remove the link only; the address itself is kept
    pub async fn remove_address(&self, link_id: Uuid) -> AccountResult<()> {
        if !self
            .users
            .repository()
            .delete_customer_address(link_id)
            .await?
        {
            return Err(AccountError::not_found("CustomerAddress", link_id));
        }

        tracing::info!(link_id = %link_id, "Removed customer address");
        Ok(())
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
    async fn test_create_customer_forces_flags() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_insert_user()
            .withf(|user, _| user.is_customer && !user.is_staff && !user.is_superuser)
            .times(1)
            .returning(|user, _| Ok(user));

        let mut listener = MockSaveListener::new();
        listener
            .expect_post_save()
            .withf(|event| event.created && event.sender == UserKind::Customer)
            .times(1)
            .return_const(());

        let manager = UserManager::new(mock_repo).with_listener(Arc::new(listener));
        let customer = manager
            .customers()
            .create_customer(
                "c@example.com",
                "pw",
                ExtraFields::new().staff(true).superuser(true).customer(false),
            )
            .await
            .unwrap();

        assert!(customer.is_customer);
        assert!(!customer.is_staff);
        assert!(!customer.is_superuser);
    }

    #[tokio::test]
    async fn test_save_does_not_force_flags() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_update_user()
            .withf(|user| user.is_staff)
            .times(1)
            .returning(|user| Ok(user));

        let manager = UserManager::new(mock_repo);
        let user = User::new(
            "c@example.com".into(),
            String::new(),
            ExtraFields::new().customer(true),
        );
        let mut customer = Customer::try_from(user).unwrap();
        customer.is_staff = true;

        let saved = manager.customers().save(customer).await.unwrap();
        assert!(saved.is_staff);
    }

    #[tokio::test]
    async fn test_get_customer_by_email_sentinel() {
        let customer = User::new(
            "known@example.com".into(),
            String::new(),
            ExtraFields::new().customer(true),
        );
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_get_user_by_email()
            .with(eq("known@example.com"), eq(Scope::Customers))
            .returning(move |_, _| Ok(Some(customer.clone())));
        mock_repo
            .expect_get_user_by_email()
            .with(eq("unknown@example.com"), eq(Scope::Customers))
            .returning(|_, _| Ok(None));

        let customers = UserManager::new(mock_repo).customers();

        let found = customers
            .get_customer_by_email("known@EXAMPLE.com")
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.to_string()), Some("known@example.com".to_string()));

        let missing = customers
            .get_customer_by_email("unknown@example.com")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_rejects_non_customer() {
        let owner = User::new(
            "o@example.com".into(),
            String::new(),
            ExtraFields::new().staff(true),
        );
        let id = owner.id;
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_get_user()
            .with(eq(id))
            .returning(move |_| Ok(Some(owner.clone())));

        let result = UserManager::new(mock_repo).customers().get(id).await;
        assert!(matches!(result, Err(AccountError::NotFound { entity: "Customer", .. })));
    }

    #[tokio::test]
    async fn test_add_main_address_in_one_write() {
        let customer = User::new(
            "c@example.com".into(),
            String::new(),
            ExtraFields::new().customer(true),
        );
        let customer_id = customer.id;
        let address_id = Uuid::now_v7();
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_get_user()
            .with(eq(customer_id))
            .returning(move |_| Ok(Some(customer.clone())));
        mock_repo
            .expect_insert_customer_address()
            .withf(move |link| {
                link.main_address
                    && link.customer_id == Some(customer_id)
                    && link.address_id == Some(address_id)
            })
            .times(1)
            .returning(|link| Ok(link));
        mock_repo.expect_set_main_address().times(0);

        let link = UserManager::new(mock_repo)
            .customers()
            .add_address(customer_id, address_id, true)
            .await
            .unwrap();
        assert!(link.main_address);
    }

    #[tokio::test]
    async fn test_address_book_of_unknown_customer() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo.expect_get_user().returning(|_| Ok(None));
        mock_repo.expect_list_customer_addresses().times(0);

        let customers = UserManager::new(mock_repo).customers();
        let id = Uuid::now_v7();

        assert!(matches!(
            customers.addresses(id).await,
            Err(AccountError::NotFound { .. })
        ));
        assert!(matches!(
            customers.main_address(id).await,
            Err(AccountError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_link() {
        let mut mock_repo = MockAccountRepository::new();
        mock_repo
            .expect_delete_customer_address()
            .returning(|_| Ok(false));

        let result = UserManager::new(mock_repo)
            .customers()
            .remove_address(Uuid::now_v7())
            .await;
        assert!(matches!(
            result,
            Err(AccountError::NotFound {
                entity: "CustomerAddress",
                ..
            })
        ));
    }
}
