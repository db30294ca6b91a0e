use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::models::{Address, CustomerAddress, Profile, Scope, User, UserQuery};

/// Storage seam for users, profiles and addresses
///
/// Implementations must make `insert_user` atomic: the user row and its
/// profile row are written together or not at all. Deletes clear the
/// matching references on `CustomerAddress` rows instead of removing them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new user together with its profile
    async fn insert_user(&self, user: User, profile: Profile) -> AccountResult<User>;

    /// Overwrite an existing user row
    async fn update_user(&self, user: User) -> AccountResult<User>;

    async fn get_user(&self, id: Uuid) -> AccountResult<Option<User>>;

    /// Exact email match within `scope`
    async fn get_user_by_email(&self, email: &str, scope: Scope) -> AccountResult<Option<User>>;

    /// Newest first, paged by the query
    async fn list_users(&self, query: UserQuery) -> AccountResult<Vec<User>>;

    /// Count ignoring the query's paging
    async fn count_users(&self, query: UserQuery) -> AccountResult<usize>;

    /// Delete a user and its profile; returns false when nothing matched
    async fn delete_user(&self, id: Uuid) -> AccountResult<bool>;

    async fn get_profile(&self, user_id: Uuid) -> AccountResult<Option<Profile>>;

    async fn update_profile(&self, profile: Profile) -> AccountResult<Profile>;

    async fn insert_address(&self, address: Address) -> AccountResult<Address>;

    async fn get_address(&self, id: Uuid) -> AccountResult<Option<Address>>;

    async fn list_addresses(&self, limit: usize, offset: usize) -> AccountResult<Vec<Address>>;

    async fn update_address(&self, address: Address) -> AccountResult<Address>;

    async fn delete_address(&self, id: Uuid) -> AccountResult<bool>;

    /// Insert a link; a main link demotes the customer's other links in the same write
    async fn insert_customer_address(
        &self,
        link: CustomerAddress,
    ) -> AccountResult<CustomerAddress>;

    async fn get_customer_address(&self, id: Uuid) -> AccountResult<Option<CustomerAddress>>;

    /// Links of one customer, main address first, with the address when it still exists
    async fn list_customer_addresses(
        &self,
        customer_id: Uuid,
    ) -> AccountResult<Vec<(CustomerAddress, Option<Address>)>>;

    /// Mark `link_id` as the customer's only main address
    async fn set_main_address(&self, customer_id: Uuid, link_id: Uuid) -> AccountResult<()>;

    async fn delete_customer_address(&self, id: Uuid) -> AccountResult<bool>;
}

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    /// Keyed by user id
    profiles: HashMap<Uuid, Profile>,
    addresses: HashMap<Uuid, Address>,
    links: HashMap<Uuid, CustomerAddress>,
}

impl Store {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn with_customer_email(&self, mut link: CustomerAddress) -> CustomerAddress {
        link.customer_email = link
            .customer_id
            .and_then(|id| self.users.get(&id))
            .map(|u| u.email.clone());
        link
    }
}

/// In-memory implementation of AccountRepository (for development/testing)
///
/// A single lock guards every table, so multi-row writes are atomic.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert_user(&self, user: User, profile: Profile) -> AccountResult<User> {
        let mut store = self.store.write().await;

        if store.email_taken(&user.email, None) {
            return Err(AccountError::DuplicateEmail(user.email));
        }
        if store.profiles.contains_key(&user.id) {
            return Err(AccountError::Internal(format!(
                "Profile already exists for user {}",
                user.id
            )));
        }

        store.profiles.insert(user.id, profile);
        store.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_user(&self, user: User) -> AccountResult<User> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&user.id) {
            return Err(AccountError::not_found("User", user.id));
        }
        if store.email_taken(&user.email, Some(user.id)) {
            return Err(AccountError::DuplicateEmail(user.email));
        }

        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AccountResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str, scope: Scope) -> AccountResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|u| u.email == email && scope.matches(u))
            .cloned())
    }

    async fn list_users(&self, query: UserQuery) -> AccountResult<Vec<User>> {
        let store = self.store.read().await;

        let mut result: Vec<User> = store
            .users
            .values()
            .filter(|u| query.matches(u))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            b.date_joined
                .cmp(&a.date_joined)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(result
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn count_users(&self, query: UserQuery) -> AccountResult<usize> {
        let store = self.store.read().await;
        Ok(store.users.values().filter(|u| query.matches(u)).count())
    }

    async fn delete_user(&self, id: Uuid) -> AccountResult<bool> {
        let mut store = self.store.write().await;

        if store.users.remove(&id).is_none() {
            return Ok(false);
        }
        store.profiles.remove(&id);
        for link in store.links.values_mut() {
            if link.customer_id == Some(id) {
                link.customer_id = None;
            }
        }

        Ok(true)
    }

    async fn get_profile(&self, user_id: Uuid) -> AccountResult<Option<Profile>> {
        let store = self.store.read().await;

        Ok(store.profiles.get(&user_id).map(|profile| {
            let mut profile = profile.clone();
            if let Some(user) = store.users.get(&user_id) {
                profile.user_email = user.email.clone();
            }
            profile
        }))
    }

    async fn update_profile(&self, profile: Profile) -> AccountResult<Profile> {
        let mut store = self.store.write().await;

        match store.profiles.get_mut(&profile.user_id) {
            Some(existing) if existing.id == profile.id => {
                *existing = profile.clone();
                Ok(profile)
            }
            _ => Err(AccountError::not_found("Profile", profile.id)),
        }
    }

    async fn insert_address(&self, address: Address) -> AccountResult<Address> {
        let mut store = self.store.write().await;
        store.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn get_address(&self, id: Uuid) -> AccountResult<Option<Address>> {
        let store = self.store.read().await;
        Ok(store.addresses.get(&id).cloned())
    }

    async fn list_addresses(&self, limit: usize, offset: usize) -> AccountResult<Vec<Address>> {
        let store = self.store.read().await;

        let mut result: Vec<Address> = store.addresses.values().cloned().collect();
        result.sort_by_key(|a| a.id);

        Ok(result.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_address(&self, address: Address) -> AccountResult<Address> {
        let mut store = self.store.write().await;

        match store.addresses.get_mut(&address.id) {
            Some(existing) => {
                *existing = address.clone();
                Ok(address)
            }
            None => Err(AccountError::not_found("Address", address.id)),
        }
    }

    async fn delete_address(&self, id: Uuid) -> AccountResult<bool> {
        let mut store = self.store.write().await;

        if store.addresses.remove(&id).is_none() {
            return Ok(false);
        }
        for link in store.links.values_mut() {
            if link.address_id == Some(id) {
                link.address_id = None;
            }
        }

        Ok(true)
    }

    async fn insert_customer_address(
        &self,
        link: CustomerAddress,
    ) -> AccountResult<CustomerAddress> {
        let mut store = self.store.write().await;

        if let Some(customer_id) = link.customer_id {
            if !store.users.contains_key(&customer_id) {
                return Err(AccountError::not_found("Customer", customer_id));
            }
        }
        if let Some(address_id) = link.address_id {
            if !store.addresses.contains_key(&address_id) {
                return Err(AccountError::not_found("Address", address_id));
            }
        }

        if let (true, Some(customer_id)) = (link.main_address, link.customer_id) {
            for other in store.links.values_mut() {
                if other.customer_id == Some(customer_id) {
                    other.main_address = false;
                }
            }
        }

        let link = store.with_customer_email(link);
        store.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn get_customer_address(&self, id: Uuid) -> AccountResult<Option<CustomerAddress>> {
        let store = self.store.read().await;
        Ok(store
            .links
            .get(&id)
            .cloned()
            .map(|link| store.with_customer_email(link)))
    }

    async fn list_customer_addresses(
        &self,
        customer_id: Uuid,
    ) -> AccountResult<Vec<(CustomerAddress, Option<Address>)>> {
        let store = self.store.read().await;

        let mut links: Vec<CustomerAddress> = store
            .links
            .values()
            .filter(|link| link.customer_id == Some(customer_id))
            .cloned()
            .collect();
        links.sort_by(|a, b| b.main_address.cmp(&a.main_address).then(a.id.cmp(&b.id)));

        Ok(links
            .into_iter()
            .map(|link| {
                let address = link
                    .address_id
                    .and_then(|id| store.addresses.get(&id))
                    .cloned();
                (store.with_customer_email(link), address)
            })
            .collect())
    }

    async fn set_main_address(&self, customer_id: Uuid, link_id: Uuid) -> AccountResult<()> {
        let mut store = self.store.write().await;

        let owned = store
            .links
            .get(&link_id)
            .is_some_and(|link| link.customer_id == Some(customer_id));
        if !owned {
            return Err(AccountError::not_found("CustomerAddress", link_id));
        }

        for link in store.links.values_mut() {
            if link.customer_id == Some(customer_id) {
                link.main_address = link.id == link_id;
            }
        }

        Ok(())
    }

    async fn delete_customer_address(&self, id: Uuid) -> AccountResult<bool> {
        let mut store = self.store.write().await;
        Ok(store.links.remove(&id).is_some())
    }
}
