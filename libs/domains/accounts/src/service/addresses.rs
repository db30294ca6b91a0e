use uuid::Uuid;
use validator::Validate;

use super::UserManager;
use crate::error::{AccountError, AccountResult};
use crate::models::{Address, CreateAddress, UpdateAddress};
use crate::repository::AccountRepository;

pub struct AddressManager<R: AccountRepository> {
    users: UserManager<R>,
}

impl<R: AccountRepository> AddressManager<R> {
    pub fn new(users: UserManager<R>) -> Self {
        Self { users }
    }

    pub async fn create(&self, input: CreateAddress) -> AccountResult<Address> {
        input.validate()?;

        let address = self
            .users
            .repository()
            .insert_address(Address::new(input))
            .await?;

        tracing::info!(address_id = %address.id, "Created address");
        Ok(address)
    }

    pub async fn get(&self, id: Uuid) -> AccountResult<Address> {
        self.users
            .repository()
            .get_address(id)
            .await?
            .ok_or_else(|| AccountError::not_found("Address", id))
    }

    pub async fn update(&self, id: Uuid, input: UpdateAddress) -> AccountResult<Address> {
        input.validate()?;

        let mut address = self.get(id).await?;
        address.apply_update(input);

        let address = self.users.repository().update_address(address).await?;
        tracing::info!(address_id = %id, "Updated address");

        Ok(address)
    }

    /// Delete the address; links to it stay with the address cleared
    pub async fn delete(&self, id: Uuid) -> AccountResult<()> {
        if !self.users.repository().delete_address(id).await? {
            return Err(AccountError::not_found("Address", id));
        }

        tracing::info!(address_id = %id, "Deleted address");
        Ok(())
    }

    pub async fn list(&self, limit: usize, offset: usize) -> AccountResult<Vec<Address>> {
        self.users.repository().list_addresses(limit, offset).await
    }
}
