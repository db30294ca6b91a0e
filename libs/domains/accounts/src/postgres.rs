use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{
        address as addresses, customer_address as customer_addresses, profile as profiles,
        user as users,
    },
    error::{AccountError, AccountResult},
    models::{Address, CustomerAddress, Profile, Scope, User, UserQuery},
    repository::AccountRepository,
};

/// SeaORM-backed repository
///
/// Only the entity API is used, so the same code runs against PostgreSQL in
/// production and SQLite in tests.
#[derive(Clone)]
pub struct PgAccountRepository {
    db: DatabaseConnection,
}

impl PgAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn scope_condition(scope: Scope) -> Condition {
    match scope {
        Scope::All => Condition::all(),
        Scope::Customers => Condition::all().add(users::Column::IsCustomer.eq(true)),
        Scope::Owners => Condition::all()
            .add(users::Column::IsStaff.eq(true))
            .add(users::Column::IsSuperuser.eq(false))
            .add(users::Column::IsCustomer.eq(false)),
        Scope::Staff => Condition::all().add(users::Column::IsStaff.eq(true)),
        Scope::Superusers => Condition::all().add(users::Column::IsSuperuser.eq(true)),
    }
}

fn query_condition(query: &UserQuery) -> Condition {
    let mut condition = scope_condition(query.scope);

    if let Some(ref email) = query.email {
        condition = condition.add(users::Column::Email.contains(email));
    }
    if let Some(active) = query.is_active {
        condition = condition.add(users::Column::IsActive.eq(active));
    }

    condition
}

async fn customer_email<C: ConnectionTrait>(
    conn: &C,
    customer_id: Option<Uuid>,
) -> AccountResult<Option<String>> {
    let Some(id) = customer_id else {
        return Ok(None);
    };

    Ok(users::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(|model| model.email))
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert_user(&self, user: User, profile: Profile) -> AccountResult<User> {
        let email = user.email.clone();
        let txn = self.db.begin().await?;

        let model = match users::ActiveModel::from(user).insert(&txn).await {
            Ok(model) => model,
            Err(err) => {
                txn.rollback().await?;
                return Err(AccountError::from_write(err, &email));
            }
        };

        if let Err(err) = profiles::ActiveModel::from(&profile).insert(&txn).await {
            txn.rollback().await?;
            return Err(err.into());
        }

        txn.commit().await?;

        tracing::debug!(user_id = %model.id, profile_id = %profile.id, "Inserted user with profile");
        Ok(model.into())
    }

    async fn update_user(&self, user: User) -> AccountResult<User> {
        let id = user.id;
        let email = user.email.clone();

        let model = users::ActiveModel::from(user)
            .update(&self.db)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => AccountError::not_found("User", id),
                err => AccountError::from_write(err, &email),
            })?;

        Ok(model.into())
    }

    async fn get_user(&self, id: Uuid) -> AccountResult<Option<User>> {
        let model = users::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_user_by_email(&self, email: &str, scope: Scope) -> AccountResult<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(scope_condition(scope))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn list_users(&self, query: UserQuery) -> AccountResult<Vec<User>> {
        let models = users::Entity::find()
            .filter(query_condition(&query))
            .order_by_desc(users::Column::DateJoined)
            .order_by_desc(users::Column::Id)
            .limit(query.limit as u64)
            .offset(query.offset as u64)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_users(&self, query: UserQuery) -> AccountResult<usize> {
        let count = users::Entity::find()
            .filter(query_condition(&query))
            .count(&self.db)
            .await?;

        Ok(count as usize)
    }

    async fn delete_user(&self, id: Uuid) -> AccountResult<bool> {
        let txn = self.db.begin().await?;

        customer_addresses::Entity::update_many()
            .col_expr(
                customer_addresses::Column::CustomerId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(customer_addresses::Column::CustomerId.eq(id))
            .exec(&txn)
            .await?;

        profiles::Entity::delete_many()
            .filter(profiles::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = users::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    async fn get_profile(&self, user_id: Uuid) -> AccountResult<Option<Profile>> {
        let row = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?;

        Ok(row.map(|(profile, owner)| {
            let email = owner.map(|u| u.email).unwrap_or_default();
            profile.into_profile(email)
        }))
    }

    async fn update_profile(&self, profile: Profile) -> AccountResult<Profile> {
        let model = profiles::ActiveModel::from(&profile)
            .update(&self.db)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => AccountError::not_found("Profile", profile.id),
                err => err.into(),
            })?;

        Ok(model.into_profile(profile.user_email))
    }

    async fn insert_address(&self, address: Address) -> AccountResult<Address> {
        let model = addresses::ActiveModel::from(address).insert(&self.db).await?;
        Ok(model.into())
    }

    async fn get_address(&self, id: Uuid) -> AccountResult<Option<Address>> {
        let model = addresses::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_addresses(&self, limit: usize, offset: usize) -> AccountResult<Vec<Address>> {
        let models = addresses::Entity::find()
            .order_by_asc(addresses::Column::Id)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update_address(&self, address: Address) -> AccountResult<Address> {
        let id = address.id;

        let model = addresses::ActiveModel::from(address)
            .update(&self.db)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => AccountError::not_found("Address", id),
                err => err.into(),
            })?;

        Ok(model.into())
    }

    async fn delete_address(&self, id: Uuid) -> AccountResult<bool> {
        let txn = self.db.begin().await?;

        customer_addresses::Entity::update_many()
            .col_expr(
                customer_addresses::Column::AddressId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(customer_addresses::Column::AddressId.eq(id))
            .exec(&txn)
            .await?;

        let result = addresses::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    async fn insert_customer_address(
        &self,
        link: CustomerAddress,
    ) -> AccountResult<CustomerAddress> {
        let email = customer_email(&self.db, link.customer_id).await?;
        if let Some(customer_id) = link.customer_id {
            if email.is_none() {
                return Err(AccountError::not_found("Customer", customer_id));
            }
        }
        if let Some(address_id) = link.address_id {
            if addresses::Entity::find_by_id(address_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(AccountError::not_found("Address", address_id));
            }
        }

        let txn = self.db.begin().await?;

        if let (true, Some(customer_id)) = (link.main_address, link.customer_id) {
            customer_addresses::Entity::update_many()
                .col_expr(customer_addresses::Column::MainAddress, Expr::value(false))
                .filter(customer_addresses::Column::CustomerId.eq(customer_id))
                .exec(&txn)
                .await?;
        }

        let model = customer_addresses::ActiveModel::from(&link)
            .insert(&txn)
            .await?;

        txn.commit().await?;

        Ok(model.into_link(email))
    }

    async fn get_customer_address(&self, id: Uuid) -> AccountResult<Option<CustomerAddress>> {
        let row = customer_addresses::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?;

        Ok(row.map(|(link, customer)| link.into_link(customer.map(|u| u.email))))
    }

    async fn list_customer_addresses(
        &self,
        customer_id: Uuid,
    ) -> AccountResult<Vec<(CustomerAddress, Option<Address>)>> {
        let email = customer_email(&self.db, Some(customer_id)).await?;

        let rows = customer_addresses::Entity::find()
            .filter(customer_addresses::Column::CustomerId.eq(customer_id))
            .order_by_desc(customer_addresses::Column::MainAddress)
            .order_by_asc(customer_addresses::Column::Id)
            .find_also_related(addresses::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(link, address)| (link.into_link(email.clone()), address.map(Into::into)))
            .collect())
    }

    async fn set_main_address(&self, customer_id: Uuid, link_id: Uuid) -> AccountResult<()> {
        let txn = self.db.begin().await?;

        let owned = customer_addresses::Entity::find_by_id(link_id)
            .filter(customer_addresses::Column::CustomerId.eq(customer_id))
            .one(&txn)
            .await?
            .is_some();
        if !owned {
            txn.rollback().await?;
            return Err(AccountError::not_found("CustomerAddress", link_id));
        }

        customer_addresses::Entity::update_many()
            .col_expr(customer_addresses::Column::MainAddress, Expr::value(false))
            .filter(customer_addresses::Column::CustomerId.eq(customer_id))
            .exec(&txn)
            .await?;

        customer_addresses::Entity::update_many()
            .col_expr(customer_addresses::Column::MainAddress, Expr::value(true))
            .filter(customer_addresses::Column::Id.eq(link_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(())
    }

    async fn delete_customer_address(&self, id: Uuid) -> AccountResult<bool> {
        let result = customer_addresses::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
