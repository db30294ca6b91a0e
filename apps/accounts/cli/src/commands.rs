//! Command handlers, independent of the argument parser

use chrono::{DateTime, Utc};
use domain_accounts::models::OWNER_DASHBOARD_URL;
use domain_accounts::{
    AccountRepository, AccountResult, ExtraFields, Role, Scope, User, UserManager, UserQuery,
};
use serde::Serialize;
use uuid::Uuid;

/// Which kind of account `create` makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Superuser,
    Customer,
    Owner,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub profile_url: &'static str,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        let profile_url = if Scope::Owners.matches(&user) {
            OWNER_DASHBOARD_URL
        } else {
            user.get_profile_url()
        };

        Self {
            id: user.id,
            role: user.role(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            profile_url,
            date_joined: user.date_joined,
            last_login: user.last_login,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserSummary,
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub total: usize,
    pub users: Vec<UserSummary>,
}

pub async fn create<R: AccountRepository>(
    users: &UserManager<R>,
    kind: AccountKind,
    email: &str,
    password: &str,
) -> AccountResult<UserSummary> {
    let user = match kind {
        AccountKind::Superuser => {
            users
                .create_superuser(email, password, ExtraFields::new())
                .await?
        }
        AccountKind::Customer => users
            .customers()
            .create_customer(email, password, ExtraFields::new())
            .await?
            .into_user(),
        AccountKind::Owner => users
            .owners()
            .create_restaurant_owner(email, password, ExtraFields::new())
            .await?
            .into_user(),
    };

    Ok(user.into())
}

pub async fn list<R: AccountRepository>(
    users: &UserManager<R>,
    scope: Scope,
    limit: usize,
    offset: usize,
) -> AccountResult<UserPage> {
    let (page, total) = users
        .list(UserQuery::scoped(scope).page(limit, offset))
        .await?;

    Ok(UserPage {
        total,
        users: page.into_iter().map(Into::into).collect(),
    })
}

pub async fn show<R: AccountRepository>(
    users: &UserManager<R>,
    email: &str,
) -> AccountResult<UserDetail> {
    let user = users.get_by_email(email).await?;
    let profile = users.profile(user.id).await?;

    Ok(UserDetail {
        user: user.into(),
        full_name: profile.get_fullname(),
        phone_number: profile.phone_number,
    })
}
