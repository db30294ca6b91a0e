use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use crate::error::AccountResult;
use crate::password::{hash_password, verify_password};

pub const DASHBOARD_URL: &str = "dashboard/";

/// Authentication identity, keyed by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_customer: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build an unsaved user; unset flags take the column defaults
    pub fn new(email: String, password_hash: String, extra: ExtraFields) -> Self {
        Self {
            id: Uuid::now_v7(),
            email,
            password_hash,
            is_staff: extra.is_staff.unwrap_or(false),
            is_superuser: extra.is_superuser.unwrap_or(false),
            is_active: extra.is_active.unwrap_or(true),
            is_verified: extra.is_verified.unwrap_or(false),
            is_customer: extra.is_customer.unwrap_or(false),
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.is_staff && !self.is_superuser
    }

    pub fn get_profile_url(&self) -> &'static str {
        DASHBOARD_URL
    }

    pub fn role(&self) -> Role {
        if self.is_superuser {
            Role::Admin
        } else if self.is_customer {
            Role::Customer
        } else if self.is_staff {
            Role::Owner
        } else {
            Role::Member
        }
    }

    pub fn check_password(&self, raw: &str) -> bool {
        verify_password(raw, &self.password_hash)
    }

    /// Replace the stored hash; the change is persisted on the next save
    pub fn set_password(&mut self, raw: &str) -> AccountResult<()> {
        self.password_hash = hash_password(raw)?;
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Optional flag overrides passed to the creation methods
///
/// A `None` field is filled by the manager's defaults, a `Some` field is kept
/// as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFields {
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_customer: Option<bool>,
}

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staff(mut self, value: bool) -> Self {
        self.is_staff = Some(value);
        self
    }

    pub fn superuser(mut self, value: bool) -> Self {
        self.is_superuser = Some(value);
        self
    }

    pub fn active(mut self, value: bool) -> Self {
        self.is_active = Some(value);
        self
    }

    pub fn verified(mut self, value: bool) -> Self {
        self.is_verified = Some(value);
        self
    }

    pub fn customer(mut self, value: bool) -> Self {
        self.is_customer = Some(value);
        self
    }

    /// Fill every unset flag from `defaults`
    pub fn or_defaults(self, defaults: ExtraFields) -> Self {
        Self {
            is_staff: self.is_staff.or(defaults.is_staff),
            is_superuser: self.is_superuser.or(defaults.is_superuser),
            is_active: self.is_active.or(defaults.is_active),
            is_verified: self.is_verified.or(defaults.is_verified),
            is_customer: self.is_customer.or(defaults.is_customer),
        }
    }
}

/// Email accepted by the creation path, after normalization
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(email, length(max = 255))]
    pub email: String,
}

/// Derived role, highest privilege first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
    Owner,
    Member,
}

/// Named subset of users a query is restricted to
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Customers,
    Owners,
    Staff,
    Superusers,
}

impl Scope {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Scope::All => true,
            Scope::Customers => user.is_customer,
            Scope::Owners => user.is_owner() && !user.is_customer,
            Scope::Staff => user.is_staff,
            Scope::Superusers => user.is_superuser,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub scope: Scope,
    /// Substring of the stored email
    pub email: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            scope: Scope::All,
            email: None,
            is_active: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl UserQuery {
    pub fn scoped(scope: Scope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn matches(&self, user: &User) -> bool {
        self.scope.matches(user)
            && self
                .email
                .as_deref()
                .is_none_or(|needle| user.email.contains(needle))
            && self.is_active.is_none_or(|active| user.is_active == active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(extra: ExtraFields) -> User {
        User::new("a@example.com".into(), String::new(), extra)
    }

    #[test]
    fn test_new_user_defaults() {
        let user = user(ExtraFields::new());
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        assert!(user.is_active);
        assert!(!user.is_verified);
        assert!(!user.is_customer);
        assert!(user.last_login.is_none());
        assert_eq!(user.role(), Role::Member);
        assert_eq!(user.to_string(), "a@example.com");
        assert_eq!(user.get_profile_url(), "dashboard/");
    }

    #[test]
    fn test_or_defaults_keeps_explicit_values() {
        let extra = ExtraFields::new()
            .staff(false)
            .or_defaults(ExtraFields::new().staff(true).superuser(true));
        assert_eq!(extra.is_staff, Some(false));
        assert_eq!(extra.is_superuser, Some(true));
        assert_eq!(extra.is_active, None);
    }

    #[test]
    fn test_role_precedence() {
        assert_eq!(user(ExtraFields::new().staff(true).superuser(true)).role(), Role::Admin);
        assert_eq!(user(ExtraFields::new().customer(true).staff(true)).role(), Role::Customer);
        assert_eq!(user(ExtraFields::new().staff(true)).role(), Role::Owner);
        assert!(Role::Admin < Role::Member);
    }

    #[test]
    fn test_is_owner() {
        assert!(user(ExtraFields::new().staff(true)).is_owner());
        assert!(!user(ExtraFields::new().staff(true).superuser(true)).is_owner());
        assert!(!user(ExtraFields::new()).is_owner());
    }

    #[test]
    fn test_owner_scope_excludes_customers_and_superusers() {
        let owner = user(ExtraFields::new().staff(true));
        let customer_staff = user(ExtraFields::new().staff(true).customer(true));
        let admin = user(ExtraFields::new().staff(true).superuser(true));
        let plain = user(ExtraFields::new());

        assert!(Scope::Owners.matches(&owner));
        assert!(!Scope::Owners.matches(&customer_staff));
        assert!(!Scope::Owners.matches(&admin));
        assert!(!Scope::Owners.matches(&plain));
        assert!(Scope::Staff.matches(&admin));
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!("owners".parse::<Scope>().unwrap(), Scope::Owners);
        assert!("admins".parse::<Scope>().is_err());
    }

    #[test]
    fn test_query_matches_filters() {
        let mut u = user(ExtraFields::new().active(false));
        u.email = "shop@example.com".into();

        assert!(UserQuery::default().matches(&u));
        assert!(
            UserQuery {
                email: Some("shop".into()),
                ..Default::default()
            }
            .matches(&u)
        );
        assert!(
            !UserQuery {
                is_active: Some(true),
                ..Default::default()
            }
            .matches(&u)
        );
    }

    #[test]
    fn test_new_user_email_validation() {
        assert!(NewUser { email: "ok@example.com".into() }.validate().is_ok());
        assert!(NewUser { email: "missing-at".into() }.validate().is_err());
    }

    #[test]
    fn test_serialized_user_hides_password_hash() {
        let mut u = user(ExtraFields::new().customer(true));
        u.set_password("hidden").unwrap();

        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@example.com");
        assert_eq!(json["is_customer"], true);
    }

    #[test]
    fn test_password_roundtrip() {
        let mut u = user(ExtraFields::new());
        u.set_password("hunter22").unwrap();
        assert!(u.check_password("hunter22"));
        assert!(!u.check_password("hunter23"));
    }
}
