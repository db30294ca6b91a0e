use serde::Serialize;
use std::fmt;
use std::ops::{Deref, DerefMut};
use strum::Display;

use super::User;
use crate::error::AccountError;

pub const OWNER_DASHBOARD_URL: &str = "/owner/dashboard/";

/// Which manager persisted a user; carried as the sender of save events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserKind {
    User,
    Customer,
    Owner,
}

impl UserKind {
    /// Flag rules applied before a write
    ///
    /// Customers get their flags forced only on first insert, owners on
    /// every save. An owner is never a customer.
    pub fn apply_save_rules(&self, user: &mut User, creating: bool) {
        match self {
            UserKind::User => {}
            UserKind::Customer => {
                if creating {
                    user.is_staff = false;
                    user.is_superuser = false;
                    user.is_customer = true;
                }
            }
            UserKind::Owner => {
                user.is_staff = true;
                user.is_superuser = false;
                user.is_customer = false;
                user.is_active = true;
            }
        }
    }
}

/// A user flagged as a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Customer(User);

impl Customer {
    pub(crate) fn from_user(user: User) -> Self {
        Self(user)
    }

    pub fn into_user(self) -> User {
        self.0
    }
}

impl TryFrom<User> for Customer {
    type Error = AccountError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        if !user.is_customer {
            return Err(AccountError::InvalidArgument(format!(
                "{} is not a customer",
                user.email
            )));
        }
        Ok(Self(user))
    }
}

impl Deref for Customer {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl DerefMut for Customer {
    fn deref_mut(&mut self) -> &mut User {
        &mut self.0
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A restaurant owner: staff, never superuser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Owner(User);

impl Owner {
    pub(crate) fn from_user(user: User) -> Self {
        Self(user)
    }

    pub fn into_user(self) -> User {
        self.0
    }

    pub fn get_profile_url(&self) -> &'static str {
        OWNER_DASHBOARD_URL
    }
}

impl TryFrom<User> for Owner {
    type Error = AccountError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        if !user.is_owner() || user.is_customer {
            return Err(AccountError::InvalidArgument(format!(
                "{} is not a restaurant owner",
                user.email
            )));
        }
        Ok(Self(user))
    }
}

impl Deref for Owner {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl DerefMut for Owner {
    fn deref_mut(&mut self) -> &mut User {
        &mut self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
