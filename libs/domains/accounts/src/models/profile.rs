use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::User;
use crate::validators::validate_optional_phone;

/// Shown instead of a name until the user fills one in ("new user")
pub const NEW_USER_LABEL: &str = "کاربر جدید";

/// One-to-one companion record of a `User`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Owning user's email, loaded with the profile
    pub user_email: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub phone_number: String,
    pub description: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Profile {
    /// The empty profile created alongside a new user
    pub fn blank(user: &User) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: user.id,
            user_email: user.email.clone(),
            first_name: String::new(),
            last_name: String::new(),
            image: None,
            phone_number: String::new(),
            description: String::new(),
            created_date: now,
            updated_date: now,
        }
    }

    pub fn get_fullname(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            NEW_USER_LABEL.to_string()
        } else {
            parts.join(" ")
        }
    }

    pub fn apply_update(&mut self, update: UpdateProfile) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.updated_date = Utc::now();
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_email)
    }
}

/// Partial profile update; `image: Some(None)` clears the image
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(max = 250))]
    pub first_name: Option<String>,
    #[validate(length(max = 250))]
    pub last_name: Option<String>,
    pub image: Option<Option<String>>,
    #[validate(length(max = 13), custom(function = "validate_optional_phone"))]
    pub phone_number: Option<String>,
    pub description: Option<String>,
}
