use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::validators::validate_zipcode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

impl Address {
    pub fn new(input: CreateAddress) -> Self {
        Self {
            id: Uuid::now_v7(),
            street: input.street,
            city: input.city,
            state: input.state,
            zipcode: input.zipcode,
        }
    }

    pub fn apply_update(&mut self, update: UpdateAddress) {
        if let Some(street) = update.street {
            self.street = street;
        }
        if let Some(city) = update.city {
            self.city = city;
        }
        if let Some(state) = update.state {
            self.state = state;
        }
        if let Some(zipcode) = update.zipcode {
            self.zipcode = zipcode;
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.state, self.city, self.street)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAddress {
    #[validate(length(min = 1, max = 100))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 50))]
    pub state: String,
    #[serde(default)]
    #[validate(custom(function = "validate_zipcode"))]
    pub zipcode: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAddress {
    #[validate(length(min = 1, max = 100))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub state: Option<String>,
    #[validate(custom(function = "validate_zipcode"))]
    pub zipcode: Option<String>,
}

/// Join row between a customer and an address
///
/// Either side may be cleared when the referenced row is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerAddress {
    pub id: Uuid,
    pub main_address: bool,
    pub customer_id: Option<Uuid>,
    pub address_id: Option<Uuid>,
    /// Linked customer's email, loaded with the row
    pub customer_email: Option<String>,
}

impl CustomerAddress {
    pub fn new(customer_id: Uuid, address_id: Uuid, main_address: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            main_address,
            customer_id: Some(customer_id),
            address_id: Some(address_id),
            customer_email: None,
        }
    }
}

impl fmt::Display for CustomerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.customer_email {
            Some(email) => write!(f, "{}-address", email),
            None => f.write_str("unassigned-address"),
        }
    }
}
