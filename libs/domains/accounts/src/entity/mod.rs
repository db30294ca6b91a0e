//! SeaORM entities for the account tables

pub mod address;
pub mod customer_address;
pub mod profile;
pub mod user;
