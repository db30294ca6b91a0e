//! Accounts Domain
//!
//! Email-keyed users, role-specialized customers and restaurant owners, the
//! one-to-one profile created with every user, and customer addresses linked
//! through an explicit join row.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Managers   │  ← User / Customer / Owner / Address operations, flag rules
//! └──────┬──────┘
//!        │  hooks: blank profile on create, post-save listeners
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory + SeaORM)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Domain types, validators, SeaORM entities
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_accounts::{ExtraFields, InMemoryAccountRepository, TracingListener, UserManager};
//!
//! # async fn run() -> domain_accounts::AccountResult<()> {
//! let users = UserManager::new(InMemoryAccountRepository::new())
//!     .with_listener(Arc::new(TracingListener));
//!
//! let customer = users
//!     .customers()
//!     .create_customer("sara@example.com", "secret", ExtraFields::new())
//!     .await?;
//! let profile = users.profile(customer.id).await?;
//! assert_eq!(profile.get_fullname(), domain_accounts::NEW_USER_LABEL);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod hooks;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validators;

// Re-export commonly used types
pub use error::{AccountError, AccountResult};
pub use hooks::{PostSave, SaveListener, TracingListener, UserKind};
pub use models::{
    Address, CreateAddress, Customer, CustomerAddress, ExtraFields, NEW_USER_LABEL, Owner,
    Profile, Role, Scope, UpdateAddress, UpdateProfile, User, UserQuery,
};
pub use postgres::PgAccountRepository;
pub use repository::{AccountRepository, InMemoryAccountRepository};
pub use service::{AddressManager, CustomerManager, OwnerManager, UserManager};
pub use validators::{normalize_email, validate_iranian_cellphone_number, validate_zipcode};
