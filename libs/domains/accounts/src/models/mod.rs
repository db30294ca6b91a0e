mod address;
mod profile;
mod roles;
mod user;

pub use address::{Address, CreateAddress, CustomerAddress, UpdateAddress};
pub use profile::{NEW_USER_LABEL, Profile, UpdateProfile};
pub use roles::{Customer, OWNER_DASHBOARD_URL, Owner, UserKind};
pub use user::{DASHBOARD_URL, ExtraFields, NewUser, Role, Scope, User, UserQuery};
