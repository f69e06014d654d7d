//! Domain models.
//!
//! These are validated application types. Document shapes live next to the
//! repositories in [`crate::db`] and convert into these.

pub mod customer;
pub mod password_help;
pub mod session;
pub mod user_profile;

pub use customer::{Customer, CustomerChanges, CustomerValidationError, NewCustomer};
pub use password_help::PasswordHelpRequest;
pub use session::CurrentUser;
pub use user_profile::{NewUserProfile, UserProfile};
