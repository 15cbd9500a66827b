//! Domain models for the authentication side of the client.

mod registration;
mod user;

pub use registration::Registration;
pub use user::StaffUser;
