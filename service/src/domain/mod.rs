//! Domain definitions.

pub mod client;
pub mod employment;
pub mod user;

pub use self::{client::Client, employment::Employment, user::User};
