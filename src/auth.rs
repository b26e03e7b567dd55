//! Credentials, token state, and identifier models.

pub mod credentials;
pub mod id;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use token::{secret::*, state::*};
