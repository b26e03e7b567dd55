//! Access/refresh token models.

pub mod secret;
pub mod state;
