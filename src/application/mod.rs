//! Application layer managing session state and screen workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the session owns the user's records, the app state owns everything the
//! screens need on top of it.

pub mod session;
pub mod state;

pub use session::*;
pub use state::*;
