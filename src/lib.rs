//! e-Residency - Terminal Registration Demo Library
//!
//! A mocked e-Residency registration flow: sign-in, an identity application,
//! a dashboard with a digital ID card, and optional business registration,
//! with session state kept in a local key-value store.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
