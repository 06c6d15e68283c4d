//! Client core of a brokerage listings site and membership portal.
//!
//! Stores mirror the remote REST API, the access gate decides what a visitor
//! may see, and the view layer turns listing JSON into cards and details.

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod stores;
pub mod view;

pub use access::{resolve_screen, AccessState, Gate, ListingClick, Route, Screen};
pub use config::{PortalConfig, SessionPolicy};
pub use error::{AuthFailure, PortalError, Result};
pub use stores::Stores;
