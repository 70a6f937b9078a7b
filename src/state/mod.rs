//! State management for the redesign client.
//!
//! This module contains:
//! - The application state container and its reducer
//! - Messages fed into the reducer and the commands it emits

mod app_state;
mod messages;

pub use app_state::*;
pub use messages::*;
