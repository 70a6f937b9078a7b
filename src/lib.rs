//! Lumina: an interior-redesign client.
//!
//! The library holds everything that does not touch the window toolkit:
//! the comparison viewport and mask surface state machines, the state
//! container, configuration, the product catalog and the backend client.

pub mod catalog;
pub mod client;
pub mod compare;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod model;
pub mod state;
pub mod tasks;
