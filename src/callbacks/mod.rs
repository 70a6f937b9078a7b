//! Callback handlers for the redesign client.
//!
//! This module contains all UI callback implementations organized by functionality:
//! - `compare` - Before/after divider and marker clicks
//! - `mask` - Mask painting overlay
//! - `generation` - Source photo, prompt, style and generate
//! - `gallery` - Gallery browsing
//! - `shop` - Admin session and product management

pub mod compare;
pub mod gallery;
pub mod generation;
pub mod mask;
pub mod shop;
