//! Web handlers module
//!
//! HTTP request handlers organized by domain: playlist output, the
//! config API, and health.

pub mod config_api;
pub mod health;
pub mod playlists;
