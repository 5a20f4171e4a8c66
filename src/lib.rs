pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod policy;
pub mod sources;
pub mod web;
