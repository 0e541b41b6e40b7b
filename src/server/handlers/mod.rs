// src/server/handlers/mod.rs
//! HTTP request handlers for the repository server

pub mod files;
pub mod status;
