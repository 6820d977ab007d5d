//! Route handlers, grouped by trust surface.

pub mod admin;
pub mod auth;
pub mod export;
pub mod internal;
