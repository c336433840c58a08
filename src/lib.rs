//! Quest Navigator: diagnostic quest wizard, scoring and results service.

pub mod config;
pub mod content;
pub mod error;
pub mod quest;
pub mod routes;
pub mod session;
pub mod shell;
