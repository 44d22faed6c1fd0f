//! Attendance station service: employers authenticate, QR scans mark
//! employees present once per day, and history is served back joined to
//! employee names.

pub mod api;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod routes;
pub mod scanner;
pub mod store;
