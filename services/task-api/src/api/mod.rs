//! HTTP API 层

pub mod middleware;
pub mod routes;
pub mod tasks;
pub mod users;
