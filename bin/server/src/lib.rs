//! log-gateway web server.
//!
//! This crate provides the HTTP surface of the gateway: OIDC login against an
//! external identity provider, server-side sessions, and the `/api/logs`
//! proxy to CloudWatch Logs.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod logs;
pub mod pages;

#[cfg(test)]
mod test_support;
