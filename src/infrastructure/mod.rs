//! Infrastructure layer: storage backends, credentials, tokens and telemetry

pub mod auth;
pub mod logging;
pub mod observability;
pub mod post;
pub mod storage;
pub mod user;
