//! `cloud` crate — typed client for the cloud admin service.
//!
//! Three GET wrappers return the current plan, the instance usage, and a
//! one-time login code. Nothing is validated, retried, or translated: a
//! transport or status failure comes back as the underlying `reqwest` error.

pub mod client;
pub mod error;
pub mod models;

pub use client::{CloudClientConfig, CloudPlansClient, RestApiContext};
pub use error::CloudError;
pub use models::{CloudPlanData, InstanceUsage, LoginCode};
