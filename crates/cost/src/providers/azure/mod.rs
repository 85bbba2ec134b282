//! Azure Cost Management data source.
//!
//! Implements the [`CostProvider`](crate::providers::CostProvider) trait for
//! Microsoft Azure.
//!
//! ## Services
//!
//! - **Cost Management Query API** - actual pre-tax cost per resource
//! - **Resources Tags API** - tags per resource, used to find creators
//!
//! ## Authentication
//!
//! Uses a service principal (client credentials flow). The principal needs
//! the **Cost Management Reader** role on the subscription, and **Reader** to
//! see resource tags.

mod auth;
mod client;
mod models;

pub use auth::{AzureCredentials, MANAGEMENT_SCOPE};
pub use client::{AzureCostProvider, DEFAULT_LOGIN_URL, DEFAULT_MANAGEMENT_URL};
pub use models::*;
