//! Filter, pagination and extension-request core for a regulatory filings
//! dashboard.
//!
//! A [`ReturnsProvider`] supplies filings; [`DashboardState`] holds the
//! user's selections and the filtered, paginated view over them; an
//! [`ExtensionRequestFlow`] collects an extension request for one filing.
//! Rendering is left to the caller.

pub mod config;
pub mod data;
pub mod error;
pub mod extension;
pub mod state;

pub use config::{DashboardConfig, DataSource};
pub use data::filter::{FilterSpec, FundTypeFilter, Tab, PAGE_SIZE};
pub use data::model::{Filing, FundStructure, FundType, ReturnStatus};
pub use data::provider::{FileProvider, InMemoryProvider, ReturnsProvider, SeedProvider};
pub use error::{Error, Result};
pub use extension::{ExtensionRequestFlow, ExtensionType, PaymentHandoff};
pub use state::DashboardState;
