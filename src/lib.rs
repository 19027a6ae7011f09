//! # OneView Exporter
//!
//! A Prometheus metrics exporter for HPE OneView.
//!
//! ## Overview
//!
//! Four independently scheduled collectors poll the appliance and refresh a
//! shared set of labeled gauges:
//!
//! - Resource counts per type (enclosures, server hardware, interconnects,
//!   SAS interconnects), every 60s
//! - Resource counts per health status, every 60s
//! - Enclosure temperature and power, every 300s
//! - Server temperature, power and CPU, every 300s
//!
//! The `/metrics` endpoint serves whatever the collectors last wrote; a
//! scrape never triggers a poll.
//!
//! ## Quick Start
//!
//! ```no_run
//! use oneview_exporter::{collectors, config::Settings, metrics::ExporterMetrics, server::start_server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load(Some("config/default.toml"))?;
//!     let metrics = ExporterMetrics::new()?;
//!
//!     let _handles = collectors::spawn_all(&settings, &metrics)?;
//!
//!     start_server(&settings.exporter.listen_address, metrics).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The exporter can be configured via:
//! - TOML configuration file
//! - Environment variables such as `ONEVIEW_EXPORTER__ONEVIEW__ENDPOINT`
//!   (prefix, section and key joined by `__`)
//! - `OV_USERNAME`, `OV_PASSWORD`, `OV_AUTHLOGINDOMAIN`, `OV_ENDPOINT`
//!
//! See [`config::Settings`] for details.
//!
//! ## Modules
//!
//! - [`client`] - OneView REST client
//! - [`collectors`] - Periodic collection tasks
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling
//! - [`inventory`] - Inventory types and the client trait collectors use
//! - [`metrics`] - Prometheus metric registry
//! - [`server`] - HTTP server for exposing metrics

pub mod client;
pub mod collectors;
pub mod config;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod server;

pub use error::{OneViewError, Result};
