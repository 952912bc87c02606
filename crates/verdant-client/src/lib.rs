//! # verdant-client
//!
//! The HTTP gateway between the VERDANT dashboard and its policy backend.
//!
//! [`HttpGateway`] implements [`TelemetrySource`], [`PolicyAssistant`],
//! [`GraphSource`], and [`DocumentAnalyzer`] from verdant-core. Every endpoint is checked for an
//! `{"error": ...}` payload, so backend failures surface as
//! `DashboardError::Api` rather than as empty data.
//!
//! [`TelemetrySource`]: verdant_core::traits::TelemetrySource
//! [`PolicyAssistant`]: verdant_core::traits::PolicyAssistant
//! [`GraphSource`]: verdant_core::traits::GraphSource
//! [`DocumentAnalyzer`]: verdant_core::traits::DocumentAnalyzer
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use verdant_client::HttpGateway;
//! use verdant_core::config::DashboardConfig;
//!
//! let gateway = HttpGateway::from_config(&DashboardConfig::default())?;
//! let telemetry = gateway.fetch_telemetry("Japan").await?;
//! ```

pub mod gateway;

pub use gateway::{decode_payload, HttpGateway};

// ── Tests ─────────────────────────────────────────────────────────────────────
