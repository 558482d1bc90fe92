//! # tender-config: Startup Wiring
//!
//! Loads the payment policy table and installs logging, once, before the
//! first checkout. Nothing in here runs per checkout.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Host Startup                                    │
//! │                                                                         │
//! │  1. init_tracing()                 RUST_LOG or "info,tender=debug"      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  2. PolicyConfig::load(path)       defaults → file → TENDER_* → check   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  3. Arc::new(table)                shared read-only by every component  │
//! │         │                                                               │
//! │         ├──► AllocationEngine::new(policies.clone(), ...)               │
//! │         ├──► PaymentValidator::new(policies.clone())                    │
//! │         ├──► DistributionPlanner::new(policies.clone())                 │
//! │         └──► ReceiptBuilder::new(policies)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tender_config::{init_tracing, PolicyConfig};
//! use tender_core::validator::PaymentValidator;
//!
//! init_tracing();
//! let policies = Arc::new(PolicyConfig::load_or_default(None));
//! let validator = PaymentValidator::new(policies);
//! ```

pub mod error;
pub mod policy;
pub mod telemetry;

pub use error::{ConfigError, ConfigResult};
pub use policy::{MethodSection, PolicyConfig, POLICY_FILE_NAME};
pub use telemetry::{init_tracing, DEFAULT_FILTER};
