//! # quismon
//!
//! Blocking client for the Quismon monitoring API.
//!
//! The client covers the objects an infrastructure-as-code tool manages:
//! checks, notification channels, alert rules, organization OTLP export,
//! plus the unauthenticated quick-signup flow and the static region catalog.
//!
//! ## Example
//!
//! ```no_run
//! use quismon::{Client, DEFAULT_BASE_URL};
//!
//! let client = Client::new(DEFAULT_BASE_URL, std::env::var("QUISMON_API_KEY").unwrap_or_default())?;
//! for check in client.list_checks()? {
//!     println!("{} [{}] {}", check.name, check.check_type, check.health_status);
//! }
//! # Ok::<(), quismon::Error>(())
//! ```
//!
//! ## Envelope
//!
//! Every response is wrapped as `{"data": ..., "error": ..., "meta": ...}`.
//! HTTP statuses >= 400 become [`Error::Api`]; a 404 on a get-by-id endpoint
//! becomes [`Error::NotFound`] so callers can tell "gone" from "broken".

#![warn(clippy::all)]

pub mod alert_rules;
pub mod channels;
pub mod check_config;
pub mod checks;
pub mod client;
pub mod error;
pub mod otlp;
pub mod regions;
pub mod signup;
pub mod transport;
pub mod types;

pub use check_config::CheckConfig;
pub use client::{Client, DEFAULT_BASE_URL, Envelope, USER_AGENT, unwrap_envelope};
pub use error::{Error, ErrorCategory, Result};
pub use regions::{Region, validate_region};
pub use transport::{Method, MockTransport, Transport, UreqTransport};
pub use types::{
    AlertRule, ChannelType, Check, CheckType, CreateAlertRuleRequest, CreateCheckRequest,
    CreateNotificationChannelRequest, NotificationChannel, OtlpConfig, OtlpConfigRequest,
    QuickSignupRequest, QuickSignupResponse, UpdateAlertRuleRequest, UpdateCheckRequest,
    UpdateNotificationChannelRequest,
};
