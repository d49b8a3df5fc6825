//! # cin7_bridge
//!
//! Integration client for the Cin7 inventory/order platform. The vendor
//! exposes a partial, rate-limited REST API and leaves several operations
//! (stock-receipt intake, document voiding, date correction) reachable
//! only through its authenticated web console; this crate reconciles the
//! two channels behind one interface.
//!
//! ## Layers
//!
//! ### ① Infrastructure
//! - `browser/` — browser launch and the generic DOM primitives; the only
//!   code that talks to pages directly
//! - `http/` — the authenticated REST channel: key rotation, 429 backoff
//!
//! ### ② Session
//! - `session/` — owns the single browser instance and the login state
//!   machine (credentials + one-time code); workflows borrow its page
//!
//! ### ③ Workflows
//! - `ui/` — per-item console procedures (stock-receipt intake, void,
//!   date correction) with batch isolation and ordered results
//!
//! ### ④ Client surface
//! - `client` + `resources/` — the orchestrator and the per-object
//!   sub-clients that route each call to the right channel
//!
//! Collaborators that live outside the crate — the key rotation counter
//! and the webhook alerter — are passed in explicitly at construction.

pub mod alert;
pub mod browser;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod rotation;
pub mod session;
pub mod ui;
pub mod utils;

// common surface
pub use alert::WebhookAlerter;
pub use client::Cin7;
pub use config::{AppLinkIds, AuthConfig, Cin7Config, Cin7Options, KeyRotationOptions};
pub use error::{Cin7Error, Result};
pub use http::{ApiChannel, ApiRequest};
pub use resources::types::UpsertAck;
pub use rotation::{InMemoryKeyCounter, KeyRotationCounter};
pub use session::SessionManager;
pub use ui::date_fix::DateFix;
pub use ui::stock_receipt::{StockReceiptItem, StockReceiptLine};
pub use ui::BatchOutcome;
