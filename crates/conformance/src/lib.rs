//! Pulsecheck: RBAC conformance runner for the DataPulse API
//!
//! Drives a running backend through an ordered list of cases as three
//! identities (admin, two standard users) and anonymously, checking that
//! every endpoint grants or denies access according to the caller's role.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ConformanceRunner                                          │
//! │    └── for group in Group::ALL (dependency order)           │
//! │          └── cases::<group>::run(&mut Context)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Context                                                    │
//! │    ├── client:  ApiClient   -> ResponseEnvelope per call    │
//! │    ├── session: Session     tokens, discovered ids          │
//! │    ├── log:     ResultLog   passed | failed | skipped       │
//! │    └── config:  HarnessConfig                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A case never aborts the run. Failed calls and unmet expectations are
//! recorded as failures; cases whose prerequisites are missing record a skip.

pub mod cases;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod runner;
pub mod session;

pub use cases::Context;
pub use client::{ApiClient, Method, Request, ResponseEnvelope};
pub use config::HarnessConfig;
pub use error::{ConformanceError, ConformanceResult};
pub use report::{Outcome, ResultLog, Summary, TestResult};
pub use runner::{ConformanceRunner, Group, RunOutcome};
pub use session::{Identity, Session};
