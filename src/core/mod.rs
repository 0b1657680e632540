//! # Core Panel Logic
//!
//! The submission flow and the data the panel shows.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • SubmissionController │
//!                    │  • Action / update()    │
//!                    │  • SendCapability       │
//!                    │                         │
//!                    │  No terminal. No UI.    │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │ inference  │
//!     │  Adapter   │                          │ (provider) │
//!     │ (ratatui)  │                          │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`submission`]: draft, pending flag, guard, begin/settle
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`chat`]: the send capability and the session behind it
//! - [`panel`]: tip and stage data for the sibling components
//! - [`state`]: the `App` struct
//! - [`config`]: layered configuration

pub mod action;
pub mod chat;
pub mod config;
pub mod panel;
pub mod state;
pub mod submission;
