//! # Core Application Logic
//!
//! This module contains Echo's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌────────────┐
//!             │    TUI     │          │  dispatch  │
//!             │  Adapter   │          │ (backend   │
//!             │ (ratatui)  │          │  effects)  │
//!             └────────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`chat`]: Send/reply cycle of the chat view
//! - [`transcript`]: Ordered message list and stored-session replay
//! - [`history`]: Session list and confirmed deletion
//! - [`profile`]: Keyed profile cache and editor state
//! - [`auth`]: Identity and bearer token supplied from outside
//! - [`config`]: Layered settings resolution

pub mod action;
pub mod auth;
pub mod chat;
pub mod config;
pub mod history;
pub mod profile;
pub mod state;
pub mod transcript;
