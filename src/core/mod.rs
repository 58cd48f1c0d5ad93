//! # Core Session Logic
//!
//! Line editing, history, the turn machine, and the op queue that turns
//! both into terminal output. It knows nothing about crossterm or HTTP.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │          CORE           │
//!                    │                         │
//!                    │  • App (state)          │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • RenderAdapter (ops)  │
//!                    │                         │
//!                    │  No I/O. No terminal.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                ┌───────────────┴───────────────┐
//!                ▼                               ▼
//!         ┌────────────┐                  ┌────────────┐
//!         │    TUI     │                  │  Backend   │
//!         │ (crossterm)│                  │ (reqwest)  │
//!         └────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`line_buffer`]: the editable command line and its cursor
//! - [`history`]: submitted commands and Up/Down recall
//! - [`clipboard`]: paste sanitizing and clipboard errors
//! - [`render`]: terminal primitives queued per edit
//! - [`state`]: the `App` struct, all session state in one place
//! - [`action`]: the `Action` enum and `update()`
//! - [`diagnostics`]: user-visible failure reports
//! - [`config`]: `~/.trainer/config.toml` and override resolution

pub mod action;
pub mod clipboard;
pub mod config;
pub mod diagnostics;
pub mod history;
pub mod line_buffer;
pub mod render;
pub mod state;
