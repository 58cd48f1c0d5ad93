//! Terminal client for the Linux trainer: line editing, history, paste and
//! the request/response session with the trainer backend.

pub mod backend;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;
