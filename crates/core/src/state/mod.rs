//! Session state management.
//!
//! This module provides:
//! - Session state machine functions
//! - SessionManager, the single writer that drains operations for one session

pub mod manager;
pub mod session;
