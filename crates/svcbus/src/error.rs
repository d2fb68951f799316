// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for bus operations.

use std::fmt;

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Errors that can occur when interacting with the bus.
#[derive(Debug)]
pub enum BusError {
    /// The application was stopped (or never started) when the operation
    /// needed a running dispatch thread.
    NotRunning(String),

    /// A message could not be queued because the destination endpoint's
    /// queue is gone.
    QueueClosed(String),

    /// The message was malformed for the attempted operation, e.g. sending
    /// a response that never had a correlation id.
    InvalidMessage(String),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRunning(app) => write!(f, "application '{}' is not running", app),
            Self::QueueClosed(app) => write!(f, "event queue of '{}' is closed", app),
            Self::InvalidMessage(msg) => write!(f, "invalid message: {}", msg),
        }
    }
}

impl std::error::Error for BusError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_application() {
        let err = BusError::NotRunning("client".to_string());
        assert!(err.to_string().contains("client"));

        let err = BusError::InvalidMessage("zero correlation id".to_string());
        assert!(err.to_string().contains("zero correlation id"));
    }
}
