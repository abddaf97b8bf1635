// ABOUTME: Toast-level user notices broadcast to whatever front-end is listening
// ABOUTME: Used for session expiry and other non-blocking messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ContestHub Contributors

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::errors::{AppError, ErrorCode};

/// Default number of notices buffered per subscriber
pub const DEFAULT_NOTICE_BUFFER: usize = 32;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// Something needs the user's attention
    Warning,
    /// An action failed
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// User-facing text
    pub message: String,
    /// Error code behind the notice, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl Notice {
    /// Informational notice
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            code: None,
        }
    }

    /// Warning derived from an error
    #[must_use]
    pub fn warning_from(error: &AppError) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: error.message.clone(),
            code: Some(error.code),
        }
    }

    /// Error notice derived from an error
    #[must_use]
    pub fn error_from(error: &AppError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: error.message.clone(),
            code: Some(error.code),
        }
    }
}

/// Broadcast channel of notices
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    sender: broadcast::Sender<Notice>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_BUFFER)
    }
}

impl NoticeBoard {
    /// Board buffering `buffer_size` notices per subscriber
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self { sender }
    }

    /// Receive future notices
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Publish a notice; returns how many subscribers received it
    pub fn publish(&self, notice: Notice) -> usize {
        match self.sender.send(notice) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(notice)) => {
                debug!(message = %notice.message, "Notice dropped, no subscribers");
                0
            }
        }
    }

    /// Number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
