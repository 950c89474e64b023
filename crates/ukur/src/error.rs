// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Recoverable error kinds. None of these are fatal to the process; they
/// key the per-kind counters and show up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream GET/POST failed: non-2xx, connection error, timeout.
    UpstreamUnavailable,
    /// A body that should have been SIRI XML didn't parse.
    MalformedPayload,
    /// Callback with a wrong requestor id or an unusable kind.
    RejectedCallback,
    /// Configuration that disables every workflow a mode needs.
    ConfigMisuse,
    /// A held leadership lease was lost mid-flight.
    TransientLeadership,
    /// The downstream notifier failed to deliver.
    NotifyFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
            Self::RejectedCallback => "REJECTED_CALLBACK",
            Self::ConfigMisuse => "CONFIG_MISUSE",
            Self::TransientLeadership => "TRANSIENT_LEADERSHIP",
            Self::NotifyFailure => "NOTIFY_FAILURE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
