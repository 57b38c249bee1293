//! Error handling split into recoverable per-command outcomes and fatal protocol-integrity
//! violations, the same way `flux::shared::NetworkError` separates `Wait` from `Fatal`.

use std::fmt;

/// Outcome reported to a command's final handler. `Ok`/`InProgress`/`Timeout` are normative
/// per `spec.md` §3; `Cancelled` is this crate's own addition for commands still in flight
/// when the endpoint is reset (see DESIGN.md, OQ-5).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorStatus {
    Ok,
    InProgress,
    Timeout,
    Cancelled,
}

/// A malformed or unparsable inbound buffer. Confined to the wire codec: every call site that
/// receives one already knows, from context, whether the spec calls for a warning (dropped,
/// non-fatal) or a fatal abort, and acts accordingly.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WireError {
    MalformedFrame,
    IllegalCommand,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::MalformedFrame => write!(f, "malformed frame"),
            WireError::IllegalCommand => write!(f, "illegal command id"),
        }
    }
}

pub type WireResult<T> = Result<T, WireError>;
