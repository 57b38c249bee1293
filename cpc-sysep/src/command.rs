use crate::error::ErrorStatus;
use crate::timer::TimerHandle;
use crate::wire::CommandId;
use std::time::Duration;

pub type CommandHandle = u8;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// Written to the wire; for Mode B, still waiting on the poll ack before the timer arms.
    Issued,
    /// Retransmission timer is armed and counting down.
    PollAcked,
    /// Final reply consumed; descriptor is about to be dropped.
    Finalizing,
    Dead,
}

/// Tagged union over the per-kind completion handlers (`spec.md` §9, "Heterogeneous callback
/// union": the source stores these in a single void-typed slot; keeping them typed means only
/// the matching handler can ever be invoked for a descriptor's `command_id`, and a mismatch is a
/// bug in this crate rather than a cast gone wrong at runtime).
pub enum FinalHandler {
    Noop(Box<dyn FnOnce(CommandHandle, ErrorStatus)>),
    Reboot(Box<dyn FnOnce(CommandHandle, ErrorStatus, u32)>),
    Property(Box<dyn FnOnce(CommandHandle, u32, Vec<u8>, ErrorStatus)>),
}

/// An in-flight command, owned by the `CommandTable` for its entire lifetime.
pub struct CommandDescriptor {
    pub command_seq: CommandHandle,
    pub command_id: CommandId,
    pub command_buffer: Vec<u8>,
    pub property_id: Option<u32>,
    pub on_final: Option<FinalHandler>,
    pub retry_count: u8,
    pub retry_timeout: Duration,
    pub error_status: ErrorStatus,
    pub timer_handle: Option<TimerHandle>,
    pub phase: Phase,
}
