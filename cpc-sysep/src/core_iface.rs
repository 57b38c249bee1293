//! The lower CPC framing layer (`spec.md` §1 calls this "Core"): link-layer framing, transport
//! drivers and the socket/library server sit on the other side of this trait and are out of this
//! crate's scope.

use bitflags::bitflags;

bitflags! {
    /// Flags passed to `Core::open_endpoint` (`spec.md` §6).
    pub struct EndpointFlags: u8 {
        const UFRAME_ENABLE = 0b0000_0001;
        const IFRAME_DISABLE = 0b0000_0010;
    }
}

/// Flags passed to `Core::write`, selecting the CPC frame class used to carry the command
/// (`spec.md` §4.4, §6). Exactly one applies per write, unlike `EndpointFlags`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WriteFlags {
    InformationPoll,
    UnnumberedPoll,
    UnnumberedResetCommand,
}

/// Options registered via `Core::set_endpoint_option` (`spec.md` §6). In this crate the "hooks"
/// these options wire up are just public methods on `SystemEndpoint` (`on_final`,
/// `on_poll_acknowledged`, `on_unsolicited`); `set_endpoint_option` only needs to record that the
/// embedding event loop should route the corresponding Core callback there.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EndpointOption {
    OnFinal,
    OnUframeReceive,
    OnPollAcknowledged,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EndpointState {
    Closed,
    Open,
    ErrorDestinationUnreachable,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorReason {
    DestinationUnreachable,
}

pub trait Core {
    fn open_endpoint(&mut self, id: u8, flags: EndpointFlags, tx_window: u8);
    fn set_endpoint_option(&mut self, id: u8, option: EndpointOption);
    fn write(&mut self, id: u8, buffer: &[u8], flags: WriteFlags);
    fn close_endpoint(&mut self, id: u8, notify_secondary: bool, force: bool);
    fn process_transmit_queue(&mut self);
    fn get_endpoint_state(&self, id: u8) -> EndpointState;
    fn set_endpoint_in_error(&mut self, id: u8, reason: ErrorReason);
    /// Whether endpoint `id` currently has application listeners registered through the
    /// (out-of-scope) socket/library server. Needed by the Unsolicited Dispatcher's
    /// endpoint-state reconciliation (`spec.md` §4.6) but not enumerated among the operations
    /// listed in §6 — added here as the minimal extension that makes §4.6 implementable.
    fn endpoint_has_listeners(&self, id: u8) -> bool;
}
