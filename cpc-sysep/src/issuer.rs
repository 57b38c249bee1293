use crate::command::{CommandDescriptor, CommandHandle, FinalHandler, Phase};
use crate::core_iface::{Core, WriteFlags};
use crate::endpoint::{SystemEndpoint, SYSTEM_ENDPOINT_ID};
use crate::error::ErrorStatus;
use crate::timer::TimerService;
use crate::wire::{self, CommandId};
use cpc_support::logging;
use std::time::Duration;

/// Command Issuer (`spec.md` §4.1-§4.4): the four operations the embedding application calls to
/// start a request, plus `reset_endpoint`, which has no reply of its own.
impl<C: Core, T: TimerService> SystemEndpoint<C, T> {
    pub fn noop(
        &mut self,
        on_final: impl FnOnce(CommandHandle, ErrorStatus) + 'static,
        retries: u8,
        timeout: Duration,
    ) -> CommandHandle {
        self.issue(CommandId::Noop, &[], None, FinalHandler::Noop(Box::new(on_final)), retries, timeout)
    }

    pub fn reboot(
        &mut self,
        on_final: impl FnOnce(CommandHandle, ErrorStatus, u32) + 'static,
        retries: u8,
        timeout: Duration,
    ) -> CommandHandle {
        self.issue(CommandId::Reset, &[], None, FinalHandler::Reboot(Box::new(on_final)), retries, timeout)
    }

    pub fn property_get(
        &mut self,
        on_final: impl FnOnce(CommandHandle, u32, Vec<u8>, ErrorStatus) + 'static,
        property_id: u32,
        retries: u8,
        timeout: Duration,
    ) -> CommandHandle {
        let payload = wire::encode_property_payload(property_id, &[]);
        self.issue(
            CommandId::PropValueGet,
            &payload,
            Some(property_id),
            FinalHandler::Property(Box::new(on_final)),
            retries,
            timeout,
        )
    }

    /// `value` must be non-empty: a zero-length value is a programming error
    /// (`spec.md` §4.3, IllegalArgument) and is fatal.
    pub fn property_set(
        &mut self,
        on_final: impl FnOnce(CommandHandle, u32, Vec<u8>, ErrorStatus) + 'static,
        retries: u8,
        timeout: Duration,
        property_id: u32,
        value: &[u8],
    ) -> CommandHandle {
        assert!(!value.is_empty(), "property_set: IllegalArgument (value_len == 0)");

        let payload = wire::encode_property_payload(property_id, value);
        self.issue(
            CommandId::PropValueSet,
            &payload,
            Some(property_id),
            FinalHandler::Property(Box::new(on_final)),
            retries,
            timeout,
        )
    }

    /// Tears down and reopens the System Endpoint (`spec.md` §4.7). Fire-and-forget: there is no
    /// completion handler, since every command still in flight is cancelled as part of the reset
    /// rather than allowed to reply into a table that no longer exists.
    pub fn reset_endpoint(&mut self) {
        self.reset_system_endpoint();
    }

    fn issue(
        &mut self,
        command_id: CommandId,
        payload: &[u8],
        property_id: Option<u32>,
        on_final: FinalHandler,
        retries: u8,
        timeout: Duration,
    ) -> CommandHandle {
        let command_seq = self.allocate_seq();
        let command_buffer = wire::encode_frame(command_id, command_seq, payload);

        logging::debug!(self.log, "issuing command";
                        "command_id" => ?command_id, "command_seq" => command_seq, "retries" => retries);

        self.transmit(&command_buffer);

        let mut descriptor = CommandDescriptor {
            command_seq,
            command_id,
            command_buffer,
            property_id,
            on_final: Some(on_final),
            retry_count: retries,
            retry_timeout: timeout,
            error_status: ErrorStatus::Ok,
            timer_handle: None,
            phase: Phase::Issued,
        };

        self.arm_on_issue(&mut descriptor);
        self.table.insert_tail(descriptor);
        command_seq
    }

    /// Mode A arms the retransmission timer immediately on issue; Mode B (default) waits for
    /// `on_poll_acknowledged` (`spec.md` §4.4).
    #[cfg(feature = "legacy-unnumbered-poll")]
    fn arm_on_issue(&mut self, descriptor: &mut CommandDescriptor) {
        let handle = self.timer.register(descriptor.retry_timeout, descriptor.command_seq);
        descriptor.timer_handle = Some(handle);
        descriptor.phase = Phase::PollAcked;
    }

    #[cfg(not(feature = "legacy-unnumbered-poll"))]
    fn arm_on_issue(&mut self, _descriptor: &mut CommandDescriptor) {}

    #[cfg(feature = "legacy-unnumbered-poll")]
    fn transmit(&mut self, buffer: &[u8]) {
        self.core.write(SYSTEM_ENDPOINT_ID, buffer, WriteFlags::UnnumberedPoll);
    }

    #[cfg(not(feature = "legacy-unnumbered-poll"))]
    fn transmit(&mut self, buffer: &[u8]) {
        self.core.write(SYSTEM_ENDPOINT_ID, buffer, WriteFlags::InformationPoll);
    }
}
