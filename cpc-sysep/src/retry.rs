use crate::command::{CommandDescriptor, FinalHandler};
use crate::core_iface::{Core, WriteFlags};
use crate::endpoint::{SystemEndpoint, SYSTEM_ENDPOINT_ID};
use crate::error::ErrorStatus;
use crate::timer::TimerService;
use cpc_support::logging;

/// Timer/Retry state machine (`spec.md` §4.4, §5): on expiry, retransmit while retries remain,
/// otherwise report `Timeout` to the command's final handler.
impl<C: Core, T: TimerService> SystemEndpoint<C, T> {
    /// Entry point from the Timer Service. `owner` is the `command_seq` the expired timer was
    /// registered with (`spec.md` §9, "Intrusive linked list" — the lookup is the Command
    /// Table's job, not pointer arithmetic inside the timer callback).
    pub fn on_timer_expired(&mut self, owner: u8) {
        let mut descriptor = match self.table.remove(owner) {
            Some(descriptor) => descriptor,
            None => {
                logging::warn!(self.log, "timer fired for unknown command_seq, dropping"; "command_seq" => owner);
                return;
            }
        };

        if descriptor.retry_count == 0 {
            logging::debug!(self.log, "command timed out";
                            "command_seq" => owner, "timestamp" => cpc_support::time::timestamp_secs());
            complete(descriptor, ErrorStatus::Timeout);
            return;
        }

        descriptor.retry_count -= 1;
        descriptor.error_status = ErrorStatus::InProgress;

        logging::debug!(self.log, "retransmitting command";
                        "command_seq" => owner, "retries_remaining" => descriptor.retry_count);

        self.retransmit(&descriptor.command_buffer);
        self.rearm_on_retry(&mut descriptor);

        self.table.insert_tail(descriptor);
    }

    #[cfg(feature = "legacy-unnumbered-poll")]
    fn retransmit(&mut self, buffer: &[u8]) {
        self.core.write(SYSTEM_ENDPOINT_ID, buffer, WriteFlags::UnnumberedPoll);
    }

    #[cfg(not(feature = "legacy-unnumbered-poll"))]
    fn retransmit(&mut self, buffer: &[u8]) {
        self.core.write(SYSTEM_ENDPOINT_ID, buffer, WriteFlags::InformationPoll);
    }

    /// Mode A rearms immediately; Mode B waits for the next poll ack (`spec.md` §4.4).
    #[cfg(feature = "legacy-unnumbered-poll")]
    fn rearm_on_retry(&mut self, descriptor: &mut CommandDescriptor) {
        let handle = self.timer.register(descriptor.retry_timeout, descriptor.command_seq);
        descriptor.timer_handle = Some(handle);
    }

    #[cfg(not(feature = "legacy-unnumbered-poll"))]
    fn rearm_on_retry(&mut self, descriptor: &mut CommandDescriptor) {
        descriptor.timer_handle = None;
        descriptor.phase = crate::command::Phase::Issued;
    }
}

/// Invokes whichever final handler the descriptor carries with a terminal status and no reply
/// payload. Used for both timeout and reset cancellation.
pub(crate) fn complete(descriptor: CommandDescriptor, status: ErrorStatus) {
    match descriptor.on_final {
        Some(FinalHandler::Noop(handler)) => handler(descriptor.command_seq, status),
        Some(FinalHandler::Reboot(handler)) => handler(descriptor.command_seq, status, 0),
        Some(FinalHandler::Property(handler)) => {
            let property_id = descriptor.property_id.expect("property descriptor missing property_id");
            handler(descriptor.command_seq, property_id, Vec::new(), status)
        }
        None => {}
    }
}
