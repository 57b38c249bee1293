use crate::command::FinalHandler;
use crate::core_iface::Core;
use crate::endpoint::SystemEndpoint;
use crate::error::ErrorStatus;
use crate::timer::TimerService;
use crate::wire::{self, CommandId};
use cpc_support::logging;
use std::convert::TryInto;

/// Reply Dispatcher (`spec.md` §4.5): routes a final reply to the completion handler stored for
/// its `command_seq`, chosen by the reply's `command_id` rather than the one the command was
/// issued with, since a mismatch there is exactly the integrity violation `spec.md` §4.5 calls
/// fatal.
impl<C: Core, T: TimerService> SystemEndpoint<C, T> {
    pub fn on_final(&mut self, endpoint_id: u8, buffer: &[u8]) {
        debug_assert_eq!(endpoint_id, crate::endpoint::SYSTEM_ENDPOINT_ID);

        let decoded = wire::decode_frame(buffer).expect("on_final: MalformedFrame");

        let descriptor = match self.table.remove(decoded.command_seq) {
            Some(descriptor) => descriptor,
            None => {
                logging::warn!(self.log, "reply for unknown command_seq, dropping";
                               "command_seq" => decoded.command_seq);
                return;
            }
        };

        if let Some(handle) = descriptor.timer_handle {
            self.timer.unregister(handle);
        }

        let status = descriptor.error_status;

        match decoded.command_id {
            CommandId::Noop => match descriptor.on_final {
                Some(FinalHandler::Noop(handler)) => handler(descriptor.command_seq, status),
                _ => panic!("NOOP reply matched a descriptor without a NOOP handler"),
            },
            CommandId::Reset => {
                assert_eq!(decoded.payload.len(), 4, "RESET reply: MalformedFrame");
                let reset_status: [u8; 4] = decoded.payload.try_into().unwrap();
                let reset_status = u32::from_le_bytes(reset_status);

                match descriptor.on_final {
                    Some(FinalHandler::Reboot(handler)) => handler(descriptor.command_seq, status, reset_status),
                    _ => panic!("RESET reply matched a descriptor without a reboot handler"),
                }
            }
            CommandId::PropValueIs => {
                let (property_id, mut value) =
                    wire::decode_property_payload(decoded.payload).expect("PROP_VALUE_IS reply: MalformedFrame");
                wire::swap_property_value(&mut value);

                match descriptor.on_final {
                    Some(FinalHandler::Property(handler)) => handler(descriptor.command_seq, property_id, value, status),
                    _ => panic!("PROP_VALUE_IS reply matched a descriptor without a property handler"),
                }
            }
            CommandId::PropValueGet | CommandId::PropValueSet => {
                panic!("IllegalCommand: {:?} must never appear as a reply", decoded.command_id)
            }
        }
    }
}

/// Mode B's poll-ack hook (`spec.md` §4.4): arms the retransmission timer that issuance
/// deliberately left unarmed. Compiled out under `legacy-unnumbered-poll`, where the timer arms
/// at issue time instead.
#[cfg(not(feature = "legacy-unnumbered-poll"))]
impl<C: Core, T: TimerService> SystemEndpoint<C, T> {
    pub fn on_poll_acknowledged(&mut self, command_seq: u8) {
        let descriptor = match self.table.find_by_seq_mut(command_seq) {
            Some(descriptor) => descriptor,
            None => {
                logging::warn!(self.log, "poll ack for unknown command_seq, dropping";
                               "command_seq" => command_seq);
                return;
            }
        };

        if descriptor.error_status == ErrorStatus::Timeout {
            return;
        }

        let handle = self.timer.register(descriptor.retry_timeout, command_seq);
        descriptor.timer_handle = Some(handle);
        descriptor.phase = crate::command::Phase::PollAcked;

        logging::trace!(self.log, "poll acknowledged, timer armed"; "command_seq" => command_seq);
    }
}
