use crate::core_iface::{Core, EndpointFlags, EndpointOption, WriteFlags};
use crate::endpoint::{SystemEndpoint, SYSTEM_ENDPOINT_ID};
use crate::error::ErrorStatus;
use crate::retry;
use crate::timer::TimerService;
use cpc_support::logging;

/// Reset Controller (`spec.md` §4.7). Every in-flight command is completed with
/// `ErrorStatus::Cancelled` before being freed, rather than silently stranded (`spec.md` §9,
/// "Cancellation on reset" — see DESIGN.md, OQ-5).
impl<C: Core, T: TimerService> SystemEndpoint<C, T> {
    pub(crate) fn reset_system_endpoint(&mut self) {
        logging::info!(self.log, "resetting system endpoint"; "timestamp" => cpc_support::time::timestamp_secs());

        self.core.write(SYSTEM_ENDPOINT_ID, &[], WriteFlags::UnnumberedResetCommand);
        self.core.process_transmit_queue();

        let drained = self.table.drain();
        logging::debug!(self.log, "draining in-flight commands"; "count" => drained.len());

        for descriptor in drained {
            logging::debug!(self.log, "cancelling in-flight command"; "command_seq" => descriptor.command_seq);

            if let Some(handle) = descriptor.timer_handle {
                self.timer.unregister(handle);
            }

            retry::complete(descriptor, ErrorStatus::Cancelled);
        }

        self.core.close_endpoint(SYSTEM_ENDPOINT_ID, false, true);

        self.core.open_endpoint(SYSTEM_ENDPOINT_ID, EndpointFlags::UFRAME_ENABLE, 1);
        self.core.set_endpoint_option(SYSTEM_ENDPOINT_ID, EndpointOption::OnFinal);
        self.core.set_endpoint_option(SYSTEM_ENDPOINT_ID, EndpointOption::OnUframeReceive);
        #[cfg(not(feature = "legacy-unnumbered-poll"))]
        self.core.set_endpoint_option(SYSTEM_ENDPOINT_ID, EndpointOption::OnPollAcknowledged);

        self.next_command_seq = 0;
    }
}
