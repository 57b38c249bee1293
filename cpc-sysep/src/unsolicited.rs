use crate::core_iface::{Core, EndpointState, ErrorReason};
use crate::endpoint::{PropLastStatusListener, SystemEndpoint, SYSTEM_ENDPOINT_ID};
use crate::property;
use crate::timer::TimerService;
use crate::wire::{self, CommandId};
use cpc_support::logging;
use std::time::Duration;

/// Unsolicited Dispatcher (`spec.md` §4.6): routes an unprompted `PROP_VALUE_IS` frame by
/// property id, either to the registered `PROP_LAST_STATUS` listeners or into close
/// reconciliation for a `PROP_ENDPOINT_STATE_n` report.
impl<C: Core, T: TimerService> SystemEndpoint<C, T> {
    pub fn register_unsolicited_prop_last_status_callback(&mut self, listener: PropLastStatusListener) {
        self.prop_last_status_listeners.push(listener);
    }

    pub fn on_unsolicited(&mut self, endpoint_id: u8, buffer: &[u8]) {
        debug_assert_eq!(endpoint_id, SYSTEM_ENDPOINT_ID);

        let decoded = wire::decode_frame(buffer).expect("on_unsolicited: MalformedFrame");

        if decoded.command_id != CommandId::PropValueIs {
            panic!("IllegalCommand: unsolicited frame carried {:?}", decoded.command_id);
        }

        let (property_id, value) =
            wire::decode_property_payload(decoded.payload).expect("on_unsolicited: MalformedFrame");

        if property_id == property::PROP_LAST_STATUS {
            self.dispatch_last_status(&value);
        } else if let Some(endpoint_id) = property::endpoint_state_id(property_id) {
            self.dispatch_endpoint_state(endpoint_id, property_id);
        } else {
            panic!("IllegalCommand: unknown unsolicited property_id {:#x}", property_id);
        }
    }

    /// `PROP_LAST_STATUS` arm (`spec.md` §4.6): status bytes handed to listeners unswapped, the
    /// documented legacy behavior (see `property::status_as_native` vs `property::status_as_le`).
    fn dispatch_last_status(&mut self, value: &[u8]) {
        if value.len() < 4 {
            panic!("MalformedFrame: PROP_LAST_STATUS value shorter than 4 bytes");
        }

        let mut status = [0u8; 4];
        status.copy_from_slice(&value[..4]);

        for listener in self.prop_last_status_listeners.iter_mut() {
            listener(status);
        }
    }

    /// `PROP_ENDPOINT_STATE_n` arm (`spec.md` §4.6): close reconciliation for an endpoint the
    /// secondary reports as unreachable, but only when the host still thinks it's open and has
    /// listeners registered against it.
    fn dispatch_endpoint_state(&mut self, endpoint_id: u8, property_id: u32) {
        if !self.core.endpoint_has_listeners(endpoint_id) {
            return;
        }

        if self.core.get_endpoint_state(endpoint_id) != EndpointState::Open {
            return;
        }

        logging::info!(self.log, "endpoint unreachable, closing"; "endpoint_id" => endpoint_id);

        self.core.set_endpoint_in_error(endpoint_id, ErrorReason::DestinationUnreachable);

        let log = self.log.new(logging::o!());
        self.property_set(
            move |_handle, property_id, _value, status| {
                if status != crate::error::ErrorStatus::Ok {
                    logging::warn!(log, "endpoint-state close reconciliation failed";
                                   "property_id" => property_id, "status" => ?status);
                }
            },
            5,
            Duration::from_millis(100),
            property_id,
            &property::ENDPOINT_STATE_CLOSED.to_le_bytes(),
        );
    }
}
