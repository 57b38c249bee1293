//! Request-reply state machine for the CPC System Endpoint: command issuance, sequence
//! numbering, retransmission timers, reply dispatch by command kind, unsolicited notification
//! fan-out, and endpoint-reset cleanup. The lower link-layer framing ("Core") and the timer
//! primitive are consumed only through the `Core`/`TimerService` traits and are out of scope.

pub mod command;
pub mod core_iface;
pub mod endpoint;
pub mod error;
pub mod property;
pub mod table;
pub mod timer;
pub mod wire;

mod dispatch;
mod issuer;
mod reset;
mod retry;
mod unsolicited;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use command::{CommandHandle, Phase};
pub use core_iface::{Core, EndpointFlags, EndpointOption, EndpointState, ErrorReason, WriteFlags};
pub use endpoint::{PropLastStatusListener, SystemEndpoint, SYSTEM_ENDPOINT_ID};
pub use error::ErrorStatus;
pub use timer::TimerService;

#[cfg(test)]
mod tests {
    use crate::error::ErrorStatus;
    use crate::mock::{MockCore, MockTimerService};
    use crate::wire::{self, CommandId};
    use crate::{EndpointState, SystemEndpoint, SYSTEM_ENDPOINT_ID};
    use cpc_support::logging;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn new_endpoint() -> SystemEndpoint<MockCore, MockTimerService> {
        let log = logging::root();
        SystemEndpoint::new(MockCore::new(), MockTimerService::new(), &log)
    }

    /// Scenario 1 (`spec.md` §8): NOOP issued, final reply arrives, handler sees `Ok`.
    #[test]
    fn test_scenario_noop_success() {
        let mut sysep = new_endpoint();

        let result = Rc::new(RefCell::new(None));
        let result_clone = result.clone();
        sysep.noop(
            move |_handle, status| *result_clone.borrow_mut() = Some(status),
            1,
            Duration::from_millis(100),
        );

        assert_eq!(sysep.in_flight(), 1);
        assert_eq!(sysep.core.last_written().unwrap().buffer, wire::encode_frame(CommandId::Noop, 0, &[]));

        let reply = wire::encode_frame(CommandId::Noop, 0, &[]);
        sysep.on_final(SYSTEM_ENDPOINT_ID, &reply);

        assert_eq!(*result.borrow(), Some(ErrorStatus::Ok));
        assert_eq!(sysep.in_flight(), 0);
    }

    /// Scenario 2 (`spec.md` §8): a command with one retry that never gets a reply ends in
    /// `Timeout` once the retry budget is exhausted.
    #[test]
    fn test_scenario_noop_timeout_with_retry() {
        let mut sysep = new_endpoint();

        let result = Rc::new(RefCell::new(None));
        let result_clone = result.clone();
        sysep.noop(
            move |_handle, status| *result_clone.borrow_mut() = Some(status),
            1,
            Duration::from_millis(50),
        );

        sysep.on_poll_acknowledged(0);
        assert_eq!(sysep.timer.live_handles(), 1);

        // First expiry: one retry left -> retransmit, no handler call yet.
        sysep.on_timer_expired(0);
        assert_eq!(sysep.in_flight(), 1);
        assert!(result.borrow().is_none());
        assert_eq!(sysep.core.written.len(), 2);

        sysep.on_poll_acknowledged(0);

        // Second expiry: retries exhausted -> Timeout.
        sysep.on_timer_expired(0);
        assert_eq!(*result.borrow(), Some(ErrorStatus::Timeout));
        assert_eq!(sysep.in_flight(), 0);
    }

    /// Scenario 3 (`spec.md` §8): a property-set round trip, including the host-endian wire
    /// swap for a 4-byte value.
    #[test]
    fn test_scenario_property_set_round_trip() {
        let mut sysep = new_endpoint();

        let result = Rc::new(RefCell::new(None));
        let result_clone = result.clone();
        sysep.property_set(
            move |_handle, property_id, value, status| {
                *result_clone.borrow_mut() = Some((property_id, value, status));
            },
            0,
            Duration::from_millis(100),
            0x0A,
            &0x1234_5678u32.to_le_bytes(),
        );

        assert_eq!(
            sysep.core.last_written().unwrap().buffer,
            vec![
                CommandId::PropValueSet.into(),
                0,
                8,
                0x0A,
                0x00,
                0x00,
                0x00,
                0x78,
                0x56,
                0x34,
                0x12,
            ]
        );

        let reply_payload = wire::encode_property_payload(0x0A, &0x1234_5678u32.to_le_bytes());
        let reply = wire::encode_frame(CommandId::PropValueIs, 0, &reply_payload);
        sysep.on_final(SYSTEM_ENDPOINT_ID, &reply);

        let (property_id, value, status) = result.borrow_mut().take().unwrap();
        assert_eq!(property_id, 0x0A);
        assert_eq!(value, 0x1234_5678u32.to_le_bytes().to_vec());
        assert_eq!(status, ErrorStatus::Ok);
    }

    /// Scenario 4 (`spec.md` §8): a reboot reply carries a 4-byte reset status payload.
    #[test]
    fn test_scenario_reboot_reply() {
        let mut sysep = new_endpoint();

        let result = Rc::new(RefCell::new(None));
        let result_clone = result.clone();
        sysep.reboot(
            move |_handle, status, reset_status| *result_clone.borrow_mut() = Some((status, reset_status)),
            0,
            Duration::from_millis(100),
        );

        let reply = wire::encode_frame(CommandId::Reset, 0, &7u32.to_le_bytes());
        sysep.on_final(SYSTEM_ENDPOINT_ID, &reply);

        assert_eq!(*result.borrow(), Some((ErrorStatus::Ok, 7)));
    }

    /// Scenario 5 (`spec.md` §8): an unsolicited `PROP_LAST_STATUS` frame fans out to every
    /// registered listener, in registration order.
    #[test]
    fn test_scenario_unsolicited_last_status_fanout() {
        let mut sysep = new_endpoint();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_a = seen.clone();
        let seen_b = seen.clone();

        sysep.register_unsolicited_prop_last_status_callback(Box::new(move |bytes| seen_a.borrow_mut().push(("a", bytes))));
        sysep.register_unsolicited_prop_last_status_callback(Box::new(move |bytes| seen_b.borrow_mut().push(("b", bytes))));

        let payload = wire::encode_property_payload(crate::property::PROP_LAST_STATUS, &4u32.to_le_bytes());
        let frame = wire::encode_frame(CommandId::PropValueIs, 0, &payload);
        sysep.on_unsolicited(SYSTEM_ENDPOINT_ID, &frame);

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0].0, "a");
        assert_eq!(seen.borrow()[1].0, "b");
    }

    /// Scenario 5, endpoint-state arm: an unreachable report on an open, listened-to endpoint
    /// triggers close reconciliation via `property_set`.
    #[test]
    fn test_scenario_unsolicited_endpoint_state_triggers_close() {
        let mut sysep = new_endpoint();

        let endpoint_id = 3u8;
        let property_id = crate::property::PROP_ENDPOINT_STATE_0 + endpoint_id as u32;

        sysep.core.set_endpoint_state(endpoint_id, EndpointState::Open);
        sysep.core.set_has_listeners(endpoint_id, true);

        let payload = wire::encode_property_payload(property_id, &0u32.to_le_bytes());
        let frame = wire::encode_frame(CommandId::PropValueIs, 0, &payload);
        sysep.on_unsolicited(SYSTEM_ENDPOINT_ID, &frame);

        assert_eq!(sysep.core.errors_set.len(), 1);
        assert_eq!(sysep.in_flight(), 1);

        let written = sysep.core.last_written().unwrap();
        let decoded = wire::decode_frame(&written.buffer).unwrap();
        assert_eq!(decoded.command_id, CommandId::PropValueSet);
    }

    /// Scenario 6 (`spec.md` §8): resetting the endpoint cancels every in-flight command and
    /// reopens it with a fresh sequence counter.
    #[test]
    fn test_scenario_reset_cancels_in_flight_commands() {
        let mut sysep = new_endpoint();

        let result = Rc::new(RefCell::new(None));
        let result_clone = result.clone();
        sysep.noop(
            move |_handle, status| *result_clone.borrow_mut() = Some(status),
            3,
            Duration::from_millis(100),
        );

        assert_eq!(sysep.in_flight(), 1);

        sysep.reset_endpoint();

        assert_eq!(*result.borrow(), Some(ErrorStatus::Cancelled));
        assert_eq!(sysep.in_flight(), 0);
        assert_eq!(sysep.core.closed.len(), 1);
        assert_eq!(sysep.core.opened.len(), 2);

        // P1: the sequence counter restarts, so the next command reuses seq 0.
        sysep.noop(|_, _| {}, 0, Duration::from_millis(100));
        assert_eq!(sysep.core.written.last().unwrap().buffer[1], 0);
    }

    /// P1: sequence numbers allocated to distinct, simultaneously in-flight commands never
    /// collide, up to the full 256-entry table.
    #[test]
    fn test_command_table_allows_256_simultaneous_in_flight_commands() {
        let mut sysep = new_endpoint();

        for _ in 0..256 {
            sysep.noop(|_, _| {}, 0, Duration::from_millis(1000));
        }

        assert_eq!(sysep.in_flight(), 256);
    }

    /// A 257th simultaneously in-flight command has no free sequence number left to allocate;
    /// that's a programming error in the embedding application, not a recoverable condition.
    #[test]
    #[should_panic(expected = "command table full")]
    fn test_allocate_seq_panics_when_table_is_full() {
        let mut sysep = new_endpoint();

        for _ in 0..256 {
            sysep.noop(|_, _| {}, 0, Duration::from_millis(1000));
        }

        sysep.noop(|_, _| {}, 0, Duration::from_millis(1000));
    }

    /// Mode A (`spec.md` §4.4, "Unnumbered Poll (legacy)"): the timer arms at issue time, with
    /// no poll-ack hook in the picture at all, unlike scenario 1's Mode B walk.
    #[cfg(feature = "legacy-unnumbered-poll")]
    #[test]
    fn test_legacy_mode_a_noop_success() {
        let mut sysep = new_endpoint();

        let result = Rc::new(RefCell::new(None));
        let result_clone = result.clone();
        sysep.noop(
            move |_handle, status| *result_clone.borrow_mut() = Some(status),
            1,
            Duration::from_millis(100),
        );

        // Mode A arms the timer immediately; there is no `on_poll_acknowledged` to wait for.
        assert_eq!(sysep.timer.live_handles(), 1);
        assert_eq!(
            sysep.core.last_written().unwrap().flags,
            crate::core_iface::WriteFlags::UnnumberedPoll
        );

        let reply = wire::encode_frame(CommandId::Noop, 0, &[]);
        sysep.on_final(SYSTEM_ENDPOINT_ID, &reply);

        assert_eq!(*result.borrow(), Some(ErrorStatus::Ok));
        assert_eq!(sysep.in_flight(), 0);
        assert_eq!(sysep.timer.live_handles(), 0);
    }

    /// Mode A (`spec.md` §4.4): a command with one retry that never gets a reply retransmits on
    /// the first expiry (timer rearmed immediately, no poll-ack wait) and times out on the
    /// second, the same end state as scenario 2's Mode B walk.
    #[cfg(feature = "legacy-unnumbered-poll")]
    #[test]
    fn test_legacy_mode_a_noop_timeout_with_retry() {
        let mut sysep = new_endpoint();

        let result = Rc::new(RefCell::new(None));
        let result_clone = result.clone();
        sysep.noop(
            move |_handle, status| *result_clone.borrow_mut() = Some(status),
            1,
            Duration::from_millis(50),
        );

        assert_eq!(sysep.timer.live_handles(), 1);

        // First expiry: one retry left -> retransmit, timer rearmed immediately (no poll-ack).
        sysep.on_timer_expired(0);
        assert_eq!(sysep.in_flight(), 1);
        assert!(result.borrow().is_none());
        assert_eq!(sysep.core.written.len(), 2);

        // Second expiry: retries exhausted -> Timeout.
        sysep.on_timer_expired(0);
        assert_eq!(*result.borrow(), Some(ErrorStatus::Timeout));
        assert_eq!(sysep.in_flight(), 0);
    }
}
