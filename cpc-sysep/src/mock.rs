//! In-memory `Core`/`TimerService` implementations for exercising `SystemEndpoint` without a
//! real transport, playing the role `MockChannel` plays for `io::Read`/`io::Write` in
//! `neutronium::net::buffer`'s test module.

use crate::core_iface::{Core, EndpointFlags, EndpointOption, EndpointState, ErrorReason, WriteFlags};
use crate::timer::{TimerHandle, TimerService};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WrittenFrame {
    pub endpoint_id: u8,
    pub buffer: Vec<u8>,
    pub flags: WriteFlags,
}

/// Records every call made on it so tests can assert on the exact sequence of effects a
/// `SystemEndpoint` produced.
#[derive(Default)]
pub struct MockCore {
    pub written: Vec<WrittenFrame>,
    pub opened: Vec<(u8, EndpointFlags, u8)>,
    pub closed: Vec<(u8, bool, bool)>,
    pub options: Vec<(u8, EndpointOption)>,
    pub transmit_queue_flushes: u32,
    pub errors_set: Vec<(u8, ErrorReason)>,
    pub endpoint_states: HashMap<u8, EndpointState>,
    pub listener_endpoints: HashSet<u8>,
}

impl MockCore {
    pub fn new() -> MockCore {
        MockCore::default()
    }

    pub fn set_endpoint_state(&mut self, id: u8, state: EndpointState) {
        self.endpoint_states.insert(id, state);
    }

    pub fn set_has_listeners(&mut self, id: u8, has_listeners: bool) {
        if has_listeners {
            self.listener_endpoints.insert(id);
        } else {
            self.listener_endpoints.remove(&id);
        }
    }

    pub fn last_written(&self) -> Option<&WrittenFrame> {
        self.written.last()
    }
}

impl Core for MockCore {
    fn open_endpoint(&mut self, id: u8, flags: EndpointFlags, tx_window: u8) {
        self.opened.push((id, flags, tx_window));
    }

    fn set_endpoint_option(&mut self, id: u8, option: EndpointOption) {
        self.options.push((id, option));
    }

    fn write(&mut self, id: u8, buffer: &[u8], flags: WriteFlags) {
        self.written.push(WrittenFrame {
            endpoint_id: id,
            buffer: buffer.to_vec(),
            flags,
        });
    }

    fn close_endpoint(&mut self, id: u8, notify_secondary: bool, force: bool) {
        self.closed.push((id, notify_secondary, force));
    }

    fn process_transmit_queue(&mut self) {
        self.transmit_queue_flushes += 1;
    }

    fn get_endpoint_state(&self, id: u8) -> EndpointState {
        *self.endpoint_states.get(&id).unwrap_or(&EndpointState::Closed)
    }

    fn set_endpoint_in_error(&mut self, id: u8, reason: ErrorReason) {
        self.errors_set.push((id, reason));
    }

    fn endpoint_has_listeners(&self, id: u8) -> bool {
        self.listener_endpoints.contains(&id)
    }
}

/// A fake timer service: `register` hands out incrementing handles and records the
/// `(interval, owner)` pair; tests fire expirations explicitly by calling
/// `SystemEndpoint::on_timer_expired` with the recorded owner.
#[derive(Default)]
pub struct MockTimerService {
    pub registered: Vec<(TimerHandle, Duration, u8)>,
    pub unregistered: Vec<TimerHandle>,
    next_handle: TimerHandle,
}

impl MockTimerService {
    pub fn new() -> MockTimerService {
        MockTimerService::default()
    }

    pub fn live_handles(&self) -> usize {
        self.registered.len() - self.unregistered.len()
    }
}

impl TimerService for MockTimerService {
    fn register(&mut self, interval: Duration, owner: u8) -> TimerHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.registered.push((handle, interval, owner));
        handle
    }

    fn unregister(&mut self, handle: TimerHandle) {
        self.unregistered.push(handle);
    }
}
