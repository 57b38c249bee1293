use crate::command::CommandHandle;
use crate::core_iface::{Core, EndpointFlags, EndpointOption};
use crate::table::CommandTable;
use crate::timer::TimerService;
use cpc_support::logging;

pub const SYSTEM_ENDPOINT_ID: u8 = 0;

pub type PropLastStatusListener = Box<dyn FnMut([u8; 4])>;

/// Owns every piece of module-level state the reference daemon kept as statics (`spec.md` §9):
/// the sequence counter, the command table, and the `PROP_LAST_STATUS` listener list. Generic
/// over `Core`/`TimerService` so tests can drive it against in-memory mocks (see `mock`).
pub struct SystemEndpoint<C: Core, T: TimerService> {
    pub(crate) core: C,
    pub(crate) timer: T,
    pub(crate) table: CommandTable,
    pub(crate) next_command_seq: u8,
    pub(crate) prop_last_status_listeners: Vec<PropLastStatusListener>,
    pub(crate) log: logging::Logger,
}

impl<C: Core, T: TimerService> SystemEndpoint<C, T> {
    pub fn new(mut core: C, timer: T, log: &logging::Logger) -> SystemEndpoint<C, T> {
        let log = log.new(logging::o!());

        core.open_endpoint(SYSTEM_ENDPOINT_ID, EndpointFlags::UFRAME_ENABLE, 1);
        core.set_endpoint_option(SYSTEM_ENDPOINT_ID, EndpointOption::OnFinal);
        core.set_endpoint_option(SYSTEM_ENDPOINT_ID, EndpointOption::OnUframeReceive);
        #[cfg(not(feature = "legacy-unnumbered-poll"))]
        core.set_endpoint_option(SYSTEM_ENDPOINT_ID, EndpointOption::OnPollAcknowledged);

        SystemEndpoint {
            table: CommandTable::new(&log),
            core,
            timer,
            next_command_seq: 0,
            prop_last_status_listeners: Vec::new(),
            log,
        }
    }

    /// Number of commands currently tracked. Exposed for tests asserting P1/P3/P4.
    pub fn in_flight(&self) -> usize {
        self.table.len()
    }

    /// Read access to the underlying `Core`, for callers (demos, integration tests) that need
    /// to inspect what was written to the wire without threading their own wrapper type through.
    pub fn core(&self) -> &C {
        &self.core
    }

    /// Read access to the underlying `TimerService`, for the same reason as `core()`.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Finds the next sequence number not already in flight (P1), wrapping past 255 back to 0.
    /// Fatal if all 256 sequence numbers are simultaneously live — a caller holding that many
    /// outstanding commands against a single endpoint is a programming error, not a transient
    /// condition.
    pub(crate) fn allocate_seq(&mut self) -> CommandHandle {
        for _ in 0..=u8::max_value() {
            let candidate = self.next_command_seq;
            self.next_command_seq = self.next_command_seq.wrapping_add(1);

            if !self.table.contains(candidate) {
                return candidate;
            }
        }

        panic!("command table full: all 256 sequence numbers are in flight");
    }
}
