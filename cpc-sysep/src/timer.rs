use std::time::Duration;

pub type TimerHandle = u64;

/// External collaborator (`spec.md` §6): a monotonic one-shot timer primitive. The owner key
/// passed to `register` is the `command_seq` the timer guards; on expiry the Timer Service hands
/// that key back so the Command Table can look the descriptor up directly, rather than recovering
/// it through intrusive-list pointer arithmetic (`spec.md` §9, "Intrusive linked list").
pub trait TimerService {
    fn register(&mut self, interval: Duration, owner: u8) -> TimerHandle;
    fn unregister(&mut self, handle: TimerHandle);
}
