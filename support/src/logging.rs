//! Structured logging, built on `slog`/`sloggers` the same way `flux::logging` wires it up for
//! the game server: components hold a child `Logger` seeded with `o!()`, and log at the level
//! appropriate to how operator-relevant the event is.

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

use sloggers::types::Severity;
use sloggers::Build;

/// Builds a terminal logger at debug level, for interactive/demo use.
pub fn init() -> Logger {
    use sloggers::terminal::{Destination, TerminalLoggerBuilder};

    let mut builder = TerminalLoggerBuilder::new();
    builder.level(Severity::Debug);
    builder.destination(Destination::Stderr);

    builder.build().expect("Error building terminal logger")
}

/// A logger that discards everything. Used as the default when no logger is supplied, and in
/// tests, mirroring `Channel::new`'s fallback to `Logger::root(Discard, o!())`.
pub fn root() -> Logger {
    Logger::root(Discard, o!())
}
