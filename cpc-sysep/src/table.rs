use crate::command::{CommandDescriptor, CommandHandle};
use cpc_support::logging;

/// Ordered collection of in-flight command descriptors (`spec.md` §4.2). Lookup is O(n) by
/// `command_seq`; uniqueness of in-flight sequence numbers (P1) is upheld by the issuer's
/// allocator, not by this table, which only enforces insertion order.
pub struct CommandTable {
    commands: Vec<CommandDescriptor>,
    log: logging::Logger,
}

impl CommandTable {
    pub fn new(log: &logging::Logger) -> CommandTable {
        CommandTable {
            commands: Vec::new(),
            log: log.new(logging::o!()),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn insert_tail(&mut self, descriptor: CommandDescriptor) {
        logging::debug!(self.log, "inserting command descriptor"; "command_seq" => descriptor.command_seq);
        self.commands.push(descriptor);
    }

    pub fn contains(&self, seq: CommandHandle) -> bool {
        self.commands.iter().any(|d| d.command_seq == seq)
    }

    pub fn find_by_seq(&self, seq: CommandHandle) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|d| d.command_seq == seq)
    }

    pub fn find_by_seq_mut(&mut self, seq: CommandHandle) -> Option<&mut CommandDescriptor> {
        self.commands.iter_mut().find(|d| d.command_seq == seq)
    }

    pub fn remove(&mut self, seq: CommandHandle) -> Option<CommandDescriptor> {
        let index = self.commands.iter().position(|d| d.command_seq == seq)?;
        let descriptor = self.commands.remove(index);
        logging::debug!(self.log, "removed command descriptor"; "command_seq" => seq);
        Some(descriptor)
    }

    /// Drains every live descriptor in insertion order, used by the Reset Controller.
    pub fn drain(&mut self) -> Vec<CommandDescriptor> {
        self.commands.drain(..).collect()
    }
}
