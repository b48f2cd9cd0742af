//! Command history collection

use conduit_core::domain::command::{CommandRecord, CommandStatus};
use tracing::debug;

use super::{Store, lock, next_id};

impl Store {
    /// Records a submitted command and the response it produced
    pub fn add_command_history(
        &self,
        command: impl Into<String>,
        response: impl Into<String>,
        status: CommandStatus,
    ) -> CommandRecord {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();

        let mut commands = lock(&self.commands);
        let record = CommandRecord {
            id: next_id(commands.iter().map(|c| c.id)),
            command: command.into(),
            timestamp,
            response: response.into(),
            status,
        };
        commands.insert(0, record.clone());

        debug!("Command recorded: {} ({:?})", record.command, record.status);

        record
    }

    /// Snapshot of the command history, newest first
    pub fn list_command_history(&self) -> Vec<CommandRecord> {
        lock(&self.commands).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_newest_first() {
        let store = Store::new();
        store.add_command_history("show status", "ok", CommandStatus::Success);
        let latest = store.add_command_history("gibberish", "help", CommandStatus::Error);

        assert_eq!(latest.id, 2);
        assert_eq!(latest.timestamp.len(), "HH:MM:SS".len());

        let history = store.list_command_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], latest);
        assert_eq!(history[1].command, "show status");
    }
}
