use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Leagues,
    Teams,
    Players,
    Managers,
    Matches,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Leagues => "leagues",
            Table::Teams => "teams",
            Table::Players => "players",
            Table::Managers => "managers",
            Table::Matches => "matches",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leagues" => Ok(Table::Leagues),
            "teams" => Ok(Table::Teams),
            "players" => Ok(Table::Players),
            "managers" => Ok(Table::Managers),
            "matches" => Ok(Table::Matches),
            other => Err(anyhow::anyhow!("Unknown table: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// One committed row change. For rows rewritten by a foreign key rule, `id`
/// is the deleted parent's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableChange {
    pub table: Table,
    pub action: ChangeAction,
    pub id: String,
}

/// Fan-out of row changes to every live subscriber. A subscription ends when
/// its receiver is dropped.
#[derive(Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<TableChange>,
}

impl ChangeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, change: TableChange) {
        // No subscribers is the common case, not an error.
        let delivered = self.sender.send(change.clone()).unwrap_or(0);
        tracing::debug!(
            "{:?} {} {} delivered to {} subscriber(s)",
            change.action,
            change.table,
            change.id,
            delivered
        );
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_changes() {
        let hub = ChangeHub::new();
        let mut rx = hub.subscribe();

        hub.publish(TableChange {
            table: Table::Managers,
            action: ChangeAction::Insert,
            id: "m1".to_string(),
        });

        let change = rx.recv().await.unwrap();
        assert_eq!(change.table, Table::Managers);
        assert_eq!(change.action, ChangeAction::Insert);
    }

    #[test]
    fn test_dropping_receiver_tears_down_subscription() {
        let hub = ChangeHub::new();
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_table_names_round_trip() {
        assert_eq!("managers".parse::<Table>().unwrap(), Table::Managers);
        assert!("user_roles".parse::<Table>().is_err());
    }
}
