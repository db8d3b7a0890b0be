//! Synchronization status: direction x change kind x pseudo-conflict

use serde::Serialize;

/// Which side a change travels from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Nothing to transfer
    None,
    /// The remote side changed
    Incoming,
    /// The local side changed
    Outgoing,
    /// Both sides changed, or the order cannot be proven
    Conflicting,
}

/// What kind of change was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncChange {
    InSync,
    Addition,
    Deletion,
    Change,
}

/// Classification of one resource. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SyncStatus {
    pub direction: Direction,
    pub change: SyncChange,
    /// Both sides independently reached the same outcome
    pub pseudo_conflict: bool,
}

impl SyncStatus {
    pub const IN_SYNC: Self = Self {
        direction: Direction::None,
        change: SyncChange::InSync,
        pseudo_conflict: false,
    };

    pub const fn new(direction: Direction, change: SyncChange) -> Self {
        Self {
            direction,
            change,
            pseudo_conflict: false,
        }
    }

    pub const fn incoming(change: SyncChange) -> Self {
        Self::new(Direction::Incoming, change)
    }

    pub const fn outgoing(change: SyncChange) -> Self {
        Self::new(Direction::Outgoing, change)
    }

    pub const fn conflicting(change: SyncChange) -> Self {
        Self::new(Direction::Conflicting, change)
    }

    /// A conflict whose outcome is identical on both sides.
    pub const fn pseudo_conflict(change: SyncChange) -> Self {
        Self {
            direction: Direction::Conflicting,
            change,
            pseudo_conflict: true,
        }
    }

    pub fn is_in_sync(&self) -> bool {
        self.change == SyncChange::InSync
    }

    pub fn is_conflict(&self) -> bool {
        self.direction == Direction::Conflicting
    }

    /// Human readable label, e.g. `"outgoing addition"`.
    pub fn label(&self) -> String {
        if self.is_in_sync() {
            return "in sync".to_string();
        }
        let direction = match self.direction {
            Direction::None => "",
            Direction::Incoming => "incoming ",
            Direction::Outgoing => "outgoing ",
            Direction::Conflicting => "conflicting ",
        };
        let change = match self.change {
            SyncChange::InSync => "in sync",
            SyncChange::Addition => "addition",
            SyncChange::Deletion => "deletion",
            SyncChange::Change => "change",
        };
        let pseudo = if self.pseudo_conflict { " (pseudo)" } else { "" };
        format!("{direction}{change}{pseudo}")
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::IN_SYNC
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
