//! Three-way classification of a resource into a [`SyncStatus`]
//!
//! The decision table is evaluated top to bottom, first match wins:
//!
//! 1. A blob and a tree among the existing sides is a conflicting change.
//! 2. Without a base the outcome is an addition on whichever sides exist.
//! 3. With a base, a strictly absent local side is a deletion (pseudo-conflict
//!    when the remote is gone too); otherwise local and remote are compared
//!    against the base and the direction of a change is taken from ancestry
//!    lengths, or from where each tip sits in the other history when either
//!    history was capped.
//!
//! Absent (`None`) and present-but-not-existing are different inputs. Files
//! deleted from the working tree arrive as `None`; folders arrive as a tree
//! handle whose `exists` is false. That asymmetry produces two folder
//! outcomes that differ from the file rules and are kept on purpose:
//!
//! - folders added on both sides against a referenced-but-missing base
//!   classify as a conflicting change, not a conflicting addition;
//! - folders deleted on both sides, with a missing local handle, classify as a
//!   conflicting change, not a pseudo-conflicting deletion.

use std::cmp::Ordering;

use tracing::debug;

use crate::compare::VariantComparator;
use crate::status::{Direction, SyncChange, SyncStatus};
use crate::store::VariantStore;
use crate::variant::{CommitId, Variant, exists};
use crate::Result;

/// The three states of a resource submitted for classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncTriple {
    pub local: Option<Variant>,
    pub base: Option<Variant>,
    pub remote: Option<Variant>,
}

impl SyncTriple {
    pub fn new(local: Option<Variant>, base: Option<Variant>, remote: Option<Variant>) -> Self {
        Self {
            local,
            base,
            remote,
        }
    }

    /// Path of the first side that carries one.
    pub fn path(&self) -> Option<&sync_fs::NormalizedPath> {
        self.local
            .as_ref()
            .or(self.base.as_ref())
            .or(self.remote.as_ref())
            .map(Variant::path)
    }
}

/// Stateless classifier; reentrant and safe to share between threads of
/// callers that each own a store reference.
#[derive(Clone, Copy)]
pub struct Classifier<'a> {
    comparator: VariantComparator<'a>,
}

impl<'a> Classifier<'a> {
    pub fn new(store: &'a dyn VariantStore) -> Self {
        Self {
            comparator: VariantComparator::new(store),
        }
    }

    pub fn with_comparator(comparator: VariantComparator<'a>) -> Self {
        Self { comparator }
    }

    /// Classify a triple.
    ///
    /// # Errors
    ///
    /// Propagates content read failures from the comparator; a failure never
    /// degrades into [`SyncStatus::IN_SYNC`].
    pub fn classify(&self, triple: &SyncTriple) -> Result<SyncStatus> {
        let status = self.decide(triple)?;
        debug!(
            path = %triple.path().map(|p| p.as_str()).unwrap_or("<none>"),
            status = %status,
            "Classified resource"
        );
        Ok(status)
    }

    fn decide(&self, triple: &SyncTriple) -> Result<SyncStatus> {
        let local = triple.local.as_ref();
        let base = triple.base.as_ref();
        let remote = triple.remote.as_ref();

        if has_type_conflict([local, base, remote]) {
            return Ok(SyncStatus::conflicting(SyncChange::Change));
        }

        let Some(base) = base else {
            return Ok(without_base(exists(local), exists(remote)));
        };

        let Some(local) = local else {
            if !exists(remote) {
                return Ok(SyncStatus::pseudo_conflict(SyncChange::Deletion));
            }
            return Ok(if self.comparator.equal(remote, Some(base))? {
                SyncStatus::outgoing(SyncChange::Deletion)
            } else {
                SyncStatus::conflicting(SyncChange::Change)
            });
        };

        let local_changed = !self.comparator.equal(Some(local), Some(base))?;

        let Some(remote) = remote.filter(|r| r.exists()) else {
            return Ok(if local_changed {
                SyncStatus::conflicting(SyncChange::Change)
            } else {
                SyncStatus::incoming(SyncChange::Deletion)
            });
        };

        let remote_changed = !self.comparator.equal(Some(remote), Some(base))?;
        if !local_changed && !remote_changed {
            return Ok(SyncStatus::IN_SYNC);
        }

        let direction = if base.is_ancestry_truncated() || remote.is_ancestry_truncated() {
            containment_direction(
                base.ancestry(),
                remote.ancestry(),
                local_changed,
                remote_changed,
            )
        } else {
            ancestry_direction(
                base.ancestry(),
                remote.ancestry(),
                local_changed,
                remote_changed,
            )
        };
        Ok(SyncStatus::new(direction, SyncChange::Change))
    }
}

fn has_type_conflict(sides: [Option<&Variant>; 3]) -> bool {
    let existing = sides.into_iter().flatten().filter(|v| v.exists());
    let (mut blobs, mut trees) = (false, false);
    for variant in existing {
        if variant.is_tree() {
            trees = true;
        } else {
            blobs = true;
        }
    }
    blobs && trees
}

fn without_base(local_exists: bool, remote_exists: bool) -> SyncStatus {
    match (local_exists, remote_exists) {
        (true, false) => SyncStatus::outgoing(SyncChange::Addition),
        (true, true) => SyncStatus::conflicting(SyncChange::Addition),
        (false, true) => SyncStatus::incoming(SyncChange::Addition),
        (false, false) => SyncStatus::IN_SYNC,
    }
}

/// Order base and remote by ancestry length.
///
/// Ancestry runs from the variant's own commit back toward genesis, so the
/// tip is the first entry. A longer remote history that contains the base tip
/// at the matching depth is ahead; a longer base history is ahead of the
/// remote. Equal lengths with different tips cannot be ordered.
fn ancestry_direction(
    base: &[CommitId],
    remote: &[CommitId],
    local_changed: bool,
    remote_changed: bool,
) -> Direction {
    let (b_len, r_len) = (base.len(), remote.len());

    match r_len.cmp(&b_len) {
        Ordering::Greater => {
            if b_len == 0 || remote[r_len - b_len] == base[0] {
                Direction::Incoming
            } else {
                Direction::Conflicting
            }
        }
        Ordering::Less => Direction::Outgoing,
        Ordering::Equal if base.first() != remote.first() => Direction::Conflicting,
        // Same history depth and tip: only content tells the sides apart
        Ordering::Equal => by_content(local_changed, remote_changed),
    }
}

/// Order base and remote when at least one history is a capped prefix.
///
/// Lengths of capped histories say nothing about depth, so each tip is
/// looked up in the other side's list instead: the base tip further down the
/// remote history means the remote is ahead, and the other way round.
fn containment_direction(
    base: &[CommitId],
    remote: &[CommitId],
    local_changed: bool,
    remote_changed: bool,
) -> Direction {
    let (Some(base_tip), Some(remote_tip)) = (base.first(), remote.first()) else {
        return ancestry_direction(base, remote, local_changed, remote_changed);
    };
    if base_tip == remote_tip {
        by_content(local_changed, remote_changed)
    } else if remote[1..].contains(base_tip) {
        Direction::Incoming
    } else if base[1..].contains(remote_tip) {
        Direction::Outgoing
    } else {
        Direction::Conflicting
    }
}

fn by_content(local_changed: bool, remote_changed: bool) -> Direction {
    match (local_changed, remote_changed) {
        (true, false) => Direction::Outgoing,
        (false, true) => Direction::Incoming,
        _ => Direction::Conflicting,
    }
}
