//! Fixed-Capacity Contact Table
//!
//! ## Overview
//!
//! The tracker keeps one [`ContactRecord`] per peer in an open-addressed hash
//! table with a capacity fixed at compile time. No heap, no pointers into the
//! table: records live inline in the slot array and are handed out as
//! borrows.
//!
//! ## Layout
//!
//! ```text
//! ContactTable<8>, home bucket = peer_id % 8:
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  ·  │ 9   │ ✝   │ 17  │  ·  │  ·  │ 6   │  ·  │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!   ·  = never used      ✝ = tombstone (deleted)
//! ```
//!
//! Peer 17 hashes to bucket 1, collides with 9, and lands two slots further
//! on after the entry in bucket 2 was inserted and later deleted.
//!
//! ## Tombstones
//!
//! Deleting a record cannot simply empty its slot: a later key of the same
//! probe chain (17 above) would become unreachable because a lookup stops at
//! the first never-used slot. Deleted slots are therefore marked as
//! tombstones, which are:
//!
//! - **occupied for scanning**: lookups walk past them
//! - **empty for placement**: inserts reuse the first one they meet
//!
//! A lookup ends at a never-used slot or after visiting every slot once.
//! When the last live record goes away, all tombstones are reset to
//! never-used so probe chains do not grow without bound.
//!
//! ## Thread Safety
//!
//! Not thread-safe. The tracker mutates the table from the receive handler
//! and the maintenance sweep only, on the scheduler's thread. A port that
//! receives in interrupt context must wrap both in a critical section.

use crate::beacon::PeerId;
use crate::errors::{ProximityError, ProximityResult};
use crate::time::Seconds;

/// One tracked peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactRecord {
    /// Peer identity
    pub peer_id: PeerId,
    /// First qualifying detection of this encounter
    pub first_seen: Seconds,
    /// Most recent qualifying detection
    pub last_seen: Seconds,
    /// Set once the encounter has lasted the exposure window
    pub exposed: bool,
}

impl ContactRecord {
    /// Fresh record for a peer first seen at `now`
    pub const fn new(peer_id: PeerId, now: Seconds) -> Self {
        Self {
            peer_id,
            first_seen: now,
            last_seen: now,
            exposed: false,
        }
    }

    /// Length of the encounter so far
    pub fn contact_duration(&self) -> Seconds {
        self.last_seen.saturating_sub(self.first_seen)
    }

    /// Seconds since the last detection
    pub fn idle_for(&self, now: Seconds) -> Seconds {
        now.saturating_sub(self.last_seen)
    }
}

/// State of one table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Never held a record since the last reset
    Empty,
    /// Held a record that was removed
    Tombstone,
    /// Holds a live record
    Occupied(ContactRecord),
}

/// Open-addressed peer table with `N` slots
#[derive(Debug, Clone)]
pub struct ContactTable<const N: usize> {
    slots: [Slot; N],
    /// Live records
    len: usize,
}

impl<const N: usize> ContactTable<N> {
    const NON_EMPTY: () = assert!(N > 0, "contact table needs at least one slot");

    /// Creates an empty table
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            slots: [Slot::Empty; N],
            len: 0,
        }
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no record is live
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when every slot holds a live record
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    fn home(peer_id: PeerId) -> usize {
        peer_id as usize % N
    }

    /// Slot index holding `peer_id`, probing past tombstones
    fn find(&self, peer_id: PeerId) -> Option<usize> {
        let home = Self::home(peer_id);
        for step in 0..N {
            let idx = (home + step) % N;
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(record) if record.peer_id == peer_id => return Some(idx),
                _ => {}
            }
        }
        None
    }

    /// Look up a peer. `None` is the normal "not tracked" answer.
    pub fn get(&self, peer_id: PeerId) -> Option<&ContactRecord> {
        let idx = self.find(peer_id)?;
        match &self.slots[idx] {
            Slot::Occupied(record) => Some(record),
            _ => None,
        }
    }

    /// Mutable lookup
    pub fn get_mut(&mut self, peer_id: PeerId) -> Option<&mut ContactRecord> {
        let idx = self.find(peer_id)?;
        match &mut self.slots[idx] {
            Slot::Occupied(record) => Some(record),
            _ => None,
        }
    }

    /// True if `peer_id` has a live record
    pub fn contains(&self, peer_id: PeerId) -> bool {
        self.find(peer_id).is_some()
    }

    /// Start tracking `peer_id` as first seen at `now`
    ///
    /// If the peer is already tracked its record is returned unchanged, so
    /// the table never holds two live records for one id. A new record takes
    /// the first tombstone or never-used slot of the probe chain.
    ///
    /// Fails with [`ProximityError::TableFull`] when every slot is live; the
    /// existing records are not touched.
    pub fn insert(&mut self, peer_id: PeerId, now: Seconds) -> ProximityResult<&mut ContactRecord> {
        let home = Self::home(peer_id);
        let mut free = None;
        let mut existing = None;

        for step in 0..N {
            let idx = (home + step) % N;
            match &self.slots[idx] {
                Slot::Empty => {
                    free.get_or_insert(idx);
                    break;
                }
                Slot::Tombstone => {
                    free.get_or_insert(idx);
                }
                Slot::Occupied(record) if record.peer_id == peer_id => {
                    existing = Some(idx);
                    break;
                }
                Slot::Occupied(_) => {}
            }
        }

        let idx = match (existing, free) {
            (Some(idx), _) => idx,
            (None, Some(idx)) => {
                self.slots[idx] = Slot::Occupied(ContactRecord::new(peer_id, now));
                self.len += 1;
                idx
            }
            (None, None) => return Err(ProximityError::TableFull { capacity: N }),
        };

        match &mut self.slots[idx] {
            Slot::Occupied(record) => Ok(record),
            // Both arms above leave the slot occupied
            _ => Err(ProximityError::TableFull { capacity: N }),
        }
    }

    /// Stop tracking `peer_id`, returning its record
    pub fn remove(&mut self, peer_id: PeerId) -> Option<ContactRecord> {
        let idx = self.find(peer_id)?;
        self.take(idx)
    }

    fn take(&mut self, idx: usize) -> Option<ContactRecord> {
        match core::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(record) => {
                self.len -= 1;
                if self.len == 0 {
                    self.reset_tombstones();
                }
                Some(record)
            }
            other => {
                self.slots[idx] = other;
                None
            }
        }
    }

    fn reset_tombstones(&mut self) {
        for slot in self.slots.iter_mut() {
            if matches!(slot, Slot::Tombstone) {
                *slot = Slot::Empty;
            }
        }
    }

    /// Remove every record matching `predicate`, handing each to `on_evict`
    ///
    /// Slots are scanned in index order.
    pub fn evict_where<P, F>(&mut self, mut predicate: P, mut on_evict: F) -> usize
    where
        P: FnMut(&ContactRecord) -> bool,
        F: FnMut(ContactRecord),
    {
        let mut evicted = 0;
        for idx in 0..N {
            let hit = match &self.slots[idx] {
                Slot::Occupied(record) => predicate(record),
                _ => false,
            };
            if hit {
                if let Some(record) = self.take(idx) {
                    on_evict(record);
                    evicted += 1;
                }
            }
        }
        evicted
    }

    /// Iterate over live records in slot order
    pub fn iter(&self) -> impl Iterator<Item = &ContactRecord> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(record) => Some(record),
            _ => None,
        })
    }

    /// Raw slot states, for diagnostics
    pub fn slots(&self) -> &[Slot; N] {
        &self.slots
    }

    /// Number of tombstoned slots
    pub fn tombstones(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Tombstone))
            .count()
    }
}

impl<const N: usize> Default for ContactTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_table() {
        let table: ContactTable<20> = ContactTable::new();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 20);
        assert!(table.get(7).is_none());
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn insert_and_lookup() {
        let mut table = ContactTable::<20>::new();

        let record = table.insert(7, 100).unwrap();
        assert_eq!(*record, ContactRecord::new(7, 100));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(7).unwrap().first_seen, 100);
        assert!(table.get(8).is_none());
    }

    #[test]
    fn duplicate_insert_returns_existing() {
        let mut table = ContactTable::<20>::new();
        table.insert(7, 100).unwrap().last_seen = 120;

        let again = table.insert(7, 200).unwrap();
        assert_eq!(again.first_seen, 100);
        assert_eq!(again.last_seen, 120);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lookup_probes_past_tombstone() {
        let mut table = ContactTable::<5>::new();

        // 1, 6 and 11 all share bucket 1
        table.insert(1, 0).unwrap();
        table.insert(6, 0).unwrap();
        table.insert(11, 0).unwrap();

        // Delete the earlier colliding key
        assert!(table.remove(6).is_some());
        assert_eq!(table.tombstones(), 1);

        // The later key must still be found behind the tombstone
        assert!(table.contains(11));
        assert_eq!(table.get(11).unwrap().peer_id, 11);
        assert!(table.remove(11).is_some());
        assert!(!table.contains(11));
    }

    #[test]
    fn insert_reuses_tombstone_without_duplicating() {
        let mut table = ContactTable::<5>::new();
        table.insert(1, 0).unwrap();
        table.insert(6, 0).unwrap();
        table.insert(11, 0).unwrap();
        table.remove(6);

        // 11 lives behind the tombstone; re-inserting it must not create a
        // second record in the tombstoned slot
        table.insert(11, 50).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.iter().filter(|r| r.peer_id == 11).count(), 1);

        // A new colliding key takes the tombstone
        table.insert(16, 60).unwrap();
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.slots()[2], Slot::Occupied(ContactRecord::new(16, 60)));
    }

    #[test]
    fn full_table_rejects_and_keeps_records() {
        let mut table = ContactTable::<3>::new();
        for id in 0..3 {
            table.insert(id, id).unwrap();
        }
        assert!(table.is_full());

        let before = table.clone();
        assert_eq!(
            table.insert(99, 5).map(|r| r.peer_id),
            Err(ProximityError::TableFull { capacity: 3 })
        );
        assert_eq!(table.slots(), before.slots());

        // Known ids still resolve while full
        assert_eq!(table.insert(1, 9).unwrap().first_seen, 1);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut table = ContactTable::<4>::new();
        assert!(table.remove(3).is_none());
        table.insert(3, 0).unwrap();
        assert!(table.remove(7).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn last_removal_clears_tombstones() {
        let mut table = ContactTable::<4>::new();
        table.insert(1, 0).unwrap();
        table.insert(5, 0).unwrap();
        table.remove(1);
        assert_eq!(table.tombstones(), 1);

        table.remove(5);
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
    }

    #[test]
    fn evict_where_frees_slots() {
        let mut table = ContactTable::<4>::new();
        for id in 0..4 {
            table.insert(id, id * 10).unwrap();
        }

        let mut evicted = [0u32; 4];
        let mut count = 0;
        let n = table.evict_where(
            |r| r.first_seen < 20,
            |r| {
                evicted[count] = r.peer_id;
                count += 1;
            },
        );

        assert_eq!(n, 2);
        assert_eq!(&evicted[..count], &[0, 1]);
        assert_eq!(table.len(), 2);

        // Freed slots are reusable
        table.insert(40, 0).unwrap();
        table.insert(41, 0).unwrap();
        assert!(table.is_full());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u32),
        Remove(u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..40).prop_map(Op::Insert),
            (0u32..40).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn behaves_like_a_bounded_set(ops in proptest::collection::vec(op(), 0..200)) {
            let mut table = ContactTable::<8>::new();
            let mut model: std::collections::BTreeSet<u32> = Default::default();

            for op in ops {
                match op {
                    Op::Insert(id) => {
                        let result = table.insert(id, 0).map(|r| r.peer_id);
                        if model.contains(&id) || model.len() < 8 {
                            prop_assert_eq!(result, Ok(id));
                            model.insert(id);
                        } else {
                            prop_assert_eq!(result, Err(ProximityError::TableFull { capacity: 8 }));
                        }
                    }
                    Op::Remove(id) => {
                        let removed = table.remove(id).map(|r| r.peer_id);
                        prop_assert_eq!(removed, model.take(&id));
                    }
                }

                prop_assert!(table.len() <= table.capacity());
                prop_assert_eq!(table.len(), model.len());
                for id in 0..40 {
                    prop_assert_eq!(table.contains(id), model.contains(&id));
                }
            }
        }
    }
}
