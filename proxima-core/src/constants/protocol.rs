//! Slot Layout and Protocol Parameters
//!
//! These values shape the duty cycle. Two nodes only rendezvous reliably
//! when they agree on the period length, so treat the slot counts as part
//! of the over-the-air protocol.

// ===== PERMUTATION PROBING =====

/// Slots per period for permutation probing.
///
/// With one anchor and one probe per period the duty cycle is
/// `2 / TOTAL_SLOTS` = 8%.
pub const TOTAL_SLOTS: u16 = 25;

/// Number of probe slot identities shuffled into the permutation.
///
/// Identities `2..=PROBE_SLOTS + 1` sit in the first half of the period.
pub const PROBE_SLOTS: u16 = TOTAL_SLOTS / 2;

// ===== BLIND DATE =====

/// Number of blocks the Blind Date period is split into.
pub const BLIND_DATE_BLOCKS: u16 = 5;

/// Slots per Blind Date block.
pub const BLIND_DATE_BLOCK_LEN: u16 = 5;

/// Slots a Blind Date probe cursor moves per period.
///
/// Cursors stay inside their block, so this must be below
/// `BLIND_DATE_BLOCK_LEN` and coprime with it for a cursor to visit every
/// slot of its block.
pub const BLIND_DATE_STEP: u16 = 1;

// ===== BURST & MAINTENANCE =====

/// Beacon copies transmitted back-to-back in each active slot.
pub const NUM_SEND: u8 = 1;

/// Anchor visits between two maintenance sweeps of the contact table.
pub const MAINTENANCE_FREQ: u16 = 3;

// ===== LIMITS =====

/// Largest supported period, bounded by the fixed permutation storage.
pub const MAX_TOTAL_SLOTS: u16 = 256;

/// Capacity of the permutation array.
pub const MAX_PROBE_SLOTS: usize = (MAX_TOTAL_SLOTS / 2) as usize;

/// Default number of peers tracked at once.
///
/// Sized for a crowded room; the table uses 16 bytes per slot.
pub const DEFAULT_TABLE_CAPACITY: usize = 20;

/// Added to the node id to seed each node's random source, so that nodes
/// flashed with the same image still pick different schedules.
pub const RNG_SEED_BASE: u64 = 54222;
