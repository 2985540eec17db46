//! Slot arithmetic
//!
//! All positions are taken modulo the period length. Strategies may number
//! slots from 0 or from 1; these helpers only depend on differences, so
//! either base works as long as both arguments use the same one.

/// Slots to sleep between finishing `current` and waking for `next`
///
/// `(next - current - 1) mod total`, always in `[0, total - 1]`. A `next`
/// equal to `current` means a full period later.
pub fn sleep_slots(current: u16, next: u16, total: u16) -> u16 {
    if total == 0 {
        return 0;
    }
    let diff = next as i32 - current as i32 - 1;
    diff.rem_euclid(total as i32) as u16
}

/// Position `step` slots after `pos`, wrapping to the start of its block
pub fn advance_in_block(pos: u16, step: u16, block_len: u16) -> u16 {
    if block_len == 0 {
        return pos;
    }
    let start = pos - pos % block_len;
    start + (((pos % block_len) as u32 + step as u32) % block_len as u32) as u16
}

/// Position `step` slots before `pos`, wrapping to the end of its block
///
/// In block 0 this is what keeps a cursor from going below slot 0.
pub fn retreat_in_block(pos: u16, step: u16, block_len: u16) -> u16 {
    if block_len == 0 {
        return pos;
    }
    let start = pos - pos % block_len;
    let offset = (pos % block_len) as i32 - step as i32;
    start + offset.rem_euclid(block_len as i32) as u16
}

/// First slot of `block`
pub fn block_start(block: u16, block_len: u16) -> u16 {
    block * block_len
}

/// Last slot of `block`
pub fn block_end(block: u16, block_len: u16) -> u16 {
    block * block_len + block_len.saturating_sub(1)
}
