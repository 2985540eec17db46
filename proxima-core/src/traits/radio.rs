//! Radio power control and broadcast transport
//!
//! Radio-on time dominates the energy budget of a node, so power and
//! transmission are split: the scheduler alone toggles power, while the
//! transport only moves bytes.

/// Radio power switch
///
/// Both calls must be idempotent: turning on a radio that is already on is a
/// no-op.
pub trait Radio {
    /// Power the radio up (listen and transmit possible)
    fn on(&mut self);

    /// Power the radio down
    fn off(&mut self);
}

/// Best-effort broadcast transport
///
/// No delivery guarantee, no ordering, no unicast. Reception is not part of
/// this trait: the platform decodes nothing and hands raw frames to
/// [`Node::on_receive`](crate::node::Node::on_receive) on the same logical
/// thread as the scheduler.
pub trait Transport {
    /// Broadcast a frame on the discovery channel
    fn broadcast(&mut self, frame: &[u8]);
}
