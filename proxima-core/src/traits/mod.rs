//! Collaborator Traits
//!
//! The core owns the scheduling and tracking logic and nothing else. Every
//! piece of hardware it touches sits behind one of these traits, so the same
//! code runs on a CC2650 board, on an RTOS, or inside a host simulation.
//!
//! ## Module Organization
//!
//! - [`time`] - slot clock: current time and next-wake arming
//! - [`radio`] - radio power and broadcast transport
//! - [`sensor`] - ambient temperature sensor for the threshold policy
//! - [`rng`] - uniform random integers for schedule generation
//!
//! ## Ownership
//!
//! A [`Node`](crate::node::Node) owns its radio, transport and clock. The
//! radio power state therefore has a single writer, the scheduler. The
//! temperature sensor is only borrowed during startup, and the random source
//! only while the schedule is generated.

pub mod time;
pub mod radio;
pub mod sensor;
pub mod rng;

pub use time::SlotClock;
pub use radio::{Radio, Transport};
pub use sensor::{TemperatureSensor, SensorFault};
pub use rng::UniformSource;
