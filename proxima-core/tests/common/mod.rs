//! Common test utilities for integration tests
//!
//! This module provides:
//! - Simulated collaborators: radio, transport, temperature sensor
//! - A slot-stepped multi-node simulation sharing one air medium
//! - Pre-built scenarios (close pair, crowd, walk-by)

#![allow(dead_code)]

use std::collections::VecDeque;

use proxima_core::{
    beacon::{Beacon, PeerId},
    traits::{Radio, SensorFault, TemperatureSensor, Transport},
};

pub mod harness;
pub mod scenarios;

/// Radio recording its power state and every toggle
#[derive(Debug, Default)]
pub struct SimRadio {
    pub on: bool,
    pub power_ups: u32,
    pub power_downs: u32,
}

impl Radio for SimRadio {
    fn on(&mut self) {
        if !self.on {
            self.power_ups += 1;
        }
        self.on = true;
    }

    fn off(&mut self) {
        if self.on {
            self.power_downs += 1;
        }
        self.on = false;
    }
}

/// Transport collecting broadcast frames until the medium drains them
#[derive(Debug, Default)]
pub struct SimTransport {
    pub outbox: Vec<Vec<u8>>,
    pub sent: usize,
}

impl SimTransport {
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbox)
    }
}

impl Transport for SimTransport {
    fn broadcast(&mut self, frame: &[u8]) {
        self.sent += 1;
        self.outbox.push(frame.to_vec());
    }
}

/// Sensor replaying scripted reads, warming up once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    reads: VecDeque<nb::Result<f32, SensorFault>>,
    pub calls: usize,
}

impl ScriptedSensor {
    pub fn reading(celsius: f32) -> Self {
        Self::script([Ok(celsius)])
    }

    pub fn warming_up_then(checks: usize, celsius: f32) -> Self {
        let mut reads: Vec<_> = (0..checks).map(|_| Err(nb::Error::WouldBlock)).collect();
        reads.push(Ok(celsius));
        Self::script(reads)
    }

    pub fn never_ready() -> Self {
        Self::default()
    }

    pub fn script<I>(reads: I) -> Self
    where
        I: IntoIterator<Item = nb::Result<f32, SensorFault>>,
    {
        Self {
            reads: reads.into_iter().collect(),
            calls: 0,
        }
    }
}

impl TemperatureSensor for ScriptedSensor {
    fn read(&mut self) -> nb::Result<f32, SensorFault> {
        self.calls += 1;
        self.reads.pop_front().unwrap_or(Err(nb::Error::WouldBlock))
    }
}

/// Encoded beacon from `peer`
pub fn beacon_frame(peer: PeerId, seq: u32) -> Vec<u8> {
    Beacon::new(peer, seq, 0).encode().to_vec()
}
