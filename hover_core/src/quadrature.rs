//! Quadrature decoder for the yaw encoder.
//!
//! The two phase lines walk the Gray cycle `00 -> 01 -> 11 -> 10 -> 00` in
//! the forward direction and the reverse cycle backwards. Each edge compares
//! the new pair with the previous one: one step forward adds 1 to yaw, one
//! step back subtracts 1, and anything else (no change, or a skipped state
//! from a missed edge or contact bounce) leaves yaw alone.
//!
//! The decoder is the only writer of the yaw count; readers hold a
//! `YawReader` and see each update as one atomic word.
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

/// Logic levels of the two phase lines, packed as `A << 1 | B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase(u8);

impl Phase {
    pub const fn from_pins(a: bool, b: bool) -> Self {
        Self(((a as u8) << 1) | (b as u8))
    }

    pub const fn a(self) -> bool {
        self.0 & 0b10 != 0
    }

    pub const fn b(self) -> bool {
        self.0 & 0b01 != 0
    }

    /// Position of this state in the forward Gray cycle.
    const fn cycle_index(self) -> u8 {
        match self.0 {
            0b00 => 0,
            0b01 => 1,
            0b11 => 2,
            _ => 3,
        }
    }

    /// Forward Gray cycle, starting from `00`.
    pub const FORWARD: [Phase; 4] = [Phase(0b00), Phase(0b01), Phase(0b11), Phase(0b10)];
}

/// Outcome of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Reverse,
    Ignored,
}

impl Step {
    /// Classify the transition `prev -> next`.
    pub const fn between(prev: Phase, next: Phase) -> Self {
        match (next.cycle_index() + 4 - prev.cycle_index()) % 4 {
            1 => Step::Forward,
            3 => Step::Reverse,
            _ => Step::Ignored,
        }
    }

    const fn delta(self) -> i32 {
        match self {
            Step::Forward => 1,
            Step::Reverse => -1,
            Step::Ignored => 0,
        }
    }
}

/// Edge-driven state machine. Owned by the edge source.
#[derive(Debug)]
pub struct QuadratureDecoder {
    prev: Phase,
    yaw: Arc<AtomicI32>,
}

impl QuadratureDecoder {
    /// Start from the phase lines' current levels with a yaw of zero.
    pub fn new(initial: Phase) -> (Self, YawReader) {
        let yaw = Arc::new(AtomicI32::new(0));
        (
            Self {
                prev: initial,
                yaw: Arc::clone(&yaw),
            },
            YawReader { yaw },
        )
    }

    /// Edge handler: call on every transition of either phase line.
    #[inline]
    pub fn on_edge(&mut self, a: bool, b: bool) -> Step {
        let next = Phase::from_pins(a, b);
        let step = Step::between(self.prev, next);
        if step != Step::Ignored {
            // Wraps on overflow; this context is the only writer.
            self.yaw.fetch_add(step.delta(), Ordering::Relaxed);
        }
        // A skipped state still resynchronises on the lines' actual levels.
        self.prev = next;
        step
    }

    pub fn phase(&self) -> Phase {
        self.prev
    }
}

/// Read-only view of the yaw count.
#[derive(Debug, Clone)]
pub struct YawReader {
    yaw: Arc<AtomicI32>,
}

impl YawReader {
    /// Signed pulse count since start-up.
    #[inline]
    pub fn get(&self) -> i32 {
        self.yaw.load(Ordering::Relaxed)
    }

    /// Yaw in whole degrees for an encoder with `counts_per_rev` counts per turn.
    /// Truncates toward zero; `counts_per_rev == 0` yields 0.
    pub fn degrees(&self, counts_per_rev: u32) -> i32 {
        if counts_per_rev == 0 {
            return 0;
        }
        let deg = i64::from(self.get()) * 360 / i64::from(counts_per_rev);
        deg.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}
