//! Simulated sensor front-end.
//!
//! Produces one [`TelemetrySample`] per call.  The three acceleration
//! channels are pure functions of a cyclic phase counter `n` (0..2000,
//! 0.001 cycles per step); the remaining eleven channels are drawn
//! uniformly from fixed ranges using an injectable random source.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`TelemetryGenerator::from_entropy`] seeds from the
//! hardware RNG (through `getrandom`).
//! On host/test: [`TelemetryGenerator::from_seed`] gives reproducible
//! output.

use core::f64::consts::PI;
use core::ops::RangeInclusive;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::TelemetrySample;
use crate::app::ports::TelemetrySource;

/// Phase counter period.  `n` wraps to 0 after reaching this value.
pub const PHASE_PERIOD: u32 = 2000;

/// Phase advance per sample, in cycles.
const PHASE_STEP_CYCLES: f64 = 0.001;

const ACC_X_AMPLITUDE: f64 = 2.0;
const ACC_Y_AMPLITUDE: f64 = 3.0;
const ACC_Z_AMPLITUDE: f64 = 10.0;

// Uniform channel ranges (inclusive).
pub const TEMP_RANGE: RangeInclusive<f32> = 5.0..=30.0;
pub const HUM_RANGE: RangeInclusive<f32> = 30.0..=80.0;
pub const PRES_RANGE: RangeInclusive<f32> = 1000.0..=1200.0;
pub const CO_RANGE: RangeInclusive<f32> = 30.0..=200.0;
pub const BATT_RANGE: RangeInclusive<u8> = 1..=100;
pub const AMP_X_RANGE: RangeInclusive<f32> = 0.0059..=0.12;
pub const FREC_X_RANGE: RangeInclusive<f32> = 29.0..=31.0;
pub const AMP_Y_RANGE: RangeInclusive<f32> = 0.0041..=0.11;
pub const FREC_Y_RANGE: RangeInclusive<f32> = 59.0..=61.0;
pub const AMP_Z_RANGE: RangeInclusive<f32> = 0.008..=0.15;
pub const FREC_Z_RANGE: RangeInclusive<f32> = 89.0..=91.0;

/// Acceleration triple for phase index `n`.
///
/// Depends only on `n`; never on wall-clock time.
pub fn acceleration_at(n: u32) -> (f32, f32, f32) {
    let angle = 2.0 * PI * PHASE_STEP_CYCLES * f64::from(n % PHASE_PERIOD);
    (
        (ACC_X_AMPLITUDE * angle.sin()) as f32,
        (ACC_Y_AMPLITUDE * angle.cos()) as f32,
        (ACC_Z_AMPLITUDE * angle.sin()) as f32,
    )
}

/// Telemetry generator over any `rand` source.
pub struct TelemetryGenerator<R = SmallRng> {
    n: u32,
    rng: R,
}

impl TelemetryGenerator<SmallRng> {
    /// Reproducible generator for tests and bench runs.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    /// Generator seeded from the platform entropy source.
    pub fn from_entropy() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }
}

impl<R: Rng> TelemetryGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { n: 0, rng }
    }

    /// Current phase index (the `n` the next sample will use).
    pub fn phase(&self) -> u32 {
        self.n
    }

    /// Produce the next sample and advance the phase counter.
    pub fn next_sample(&mut self) -> TelemetrySample {
        let (acc_x, acc_y, acc_z) = acceleration_at(self.n);
        self.n = (self.n + 1) % PHASE_PERIOD;

        // Draw order is fixed so a given seed always yields the same sample.
        let temp = self.rng.gen_range(TEMP_RANGE);
        let hum = self.rng.gen_range(HUM_RANGE);
        let pres = self.rng.gen_range(PRES_RANGE);
        let co = self.rng.gen_range(CO_RANGE);
        let batt = self.rng.gen_range(BATT_RANGE);
        let amp_x = self.rng.gen_range(AMP_X_RANGE);
        let frec_x = self.rng.gen_range(FREC_X_RANGE);
        let amp_y = self.rng.gen_range(AMP_Y_RANGE);
        let frec_y = self.rng.gen_range(FREC_Y_RANGE);
        let amp_z = self.rng.gen_range(AMP_Z_RANGE);
        let frec_z = self.rng.gen_range(FREC_Z_RANGE);

        TelemetrySample {
            acc_x,
            acc_y,
            acc_z,
            temp,
            hum,
            pres,
            co,
            batt,
            amp_x,
            amp_y,
            amp_z,
            frec_x,
            frec_y,
            frec_z,
        }
    }
}

impl<R: Rng> TelemetrySource for TelemetryGenerator<R> {
    fn next_sample(&mut self) -> TelemetrySample {
        TelemetryGenerator::next_sample(self)
    }
}
