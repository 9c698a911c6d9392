//! Sensor subsystem — the telemetry sample type and its wire encoding.
//!
//! [`simulated::TelemetryGenerator`] produces one [`TelemetrySample`] per
//! streaming tick; the session serialises it with
//! [`TelemetrySample::to_payload`] and writes it to the collector.
//!
//! ## Wire format
//!
//! One JSON object per tick, no framing, no trailing newline:
//!
//! ```text
//! {"acc_x":1.23,"acc_y":-2.99,"acc_z":6.17,"temp":21.40,"hum":55.02,
//!  "pres":1104.87,"co":97.12,"batt":64,"amp_x":0.0712,"amp_y":0.0533,
//!  "amp_z":0.1021,"frec_x":30.11,"frec_y":60.47,"frec_z":89.62}
//! ```
//!
//! Accelerations and environmental channels carry 2 decimals, vibration
//! amplitudes 4 decimals, vibration frequencies 2 decimals, battery is an
//! integer percentage.

pub mod simulated;

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};

/// Encoded payload upper bound.  Generated samples stay under 200 bytes;
/// a sample with every float at `-f32::MAX` takes 690.
pub const PAYLOAD_CAPACITY: usize = 704;

/// A serialised telemetry payload, ready for `send`.
pub type Payload = heapless::String<PAYLOAD_CAPACITY>;

/// One telemetry reading.  Generated fresh per send and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Acceleration, X axis (m/s², sinusoidal).
    pub acc_x: f32,
    /// Acceleration, Y axis (m/s², sinusoidal).
    pub acc_y: f32,
    /// Acceleration, Z axis (m/s², sinusoidal).
    pub acc_z: f32,
    /// Ambient temperature (°C).
    pub temp: f32,
    /// Relative humidity (%).
    pub hum: f32,
    /// Barometric pressure (hPa).
    pub pres: f32,
    /// Carbon monoxide (ppm).
    pub co: f32,
    /// Battery charge (%).
    pub batt: u8,
    /// Vibration amplitude, X axis.
    pub amp_x: f32,
    /// Vibration amplitude, Y axis.
    pub amp_y: f32,
    /// Vibration amplitude, Z axis.
    pub amp_z: f32,
    /// Vibration frequency, X axis (Hz).
    pub frec_x: f32,
    /// Vibration frequency, Y axis (Hz).
    pub frec_y: f32,
    /// Vibration frequency, Z axis (Hz).
    pub frec_z: f32,
}

/// One numeric field at fixed precision.  Non-finite values have no JSON
/// spelling and are written as `null`.
struct Fixed(f32, usize);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() {
            write!(f, "{:.*}", self.1, self.0)
        } else {
            f.write_str("null")
        }
    }
}

impl TelemetrySample {
    /// Render the sample as the collector's JSON object.
    ///
    /// Every `f32`, including `±f32::MAX`, fits in [`PAYLOAD_CAPACITY`],
    /// so an `Err` here means the buffer size and the format drifted apart.
    pub fn to_payload(&self) -> Result<Payload, fmt::Error> {
        let mut out = Payload::new();
        write!(
            out,
            "{{\"acc_x\":{},\"acc_y\":{},\"acc_z\":{},\"temp\":{},\"hum\":{},\
             \"pres\":{},\"co\":{},\"batt\":{},\
             \"amp_x\":{},\"amp_y\":{},\"amp_z\":{},\
             \"frec_x\":{},\"frec_y\":{},\"frec_z\":{}}}",
            Fixed(self.acc_x, 2),
            Fixed(self.acc_y, 2),
            Fixed(self.acc_z, 2),
            Fixed(self.temp, 2),
            Fixed(self.hum, 2),
            Fixed(self.pres, 2),
            Fixed(self.co, 2),
            self.batt,
            Fixed(self.amp_x, 4),
            Fixed(self.amp_y, 4),
            Fixed(self.amp_z, 4),
            Fixed(self.frec_x, 2),
            Fixed(self.frec_y, 2),
            Fixed(self.frec_z, 2),
        )?;
        Ok(out)
    }
}
