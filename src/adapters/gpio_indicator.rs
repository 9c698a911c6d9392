//! Single-GPIO heartbeat indicator.
//!
//! Drives any `embedded_hal` [`OutputPin`] as an on/off sink.  The link
//! core only ever writes the desired state; it never reads the pin back.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: wraps an `esp_idf_hal::gpio::PinDriver<_, Output>`.
//! On host/test: any mock pin implementing `OutputPin`.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::IndicatorPort;

pub struct GpioIndicator<P> {
    pin: P,
    active_low: bool,
    /// Last level requested, in logical (active = `true`) terms.
    current: bool,
}

impl<P: OutputPin> GpioIndicator<P> {
    /// Active-high indicator (pin high = LED on).
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
            current: false,
        }
    }

    /// Active-low indicator (pin low = LED on), for sink-wired LEDs.
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
            current: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current
    }

    /// Release the underlying pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> IndicatorPort for GpioIndicator<P> {
    fn set_indicator(&mut self, active: bool) {
        let high = active != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            warn!("Indicator: pin write failed: {:?}", e);
        }
        self.current = active;
    }
}
