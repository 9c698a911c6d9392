//! Board adapter: bridges the indicator pin and the system clock to the
//! port traits the link core is written against.
//!
//! The session and supervisor take a single `hw: &mut (impl IndicatorPort
//! + TimePort)` argument; this is the concrete type passed there in
//! firmware.  On non-espidf targets the pin is a mock and the clock is
//! `std::time`.

use embedded_hal::digital::OutputPin;

use super::gpio_indicator::GpioIndicator;
use super::time::Esp32TimeAdapter;
use crate::app::ports::{IndicatorPort, TimePort};

pub struct BoardAdapter<P> {
    indicator: GpioIndicator<P>,
    time: Esp32TimeAdapter,
}

impl<P: OutputPin> BoardAdapter<P> {
    pub fn new(indicator: GpioIndicator<P>, time: Esp32TimeAdapter) -> Self {
        Self { indicator, time }
    }

    pub fn indicator(&self) -> &GpioIndicator<P> {
        &self.indicator
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<P: OutputPin> IndicatorPort for BoardAdapter<P> {
    fn set_indicator(&mut self, active: bool) {
        self.indicator.set_indicator(active);
    }
}

// ── TimePort implementation ───────────────────────────────────

impl<P: OutputPin> TimePort for BoardAdapter<P> {
    fn now_ms(&self) -> u64 {
        self.time.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.time.delay_ms(ms);
    }
}
