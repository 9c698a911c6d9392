//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements         | Connects to                 |
//! |------------------|--------------------|-----------------------------|
//! | `board`          | IndicatorPort      | status LED GPIO             |
//! |                  | TimePort           | ESP32 system timer          |
//! | `gpio_indicator` | IndicatorPort      | any `OutputPin`             |
//! | `log_sink`       | EventSink          | Serial log output           |
//! | `tcp_link`       | NetworkPort        | lwIP / `std::net` sockets   |
//! |                  | LinkPort           |                             |
//! | `time`           | TimePort           | ESP32 system timer          |
//! | `wifi`           | ConnectivityPort   | ESP-IDF WiFi STA            |

pub mod board;
pub mod gpio_indicator;
pub mod log_sink;
pub mod tcp_link;
pub mod time;
pub mod wifi;

