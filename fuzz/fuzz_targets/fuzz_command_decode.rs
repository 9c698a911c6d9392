//! Fuzz target: `Command::decode`
//!
//! Feeds arbitrary receive chunks through the command decoder and checks
//! that only the exact literals are recognised and that unknown chunks
//! are kept within the receive buffer size.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensorlink::app::commands::{Command, RX_BUFFER_LEN};

fuzz_target!(|data: &[u8]| {
    match Command::decode(data) {
        Command::Start => assert_eq!(data, Command::START),
        Command::Stop => assert_eq!(data, Command::STOP),
        Command::Unknown(bytes) => {
            assert!(data != Command::START && data != Command::STOP);
            assert!(bytes.len() <= RX_BUFFER_LEN);
            assert_eq!(&bytes[..], &data[..data.len().min(RX_BUFFER_LEN)]);
        }
    }
});
