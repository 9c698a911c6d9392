//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific layer of the
//! link core against mock adapters.  All tests run on the host (x86_64)
//! with a virtual clock and no real sockets.

mod session_tests;
mod supervisor_tests;
