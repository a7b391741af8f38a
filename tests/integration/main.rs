//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no real GPIO or
//! 1-Wire bus.

mod controller_tests;
mod file_adapter_tests;
mod mock_hw;
