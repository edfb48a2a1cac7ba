//! Test harness for perfkit compositions.

mod robot;
mod testing;

pub use robot::Robot;
pub use testing::{run_test_composition, TestRule};
