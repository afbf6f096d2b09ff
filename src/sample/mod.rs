//! Sample domain and suites shipped with the crate.

pub mod ratio;
pub mod suites;

pub use ratio::{Ratio, RatioError};
pub use suites::{LoopingSuite, RatioSuite, SleepySuite};
