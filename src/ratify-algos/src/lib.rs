#[macro_use]
extern crate log;

mod error;
pub use error::EstimateError;

pub(crate) mod ppg;
pub use ppg::PpgExtractor;

pub(crate) mod heart_rate;
pub use heart_rate::{HeartRateConfig, HeartRateEstimator};

pub(crate) mod respiration;
pub use respiration::{RespirationConfig, RespiratoryRateEstimator};

pub(crate) mod fallback;
pub use fallback::{FallbackConfig, FallbackGenerator};

pub mod helpers;
