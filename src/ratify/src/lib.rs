#[macro_use]
extern crate log;

mod ratify;
pub use ratify::{EstimatorSettings, Ratify, VitalSigns, estimate_heart_rate};

mod progress;
pub use progress::ProgressSource;

pub use ratify_algos as algos;
pub use ratify_codec as codec;
pub use ratify_db::{
    DatabaseHandler, HealthRecord, SearchHealthRecords, Symptom, SymptomRating, SymptomRatings,
};
