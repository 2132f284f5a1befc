#[macro_use]
extern crate log;

mod db;
pub use db::DatabaseHandler;

mod symptoms;
pub use symptoms::{Symptom, SymptomRating, SymptomRatings};

mod type_impl;
pub use type_impl::health_record::{HealthRecord, SearchHealthRecords};
