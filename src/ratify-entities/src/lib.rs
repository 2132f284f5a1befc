pub mod prelude;

pub mod health_records;
