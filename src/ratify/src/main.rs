#[macro_use]
extern crate log;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use ratify::{
    DatabaseHandler, EstimatorSettings, ProgressSource, Ratify, SearchHealthRecords,
    SymptomRating, SymptomRatings,
    codec::{AccelerometerTrace, FrameSampler, ImageSequence},
};

#[derive(Parser)]
pub struct RatifyCli {
    #[arg(env, long)]
    pub database_url: Option<String>,
    /// Milliseconds between sampled frames
    #[arg(long, default_value_t = FrameSampler::FRAME_INTERVAL_MS)]
    pub frame_interval_ms: u64,
    /// Most frames sampled per clip, capped at the default of 200
    #[arg(long, default_value_t = FrameSampler::MAX_FRAMES)]
    pub max_frames: usize,
    /// Seconds of accelerometer data a trace covers
    #[arg(long, default_value_t = 45.0)]
    pub collection_window: f64,
    #[clap(subcommand)]
    pub subcommand: RatifyCommand,
}

#[derive(Subcommand)]
pub enum RatifyCommand {
    ///
    /// Estimate heart rate from a directory of fingertip video frames
    ///
    HeartRate {
        #[command(flatten)]
        frames: FrameArgs,
    },
    ///
    /// Estimate respiratory rate from accelerometer recordings
    ///
    RespiratoryRate {
        #[command(flatten)]
        trace: TraceArgs,
    },
    ///
    /// Measure both vitals, optionally saving them with symptoms
    ///
    Measure {
        #[command(flatten)]
        frames: FrameArgs,
        #[command(flatten)]
        trace: TraceArgs,
        #[arg(long)]
        save: bool,
        /// Symptom severity as `name=rating`, rating between 0 and 5
        #[arg(long = "symptom")]
        symptoms: Vec<SymptomRating>,
    },
    ///
    /// List saved health records
    ///
    Records {
        #[arg(long)]
        from: Option<NaiveDateTime>,
        #[arg(long)]
        to: Option<NaiveDateTime>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    ///
    /// Delete every saved health record
    ///
    DeleteRecords,
}

#[derive(Args)]
pub struct FrameArgs {
    /// Directory of frame images (PNG, JPEG, PPM, ...)
    #[arg(long)]
    pub frames: Option<PathBuf>,
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,
}

impl FrameArgs {
    fn open(&self, sampler: &FrameSampler) -> Option<ProgressSource<ImageSequence>> {
        let dir = self.frames.as_ref()?;
        match ImageSequence::open(dir, self.fps) {
            Ok(sequence) => {
                info!("Reading {} frames from {}", sequence.len(), dir.display());
                Some(ProgressSource::new(sequence, sampler))
            }
            Err(error) => {
                error!("Could not open {}: {}", dir.display(), error);
                None
            }
        }
    }
}

#[derive(Args)]
pub struct TraceArgs {
    #[arg(long)]
    pub accel_x: Option<PathBuf>,
    #[arg(long)]
    pub accel_y: Option<PathBuf>,
    #[arg(long)]
    pub accel_z: Option<PathBuf>,
    /// Use a synthetic breathing trace when no recording can be read
    #[arg(long)]
    pub simulate: bool,
}

impl TraceArgs {
    const SIMULATED_SAMPLES: usize = 1000;

    fn load(&self) -> AccelerometerTrace {
        let trace = match (&self.accel_x, &self.accel_y, &self.accel_z) {
            (Some(x), Some(y), Some(z)) => AccelerometerTrace::from_files(x, y, z)
                .inspect_err(|error| error!("Could not read accelerometer trace: {error}"))
                .unwrap_or_default(),
            _ => AccelerometerTrace::default(),
        };

        if trace.is_empty() && self.simulate {
            info!("Using a simulated accelerometer trace");
            return AccelerometerTrace::simulated(&mut rand::rng(), Self::SIMULATED_SAMPLES);
        }

        trace
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(error) = dotenv() {
        println!("{}", error);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("sqlx::query", log::LevelFilter::Off)
        .filter_module("sea_orm_migration::migrator", log::LevelFilter::Off)
        .init();

    let cli = RatifyCli::parse();

    let mut settings = EstimatorSettings::with_frame_interval(cli.frame_interval_ms)
        .with_max_frames(cli.max_frames);
    settings.respiration.collection_window_secs = cli.collection_window;
    let sampler = FrameSampler::new(settings.sampler);

    let mut ratify = Ratify::new(settings);
    if let Some(url) = cli.database_url {
        ratify = ratify.with_database(DatabaseHandler::new(url).await?);
    }

    match cli.subcommand {
        RatifyCommand::HeartRate { frames } => {
            let bpm = ratify.measure_heart_rate(frames.open(&sampler)).await;
            println!("Heart rate: {} BPM", bpm);
            Ok(())
        }
        RatifyCommand::RespiratoryRate { trace } => {
            let bpm = ratify.measure_respiratory_rate(trace.load()).await;
            println!("Respiratory rate: {} BPM", bpm);
            Ok(())
        }
        RatifyCommand::Measure {
            frames,
            trace,
            save,
            symptoms,
        } => {
            let vitals = ratify.measure(frames.open(&sampler), trace.load()).await;
            println!("Heart rate: {} BPM", vitals.heart_rate);
            println!("Respiratory rate: {} BPM", vitals.respiratory_rate);

            if save {
                let symptoms = symptoms.into_iter().collect::<SymptomRatings>();
                let record = ratify.record(vitals, symptoms).await?;
                println!("Saved: {}", record);
            }
            Ok(())
        }
        RatifyCommand::Records {
            from,
            to,
            limit,
            json,
        } => {
            let records = ratify
                .database()?
                .search_health_records(SearchHealthRecords { from, to, limit })
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No records");
            } else {
                for record in records {
                    println!("{}", record);
                }
            }
            Ok(())
        }
        RatifyCommand::DeleteRecords => {
            let deleted = ratify.database()?.delete_all_health_records().await?;
            println!("Deleted {} records", deleted);
            Ok(())
        }
    }
}
