#[macro_use]
extern crate log;

mod error;
pub use error::CodecError;

mod frame;
pub use frame::{Frame, Rgb};

mod sampler;
pub use sampler::{FrameSampler, FrameSource, ImageSequence, SamplerConfig};

mod trace;
pub use trace::{AccelerometerTrace, parse_axis};
