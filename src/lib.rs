pub mod breathing;
pub mod capture;
pub mod config;
pub mod detector;
pub mod error;
pub mod filter;
pub mod frame;
pub mod intensity;
pub mod normalize;
pub mod output;
pub mod sampler;
pub mod sink;

pub use config::DetectorConfig;
pub use detector::{RespirationDetector, RespirationUpdate};
pub use error::RespirationError;
pub use filter::BandpassFilter;
pub use frame::FrameBuffer;
pub use sink::RespirationSink;
