//! Adapters implementing the application ports

mod random;
mod reqwest_forwarder;
mod usage_recorder;

pub use random::{SeededRandom, ThreadRandom};
pub use reqwest_forwarder::{ReqwestForwarder, end_to_end_headers};
pub use usage_recorder::{ChannelUsageRecorder, DiscardUsageRecorder};
