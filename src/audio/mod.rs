pub mod decode;
pub mod pcm_decoder;
mod symphonia_backend;
pub mod video_decoder;

use crate::error::{MatchError, Result};

/// Raw PCM samples decoded from a media file: `(n_samples, n_channels)`, interleaved
/// per-channel as separate vectors, plus the stream's sample rate.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    pub channels: Vec<Vec<f64>>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Validate the invariants the rest of the pipeline relies on.
    pub fn validate(self) -> Result<Self> {
        if self.sample_rate == 0 {
            return Err(MatchError::ParameterInvalid(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.channels.is_empty() || self.channels.iter().all(|c| c.is_empty()) {
            return Err(MatchError::ParameterInvalid(
                "decoded buffer has no samples".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Decoder adapter contract: opens a media file and returns raw PCM.
///
/// Concrete decoders are registered by file extension; the rest of the engine
/// depends only on this trait, never on a specific decoding backend.
pub trait Decoder: Send + Sync {
    fn decode(&self, path: &std::path::Path) -> Result<PcmBuffer>;
}
