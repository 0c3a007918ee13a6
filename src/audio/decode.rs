//! Decoder registry: maps a file extension to the concrete [`Decoder`] that
//! should handle it, per the external decoder contract.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::audio::{pcm_decoder::PcmDecoder, video_decoder::VideoDecoder, Decoder, PcmBuffer};
use crate::error::{MatchError, Result};

pub const QUERY_EXTENSIONS: &[&str] = &["wav", "mp3", "mov", "mp4", "avi", "flv", "mkv"];
pub const CANDIDATE_EXTENSIONS: &[&str] = &["wav"];

/// Registry of decoders, keyed by lowercase extension (without the dot).
pub struct DecoderRegistry {
    decoders: HashMap<&'static str, Arc<dyn Decoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        let pcm: Arc<dyn Decoder> = Arc::new(PcmDecoder);
        let video: Arc<dyn Decoder> = Arc::new(VideoDecoder);

        let mut decoders: HashMap<&'static str, Arc<dyn Decoder>> = HashMap::new();
        decoders.insert("wav", pcm.clone());
        decoders.insert("mp3", pcm);
        for ext in ["mov", "mp4", "avi", "flv", "mkv"] {
            decoders.insert(ext, video.clone());
        }

        Self { decoders }
    }

    pub fn decode(&self, path: &Path) -> Result<PcmBuffer> {
        if !path.exists() {
            return Err(MatchError::InputUnavailable {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let decoder = self.decoders.get(ext.as_str()).ok_or_else(|| {
            MatchError::InputUnavailable {
                path: path.to_path_buf(),
                reason: format!("unsupported extension: .{ext}"),
            }
        })?;

        decoder.decode(path)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_file() {
        let registry = DecoderRegistry::new();
        let err = registry
            .decode(Path::new("does_not_exist.wav"))
            .unwrap_err();
        assert!(matches!(err, MatchError::InputUnavailable { .. }));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let registry = DecoderRegistry::new();
        let path = std::env::temp_dir().join("audio-clip-finder-test.xyz");
        std::fs::write(&path, b"not audio").unwrap();
        let err = registry.decode(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, MatchError::InputUnavailable { .. }));
    }
}
