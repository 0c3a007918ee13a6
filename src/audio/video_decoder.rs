use std::path::Path;

use super::symphonia_backend::decode_file;
use super::{Decoder, PcmBuffer};
use crate::error::Result;

/// Decoder for video containers (`.mov`, `.mp4`, `.avi`, `.flv`, `.mkv`);
/// extracts the first audio track via the same probing path as
/// [`super::pcm_decoder::PcmDecoder`]. Only invoked for query inputs — the
/// candidate directory scan only ever yields `.wav` files, an asymmetry
/// preserved from the original tool.
pub struct VideoDecoder;

impl Decoder for VideoDecoder {
    fn decode(&self, path: &Path) -> Result<PcmBuffer> {
        decode_file(path)
    }
}
