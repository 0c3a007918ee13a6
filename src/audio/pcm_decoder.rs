use std::path::Path;

use super::symphonia_backend::decode_file;
use super::{Decoder, PcmBuffer};
use crate::error::Result;

/// Decoder for plain audio containers (`.wav`, `.mp3`).
pub struct PcmDecoder;

impl Decoder for PcmDecoder {
    fn decode(&self, path: &Path) -> Result<PcmBuffer> {
        decode_file(path)
    }
}
