// Pre-download size check
//
// Unknown size always passes; only a known size above the threshold blocks.

use super::errors::DownloadError;
use super::models::StreamCandidate;

#[derive(Debug, Clone, Copy)]
pub struct SizeGuard {
    max_bytes: u64,
}

impl SizeGuard {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn check(&self, candidate: &StreamCandidate) -> Result<(), DownloadError> {
        match candidate.effective_size() {
            Some(size) if size > self.max_bytes => Err(DownloadError::SizeLimit {
                size_bytes: size,
                limit_bytes: self.max_bytes,
            }),
            _ => Ok(()),
        }
    }
}
