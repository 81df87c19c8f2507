use crate::LARGE_FILE_THRESHOLD;

/// How a file is delivered, chosen once per request from its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStrategy {
    /// Read, seal and encode the whole file in memory; one response body.
    Buffered,
    /// Read, seal, encode and send one chunk at a time.
    Streamed,
}

impl DeliveryStrategy {
    pub fn select(size: u64) -> Self {
        Self::select_with_threshold(size, LARGE_FILE_THRESHOLD)
    }

    pub fn select_with_threshold(size: u64, threshold: u64) -> Self {
        if size <= threshold {
            DeliveryStrategy::Buffered
        } else {
            DeliveryStrategy::Streamed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStrategy::Buffered => "buffered",
            DeliveryStrategy::Streamed => "streamed",
        }
    }
}

impl std::fmt::Display for DeliveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
