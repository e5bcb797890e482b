//! Stream identity and observation log header.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one tracked video stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(pub String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Header written as the first line of an observation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamHeader {
    /// Log schema version.
    pub schema_version: String,

    /// Stream the log belongs to.
    pub stream_id: StreamId,

    /// Sampling raster width.
    pub raster_width: u32,

    /// Sampling raster height.
    pub raster_height: u32,

    /// Configured sample rate when the log was opened.
    pub fps: f64,

    /// Wall-clock time the stream was attached (RFC 3339).
    pub attached_wall: String,
}

impl StreamHeader {
    pub const SCHEMA_VERSION: &'static str = "1.0";
}
