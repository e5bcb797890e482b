//! TrustCall Signal Model
//!
//! Defines the data contracts shared by the analysis pipeline:
//! - **Raster:** Fixed-size RGBA frames and their luma projections
//! - **Observation:** One sample's sub-scores and the fused result
//! - **Weights:** Fusion weights and their audio-less redistribution
//! - **Stream:** Stream identity and the JSONL log header
//!
//! All sub-scores are normalized to `[0.0, 1.0]`; fused scores are on a
//! `[0, 100]` scale.

pub mod observation;
pub mod raster;
pub mod stream;
pub mod weights;

pub use observation::*;
pub use raster::*;
pub use stream::*;
pub use weights::*;
