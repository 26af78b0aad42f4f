//! Synoptic feature detection on gridded fields

pub mod cutoff;
pub mod jet;

// Re-export main types
pub use cutoff::{
    detect_cutoff_low, detect_cutoff_low_with_threshold, track_cutoff_reattachment, Centroid,
    CutoffDetection, ReattachmentTrack,
};
pub use jet::{track_jet_stream, JetAxisPoint, JetStreamTrack};
