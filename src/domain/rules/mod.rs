// Domain rules - Segment-level algorithms and policies

pub mod captions;
pub mod dedupe;
pub mod framing;
pub mod keywords;

pub use captions::{build_captions, cumulative_starts};
pub use dedupe::{dedupe, duplicate_groups, is_duplicate, normalize, similarity_ratio};
pub use framing::fit_within_frame;
pub use keywords::{find_split_points, sanitize_keyword};

/// Default similarity threshold for duplicate detection
pub const DEFAULT_DUP_THRESHOLD: f64 = 0.85;

/// Minimum share of the shorter phrase that a common prefix must cover
pub const PREFIX_OVERLAP_THRESHOLD: f64 = 0.8;

/// Default caption font size in points
pub const DEFAULT_FONT_SIZE: u32 = 28;

/// Default background music volume factor
pub const DEFAULT_MUSIC_VOLUME: f64 = 0.3;

/// Longest stretch of a cutaway clip placed over the main track
pub const BROLL_CLIP_SECONDS: f64 = 3.0;

/// Fade-in/fade-out length applied to cutaway clips
pub const BROLL_FADE_SECONDS: f64 = 0.3;

#[cfg(test)]
mod tests;
