// Caption timeline reconstruction

use crate::domain::model::{CaptionLayout, CaptionOverlay, Segment};

/// Start of each segment once the video is cut down to exactly these segments
pub fn cumulative_starts(segments: &[Segment]) -> Vec<f64> {
    let mut elapsed = 0.0;
    segments
        .iter()
        .map(|segment| {
            let start = elapsed;
            elapsed += segment.duration();
            start
        })
        .collect()
}

/// One overlay per segment, placed at `new_starts[i]` for the segment's own duration
pub fn build_captions(segments: &[Segment], new_starts: &[f64], font_size: u32) -> Vec<CaptionOverlay> {
    let layout = CaptionLayout::with_font_size(font_size);

    segments
        .iter()
        .zip(new_starts)
        .map(|(segment, &start_time)| CaptionOverlay {
            text: segment.text.trim().to_string(),
            start_time,
            duration: segment.duration(),
            layout,
        })
        .collect()
}
