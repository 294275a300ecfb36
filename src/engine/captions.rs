//! Caption burn-in via drawtext

use std::path::Path;

use crate::domain::model::{CaptionOverlay, MediaProbe};
use crate::engine::{escape_filter_value, secs, EncodeSettings, FfmpegJob, JobInput, ScratchFile};

/// Average glyph width relative to the font size, for line wrapping
const GLYPH_WIDTH_FACTOR: f64 = 0.55;

/// Draw every overlay on the bottom of the frame during its own time window
///
/// Windows are half-open (`start <= t < end`) so back-to-back captions never
/// share a frame. Caption text goes through files in `scratch` so it never needs escaping.
pub fn burn_job(
    input: &Path,
    overlays: &[CaptionOverlay],
    probe: &MediaProbe,
    font: &str,
    scratch: &Path,
    encode: &EncodeSettings,
) -> FfmpegJob {
    let mut scratch_files = Vec::with_capacity(overlays.len());
    let mut filters = Vec::with_capacity(overlays.len());

    for (i, overlay) in overlays.iter().enumerate() {
        let layout = overlay.layout;
        let max_chars = chars_per_line(layout.max_width(probe.frame), layout.font_size);
        let text_path = scratch.join(format!("caption_{}.txt", i));

        scratch_files.push(ScratchFile {
            path: text_path.clone(),
            contents: wrap_text(&overlay.text, max_chars),
        });

        filters.push(format!(
            "drawtext=font={}:textfile={}:fontsize={}:fontcolor=white:borderw=1:bordercolor=black:\
             line_spacing=4:x=(w-text_w)/2:y=h-text_h-{}:enable='gte(t,{})*lt(t,{})'",
            escape_filter_value(font),
            escape_filter_value(&text_path.to_string_lossy()),
            layout.font_size,
            layout.bottom_margin(probe.frame),
            secs(overlay.start_time),
            secs(overlay.end_time()),
        ));
    }

    let chain = if filters.is_empty() {
        "null".to_string()
    } else {
        filters.join(",")
    };

    let mut output_args = vec![
        "-map".to_string(),
        "[outv]".to_string(),
        "-map".to_string(),
        "0:a?".to_string(),
    ];
    output_args.extend(encode.av_args());

    FfmpegJob {
        inputs: vec![JobInput::plain(input)],
        filter_graph: Some(format!("[0:v]{}[outv]", chain)),
        output_args,
        scratch_files,
    }
}

/// How many average glyphs fit in `max_width` pixels
pub fn chars_per_line(max_width: u32, font_size: u32) -> usize {
    let glyph = (font_size.max(1) as f64 * GLYPH_WIDTH_FACTOR).max(1.0);
    ((max_width as f64 / glyph) as usize).max(1)
}

/// Greedy word wrap; words longer than a line stay on their own line
pub fn wrap_text(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}
