// Keyword timeline resolution for B-roll placement

use crate::domain::model::{Segment, SplitPoint};

/// Resolve the instant each keyword is spoken, sorted by split time
///
/// Matching is case-insensitive on segment text. When word timings exist
/// the start of the first word containing the keyword (case-sensitive)
/// wins; otherwise the time is interpolated from the keyword's character
/// offset within the raw segment text.
pub fn find_split_points(segments: &[Segment], keywords: &[String]) -> Vec<SplitPoint> {
    let mut points = Vec::new();

    for segment in segments {
        let lowered = segment.text.to_lowercase();

        for keyword in keywords {
            let needle = keyword.to_lowercase();
            if needle.is_empty() || !lowered.contains(&needle) {
                continue;
            }

            let split_time = word_start(segment, keyword)
                .unwrap_or_else(|| interpolated_time(segment, &needle));

            points.push(SplitPoint {
                keyword: keyword.clone(),
                segment_start: segment.start,
                segment_end: segment.end,
                split_time,
            });
        }
    }

    points.sort_by(|a, b| a.split_time.total_cmp(&b.split_time));
    points
}

fn word_start(segment: &Segment, keyword: &str) -> Option<f64> {
    segment
        .word_timings()?
        .iter()
        .find(|word| word.word.contains(keyword))
        .map(|word| word.start)
}

fn interpolated_time(segment: &Segment, needle: &str) -> f64 {
    let text = segment.text.trim();
    let total_chars = text.chars().count();
    if total_chars == 0 {
        return segment.start;
    }

    let lowered = text.to_lowercase();
    let char_index = lowered
        .find(needle)
        .map(|byte_index| lowered[..byte_index].chars().count())
        .unwrap_or(0);

    segment.start + segment.duration() * (char_index as f64 / total_chars as f64)
}

/// Reduce a keyword to a filesystem-safe, lowercase token for asset lookup
pub fn sanitize_keyword(keyword: &str) -> String {
    let replaced: String = keyword
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    replaced
        .trim_matches(|c| c == '.' || c == '_')
        .to_lowercase()
}
