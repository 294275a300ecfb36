// Unit tests for domain rules

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::domain::rules::*;

    fn seg(text: &str, start: f64, end: f64) -> Segment {
        Segment::new(text, start, end)
    }

    fn texts(segments: &[Segment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("  Hello,   WORLD!! it's 3pm "), "hello world it s 3pm");
        assert_eq!(normalize("¿qué?"), "qu");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_similarity_ratio_known_values() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
        assert_eq!(similarity_ratio("abcd", "abcd"), 1.0);
        // "abcd" vs "bcde": single block "bcd"
        assert!((similarity_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        // "a b c" vs "a b c d": block of 5 over 12 chars
        assert!((similarity_ratio("a b c", "a b c d") - 10.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_ratio_recurses_on_both_sides() {
        // Blocks "ab" and "ef" around a differing middle
        assert!((similarity_ratio("abXef", "abYef") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_is_duplicate_identical_and_unrelated() {
        assert!(is_duplicate("hello there", "hello there", 0.85));
        assert!(!is_duplicate(
            "completely different phrase",
            "another unrelated sentence",
            0.85
        ));
    }

    #[test]
    fn test_is_duplicate_empty_inputs() {
        assert!(is_duplicate("", "", 0.85));
        assert!(is_duplicate("...", "  ", 1.0));
        assert!(!is_duplicate("", "something", 0.85));
        assert!(!is_duplicate("something", "!!", 0.85));
    }

    #[test]
    fn test_is_duplicate_truncated_restart() {
        // Low ratio but the short take is a prefix of the long one
        assert!(is_duplicate(
            "I think that we",
            "I think that we should really ship the release on friday",
            0.85
        ));
    }

    #[test]
    fn test_dedupe_chained_grouping_keeps_last() {
        let segments = vec![seg("a b c", 0.0, 1.0), seg("a b c d", 1.0, 2.0), seg("xyz", 2.0, 3.0)];
        let kept = dedupe(&segments, 0.8);
        assert_eq!(texts(&kept), vec!["a b c d", "xyz"]);
    }

    #[test]
    fn test_dedupe_chain_follows_last_member() {
        // First and last differ, but each neighbour pair is a duplicate
        let segments = vec![
            seg("we should go", 0.0, 1.0),
            seg("we should go now", 1.0, 2.0),
            seg("we should go now please", 2.0, 3.0),
        ];
        let groups = duplicate_groups(&segments, 0.85);
        assert_eq!(groups, vec![0..3]);
        assert_eq!(texts(&dedupe(&segments, 0.85)), vec!["we should go now please"]);
    }

    #[test]
    fn test_dedupe_preserves_order_and_never_grows() {
        let segments = vec![
            seg("intro", 0.0, 1.0),
            seg("the main point", 1.0, 2.0),
            seg("The main point!", 2.0, 3.0),
            seg("outro", 3.0, 4.0),
        ];
        for threshold in [0.0, 0.5, 0.85, 1.0] {
            let kept = dedupe(&segments, threshold);
            assert!(kept.len() <= segments.len());
            let starts: Vec<f64> = kept.iter().map(|s| s.start).collect();
            let mut sorted = starts.clone();
            sorted.sort_by(f64::total_cmp);
            assert_eq!(starts, sorted);
        }
        assert_eq!(
            texts(&dedupe(&segments, 0.85)),
            vec!["intro", "The main point!", "outro"]
        );
    }

    #[test]
    fn test_dedupe_empty_input() {
        assert!(dedupe(&[], 0.85).is_empty());
    }

    #[test]
    fn test_cumulative_starts_and_captions() {
        let segments = vec![seg(" one ", 10.0, 12.0), seg("two", 20.0, 23.5), seg("three", 30.0, 31.0)];
        let starts = cumulative_starts(&segments);
        assert_eq!(starts, vec![0.0, 2.0, 5.5]);

        let overlays = build_captions(&segments, &starts, 32);
        assert_eq!(overlays.len(), 3);
        assert_eq!(overlays[0].text, "one");
        for (overlay, (segment, start)) in overlays.iter().zip(segments.iter().zip(&starts)) {
            assert_eq!(overlay.start_time, *start);
            assert_eq!(overlay.duration, segment.end - segment.start);
            assert_eq!(overlay.layout.font_size, 32);
        }
        for pair in overlays.windows(2) {
            assert!(pair[0].end_time() <= pair[1].start_time);
        }
    }

    #[test]
    fn test_split_point_interpolation() {
        let segments = vec![seg("we need coffee now.", 10.0, 14.0)];
        let points = find_split_points(&segments, &["coffee".to_string()]);
        assert_eq!(points.len(), 1);
        assert!((points[0].split_time - (10.0 + 4.0 * 8.0 / 19.0)).abs() < 1e-9);
        assert!((points[0].split_time - 11.684).abs() < 1e-3);
        assert_eq!(points[0].segment_start, 10.0);
        assert_eq!(points[0].segment_end, 14.0);
    }

    #[test]
    fn test_split_point_case_insensitive_segment_match() {
        let segments = vec![seg("Coffee first", 0.0, 2.0)];
        let points = find_split_points(&segments, &["coffee".to_string()]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].split_time, 0.0);
    }

    #[test]
    fn test_split_point_uses_word_timings() {
        let segment = seg("we need coffee now", 10.0, 14.0).with_words(vec![
            WordTiming { word: " we".into(), start: 10.0, end: 10.3 },
            WordTiming { word: " need".into(), start: 10.3, end: 10.9 },
            WordTiming { word: " coffee".into(), start: 11.2, end: 11.8 },
            WordTiming { word: " now".into(), start: 11.9, end: 12.4 },
        ]);
        let points = find_split_points(&[segment], &["coffee".to_string()]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].split_time, 11.2);
    }

    #[test]
    fn test_split_point_falls_back_when_no_word_matches() {
        // Word matching is case-sensitive, so " Coffee" does not match "coffee"
        let segment = seg("I like Coffee", 10.0, 14.0).with_words(vec![
            WordTiming { word: " I".into(), start: 10.0, end: 10.2 },
            WordTiming { word: " like".into(), start: 10.3, end: 10.8 },
            WordTiming { word: " Coffee".into(), start: 11.5, end: 12.1 },
        ]);
        let points = find_split_points(&[segment], &["coffee".to_string()]);
        assert_eq!(points.len(), 1);
        assert!((points[0].split_time - (10.0 + 4.0 * 7.0 / 13.0)).abs() < 1e-9);
        assert_ne!(points[0].split_time, 11.5);
    }

    #[test]
    fn test_split_point_repeated_keyword_yields_one_point() {
        let segments = vec![seg("tea then coffee then coffee", 0.0, 27.0)];
        let points = find_split_points(&segments, &["coffee".to_string()]);
        assert_eq!(points.len(), 1);
        assert!((points[0].split_time - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_points_multiple_keywords_sorted() {
        let segments = vec![
            seg("beach at sunset", 20.0, 24.0),
            seg("city lights and the beach", 2.0, 6.0),
            seg("nothing here", 8.0, 9.0),
        ];
        let keywords = vec!["beach".to_string(), "city".to_string()];
        let points = find_split_points(&segments, &keywords);
        let order: Vec<(&str, f64)> = points.iter().map(|p| (p.keyword.as_str(), p.split_time)).collect();
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], ("city", 2.0));
        assert_eq!(order[1].0, "beach");
        assert!(order[1].1 > 2.0 && order[1].1 < 6.0);
        assert_eq!(order[2], ("beach", 20.0));
    }

    #[test]
    fn test_fit_within_frame() {
        let frame = FrameSize::new(1920, 1080);
        // Portrait clip: height limits
        assert_eq!(fit_within_frame(FrameSize::new(1080, 1920), frame), FrameSize::new(607, 1080));
        // Ultra-wide clip: width limits
        assert_eq!(fit_within_frame(FrameSize::new(2560, 1080), frame), FrameSize::new(1920, 810));
        // Same aspect ratio fills exactly
        assert_eq!(fit_within_frame(FrameSize::new(1280, 720), frame), frame);
    }

    #[test]
    fn test_sanitize_keyword() {
        assert_eq!(sanitize_keyword("Coffee Shop"), "coffee_shop");
        assert_eq!(sanitize_keyword("../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_keyword("  city!  "), "city");
    }
}
