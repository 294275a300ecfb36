// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::errors::*;
    use crate::domain::model::*;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn test_segment_duration() {
        let segment = Segment::new("hello", 1.5, 4.0);
        assert_eq!(segment.duration(), 2.5);
        assert!(segment.word_timings().is_none());
    }

    #[test]
    fn test_segment_empty_words_treated_as_absent() {
        let segment = Segment::new("hello", 0.0, 1.0).with_words(Vec::new());
        assert!(segment.word_timings().is_none());
    }

    #[test]
    fn test_segment_deserializes_avg_logprob_as_confidence() {
        let segment: Segment = serde_json::from_value(json!({
            "text": " hi",
            "start": 0.0,
            "end": 1.0,
            "avg_logprob": -0.25
        }))
        .unwrap();
        assert_eq!(segment.confidence, Some(-0.25));
        assert!(segment.words.is_none());
    }

    #[test]
    fn test_tool_kind_round_trip_names() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.as_str().parse::<ToolKind>().unwrap(), kind);
        }
        assert_eq!(ToolKind::AddBroll.title(), "Add Broll");
        assert_eq!(ToolKind::RemoveDuplicates.title(), "Remove Duplicates");
    }

    #[test]
    fn test_tool_kind_unknown_name() {
        let err = "sharpen".parse::<ToolKind>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownTool { ref name } if name == "sharpen"));
    }

    #[test]
    fn test_step_args_accessors() {
        let args = StepArgs::new()
            .with("threshold", "0.9")
            .with("font_size", 32)
            .with("keywords", "coffee, beach ,coffee")
            .with("empty", "  ")
            .with("zero", 0);

        assert_eq!(args.f64("threshold"), Some(0.9));
        assert_eq!(args.u32("font_size"), Some(32));
        assert_eq!(args.string_list("keywords"), vec!["coffee", "beach"]);
        assert_eq!(args.str("empty"), None);
        assert_eq!(args.nonzero_f64("zero"), None);
        assert_eq!(args.u32("missing"), None);
    }

    #[test]
    fn test_step_args_keyword_array() {
        let args: StepArgs = serde_json::from_value(json!({"keywords": ["sunset", 3, "city"]})).unwrap();
        assert_eq!(args.string_list("keywords"), vec!["sunset", "city"]);
    }

    #[test]
    fn test_task_status_wire_format() {
        assert_eq!(serde_json::to_value(TaskStatus::Step(2)).unwrap(), json!("step_2"));
        assert_eq!(serde_json::to_value(TaskStatus::Processing).unwrap(), json!("processing"));

        let parsed: TaskStatus = serde_json::from_value(json!("step_11")).unwrap();
        assert_eq!(parsed, TaskStatus::Step(11));
        assert!(serde_json::from_value::<TaskStatus>(json!("step_x")).is_err());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Step(0).is_terminal());
    }

    #[test]
    fn test_artifact_descriptor_fields() {
        let descriptor = ArtifactDescriptor::new(
            "abc",
            ToolKind::AddCaptions,
            Path::new("processed/abc/processed_talk_add_captions.mp4"),
            vec![ToolKind::RemoveDuplicates, ToolKind::AddCaptions],
            false,
        );
        assert_eq!(descriptor.output_filename, "processed_talk_add_captions.mp4");
        assert_eq!(
            descriptor.download_url,
            "/api/files/download/abc/processed_talk_add_captions.mp4"
        );
        assert_eq!(descriptor.message, "Add Captions completed");
        assert_eq!(descriptor.output_type, "add_captions_video");

        let cached = ArtifactDescriptor::new("abc", ToolKind::AddMusic, Path::new("x.mp4"), vec![], true);
        assert_eq!(cached.message, "Add Music (cached)");
    }

    #[test]
    fn test_caption_layout_geometry() {
        let layout = CaptionLayout::with_font_size(40);
        let frame = FrameSize::new(1920, 1080);
        assert_eq!(layout.max_width(frame), 1728);
        assert_eq!(layout.bottom_margin(frame), 86);
    }

    #[test]
    fn test_edit_request_validation() {
        let mut request = EditRequest {
            instruction: "remove repeats and add captions".to_string(),
            file_id: "f1".to_string(),
            filename: Some("talk.mp4".to_string()),
            music_file_id: None,
            music_filename: None,
            style_preference: Some("vlog".to_string()),
            output_format: Some("mp4".to_string()),
        };
        assert!(request.validate().is_ok());

        request.instruction = "hey".to_string();
        assert!(matches!(request.validate(), Err(DomainError::InvalidRequest(_))));

        request.instruction = "add captions please".to_string();
        request.style_preference = Some("noir".to_string());
        assert!(request.validate().is_err());

        request.style_preference = None;
        request.file_id = "x".repeat(65);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_file_version_record_applied_steps() {
        let record = FileVersionRecord {
            source_file_id: "f".to_string(),
            latest_artifact_path: "out.mp4".into(),
            derived_segments_path: None,
            applied_steps: vec![ToolKind::RemoveDuplicates, ToolKind::AddMusic],
            updated_at: chrono::Utc::now(),
        };
        assert!(record.has_applied(ToolKind::AddMusic));
        assert!(!record.has_applied(ToolKind::AddBroll));
        assert_eq!(record.last_step(), Some(ToolKind::AddMusic));
    }
}
