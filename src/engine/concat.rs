//! Segment cut: keep the listed time ranges and join them back to back

use std::path::Path;

use crate::domain::model::Segment;
use crate::engine::{secs, EncodeSettings, FfmpegJob, JobInput};

/// Trim each segment out of the input and concatenate the pieces in order
pub fn cut_job(input: &Path, segments: &[Segment], has_audio: bool, encode: &EncodeSettings) -> FfmpegJob {
    let mut chains = Vec::with_capacity(segments.len() * 2 + 1);
    let mut concat_inputs = String::new();

    for (i, segment) in segments.iter().enumerate() {
        let range = format!("start={}:end={}", secs(segment.start), secs(segment.end));
        chains.push(format!("[0:v]trim={},setpts=PTS-STARTPTS[v{}]", range, i));
        concat_inputs.push_str(&format!("[v{}]", i));

        if has_audio {
            chains.push(format!("[0:a]atrim={},asetpts=PTS-STARTPTS[a{}]", range, i));
            concat_inputs.push_str(&format!("[a{}]", i));
        }
    }

    let mut output_args = vec!["-map".to_string(), "[outv]".to_string()];
    if has_audio {
        chains.push(format!(
            "{}concat=n={}:v=1:a=1[outv][outa]",
            concat_inputs,
            segments.len()
        ));
        output_args.extend(["-map".to_string(), "[outa]".to_string()]);
        output_args.extend(encode.av_args());
    } else {
        chains.push(format!("{}concat=n={}:v=1:a=0[outv]", concat_inputs, segments.len()));
        output_args.extend(encode.video_args());
    }

    FfmpegJob {
        inputs: vec![JobInput::plain(input)],
        filter_graph: Some(chains.join(";\n")),
        output_args,
        scratch_files: Vec::new(),
    }
}
