//! Background music mix

use std::path::Path;

use crate::domain::model::MusicMix;
use crate::engine::{secs, strings, EncodeSettings, FfmpegJob, JobInput};

/// Lay the music under the existing audio; the video track is copied
pub fn mix_job(input: &Path, mix: &MusicMix, encode: &EncodeSettings) -> FfmpegJob {
    let music_options = if mix.loop_to.is_some() {
        strings(&["-stream_loop", "-1"])
    } else {
        Vec::new()
    };

    let mut music_chain = Vec::new();
    if let Some(volume) = mix.volume {
        music_chain.push(format!("volume={:.3}", volume));
    }
    if let Some(length) = mix.loop_to {
        music_chain.push(format!("atrim=end={},asetpts=PTS-STARTPTS", secs(length)));
    }
    if music_chain.is_empty() {
        music_chain.push("anull".to_string());
    }

    let mut graph = vec![format!("[1:a]{}[music]", music_chain.join(","))];
    let mut output_args = strings(&["-map", "0:v", "-map", "[outa]", "-c:v", "copy"]);

    if mix.video_has_audio {
        graph.push("[0:a][music]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[outa]".to_string());
    } else {
        graph.push("[music]anull[outa]".to_string());
        output_args.push("-shortest".to_string());
    }
    output_args.extend(encode.audio_args());
    if encode.faststart {
        output_args.extend(strings(&["-movflags", "+faststart"]));
    }

    FfmpegJob {
        inputs: vec![
            JobInput::plain(input),
            JobInput::with_options(&mix.music_path, music_options),
        ],
        filter_graph: Some(graph.join(";\n")),
        output_args,
        scratch_files: Vec::new(),
    }
}
