//! Cutaway compositing

use std::path::Path;

use crate::domain::model::BrollPlacement;
use crate::engine::{secs, strings, EncodeSettings, FfmpegJob, JobInput};

/// Overlay each placement, fitted and padded to the main frame, at its split time
///
/// With no placements the input is stream-copied unchanged.
pub fn composite_job(input: &Path, placements: &[BrollPlacement], encode: &EncodeSettings) -> FfmpegJob {
    let mut inputs = vec![JobInput::plain(input)];

    if placements.is_empty() {
        return FfmpegJob {
            inputs,
            filter_graph: None,
            output_args: strings(&["-map", "0", "-c", "copy"]),
            scratch_files: Vec::new(),
        };
    }

    let mut graph = Vec::with_capacity(placements.len() * 2);
    let mut base = "0:v".to_string();

    for (i, placement) in placements.iter().enumerate() {
        inputs.push(JobInput::with_options(
            &placement.clip_path,
            vec!["-t".to_string(), secs(placement.duration)],
        ));

        let fade = placement.fade.min(placement.duration / 2.0);
        let fade_out_at = (placement.duration - fade).max(0.0);

        graph.push(format!(
            "[{input}:v]trim=duration={dur},setpts=PTS-STARTPTS,scale={fw}:{fh},\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black,setsar=1,format=yuva420p,\
             fade=t=in:st=0:d={fade}:alpha=1,fade=t=out:st={out}:d={fade}:alpha=1,\
             setpts=PTS+{start}/TB[b{i}]",
            input = i + 1,
            dur = secs(placement.duration),
            fw = placement.fitted.width,
            fh = placement.fitted.height,
            w = placement.frame.width,
            h = placement.frame.height,
            fade = secs(fade),
            out = secs(fade_out_at),
            start = secs(placement.start_time),
            i = i,
        ));

        let label = if i + 1 == placements.len() {
            "outv".to_string()
        } else {
            format!("ov{}", i)
        };
        graph.push(format!(
            "[{base}][b{i}]overlay=0:0:eof_action=pass:enable='between(t,{from},{to})'[{label}]",
            base = base,
            i = i,
            from = secs(placement.start_time),
            to = secs(placement.start_time + placement.duration),
            label = label,
        ));
        base = label;
    }

    let mut output_args = strings(&["-map", "[outv]", "-map", "0:a?"]);
    output_args.extend(encode.av_args());

    FfmpegJob {
        inputs,
        filter_graph: Some(graph.join(";\n")),
        output_args,
        scratch_files: Vec::new(),
    }
}
