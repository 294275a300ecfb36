// Aspect-preserving fit of cutaway footage

use crate::domain::model::FrameSize;

/// Scale `clip` so its limiting dimension fills `frame`
///
/// The other axis ends up no larger than the frame and gets padded by the
/// renderer.
pub fn fit_within_frame(clip: FrameSize, frame: FrameSize) -> FrameSize {
    if clip.width == 0 || clip.height == 0 {
        return frame;
    }

    let width_ratio = frame.width as f64 / clip.width as f64;
    let height_ratio = frame.height as f64 / clip.height as f64;

    if width_ratio < height_ratio {
        FrameSize::new(frame.width, (clip.height as f64 * width_ratio) as u32)
    } else {
        FrameSize::new((clip.width as f64 * height_ratio) as u32, frame.height)
    }
}
