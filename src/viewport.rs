// Viewport - output rectangle selection and resize handling
//
// Decides where the game frame lands inside the window for each scaling
// mode, and tracks the clear countdown that repaints the window border
// after the rectangle moves.

use serde::{Deserialize, Serialize};

use crate::framebuffer::{VISIBLE_HEIGHT, VISIBLE_WIDTH};

/// Frames to clear the whole surface after the output rectangle changes,
/// covering every swapchain image plus settle time
pub const CLEAR_FRAMES: u32 = 60;

/// Integer pixel rectangle inside the window, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How the game frame is scaled into the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    /// Largest integer multiple that fits, nearest-neighbor
    PixelPerfect,
    /// Fill the window while keeping the 4:3 aspect ratio
    AspectFit,
    /// Aspect fit over a 2x pixel-doubled frame with linear magnification
    HqStretch,
}

impl ScalingMode {
    /// Next mode in the hotkey cycle
    pub fn cycle(self) -> Self {
        match self {
            ScalingMode::PixelPerfect => ScalingMode::AspectFit,
            ScalingMode::AspectFit => ScalingMode::HqStretch,
            ScalingMode::HqStretch => ScalingMode::PixelPerfect,
        }
    }

    /// Name shown in logs and the window title
    pub fn label(self) -> &'static str {
        match self {
            ScalingMode::PixelPerfect => "pixel-perfect",
            ScalingMode::AspectFit => "aspect-fit",
            ScalingMode::HqStretch => "hq-stretch",
        }
    }
}

impl Default for ScalingMode {
    fn default() -> Self {
        ScalingMode::AspectFit
    }
}

/// Largest rectangle with the frame's aspect ratio centered in the window
///
/// Compares the window's aspect ratio to the frame's and letterboxes on
/// the longer axis. Degenerate window sizes collapse to an empty rect at
/// the origin.
pub fn fit_rect_keep_ar(window_width: u32, window_height: u32) -> Rect {
    if window_width == 0 || window_height == 0 {
        return Rect::default();
    }

    let frame_ar = VISIBLE_WIDTH as f32 / VISIBLE_HEIGHT as f32;
    let window_ar = window_width as f32 / window_height as f32;

    let (width, height) = if window_ar > frame_ar {
        // window wider than the frame: pillarbox
        ((window_height as f32 * frame_ar) as u32, window_height)
    } else {
        // window taller than the frame: letterbox
        (window_width, (window_width as f32 / frame_ar) as u32)
    };

    Rect {
        x: (window_width - width) / 2,
        y: (window_height - height) / 2,
        width,
        height,
    }
}

/// Largest integer multiple of the frame that fits the window, minimum 1
pub fn max_integer_zoom(window_width: u32, window_height: u32) -> u32 {
    let zx = window_width / VISIBLE_WIDTH as u32;
    let zy = window_height / VISIBLE_HEIGHT as u32;
    zx.min(zy).max(1)
}

/// Integer-zoomed rectangle centered in the window
///
/// When even 1x does not fit, the rect overflows the window symmetrically;
/// clamping to the window is the scissor's job, not ours.
fn integer_rect(window_width: u32, window_height: u32) -> Rect {
    let zoom = max_integer_zoom(window_width, window_height);
    let width = VISIBLE_WIDTH as u32 * zoom;
    let height = VISIBLE_HEIGHT as u32 * zoom;

    Rect {
        x: window_width.saturating_sub(width) / 2,
        y: window_height.saturating_sub(height) / 2,
        width,
        height,
    }
}

/// Current output rectangle plus the border clear countdown
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport {
    rect: Rect,
    clear_frames: u32,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangle chosen by the last `update`
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Recompute the output rectangle for the current window size and mode
    ///
    /// Restarts the clear countdown when the rectangle changed, so stale
    /// border pixels left by the previous rectangle get repainted on every
    /// swapchain image. Returns whether the rectangle changed.
    pub fn update(&mut self, window_width: u32, window_height: u32, mode: ScalingMode) -> bool {
        let rect = match mode {
            ScalingMode::PixelPerfect => integer_rect(window_width, window_height),
            ScalingMode::AspectFit | ScalingMode::HqStretch => {
                fit_rect_keep_ar(window_width, window_height)
            }
        };

        if rect != self.rect {
            self.rect = rect;
            self.clear_frames = CLEAR_FRAMES;
            true
        } else {
            false
        }
    }

    /// Consume one frame of the clear countdown
    ///
    /// True while the countdown runs; the caller clears the whole surface
    /// for those frames and only the output rectangle afterwards.
    pub fn take_clear(&mut self) -> bool {
        if self.clear_frames > 0 {
            self.clear_frames -= 1;
            true
        } else {
            false
        }
    }

    /// Force a full-surface clear for the next [`CLEAR_FRAMES`] frames
    pub fn request_clear(&mut self) {
        self.clear_frames = CLEAR_FRAMES;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_rect_exact_aspect() {
        let rect = fit_rect_keep_ar(1280, 960);
        assert_eq!(rect, Rect { x: 0, y: 0, width: 1280, height: 960 });
    }

    #[test]
    fn test_fit_rect_pillarbox() {
        // 16:9 window around a 4:3 frame: bars left and right
        let rect = fit_rect_keep_ar(1920, 1080);
        assert_eq!(rect.height, 1080);
        assert_eq!(rect.width, 1440);
        assert_eq!(rect.x, 240);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_fit_rect_letterbox() {
        // portrait window: bars top and bottom
        let rect = fit_rect_keep_ar(640, 960);
        assert_eq!(rect.width, 640);
        assert_eq!(rect.height, 480);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 240);
    }

    #[test]
    fn test_fit_rect_degenerate_window() {
        assert_eq!(fit_rect_keep_ar(0, 480), Rect::default());
        assert_eq!(fit_rect_keep_ar(640, 0), Rect::default());
    }

    #[test]
    fn test_max_integer_zoom() {
        assert_eq!(max_integer_zoom(640, 480), 1);
        assert_eq!(max_integer_zoom(1279, 960), 1);
        assert_eq!(max_integer_zoom(1280, 960), 2);
        assert_eq!(max_integer_zoom(1920, 1080), 2);
        assert_eq!(max_integer_zoom(320, 240), 1);
    }

    #[test]
    fn test_pixel_perfect_centered() {
        let mut vp = Viewport::new();
        vp.update(1920, 1080, ScalingMode::PixelPerfect);
        assert_eq!(
            vp.rect(),
            Rect { x: 320, y: 60, width: 1280, height: 960 }
        );
    }

    #[test]
    fn test_update_restarts_clear_countdown() {
        let mut vp = Viewport::new();
        assert!(vp.update(1280, 960, ScalingMode::AspectFit));
        for _ in 0..CLEAR_FRAMES {
            assert!(vp.take_clear());
        }
        assert!(!vp.take_clear());

        // same size, same mode: no change, no new countdown
        assert!(!vp.update(1280, 960, ScalingMode::AspectFit));
        assert!(!vp.take_clear());

        // resize restarts it
        assert!(vp.update(1024, 768, ScalingMode::AspectFit));
        assert!(vp.take_clear());
    }

    #[test]
    fn test_scaling_mode_cycle_is_complete() {
        let mut mode = ScalingMode::PixelPerfect;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mode);
            mode = mode.cycle();
        }
        assert_eq!(mode, ScalingMode::PixelPerfect);
        assert_eq!(seen.len(), 3);
        assert!(seen.contains(&ScalingMode::AspectFit));
        assert!(seen.contains(&ScalingMode::HqStretch));
    }
}
