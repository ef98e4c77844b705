// RetroFrame Library
// Core library for the palette-indexed framebuffer presentation pipeline

// Public modules
pub mod color;
pub mod config;
pub mod display;
pub mod filter;
pub mod framebuffer;
pub mod palette;
pub mod screenshot;
pub mod viewport;

// Re-export main types for convenience
pub use color::{pack_rgb565, pack_rgba32, FramePixel};
pub use config::{PresenterConfig, VideoConfig};
pub use display::{run_display, PresentDriver, PresenterApp};
pub use filter::{ConvertOptions, FrameConverter, Zoom};
pub use framebuffer::{IndexedFramebuffer, VISIBLE_HEIGHT, VISIBLE_WIDTH};
pub use palette::{ColorTable, GamePalette, PaletteState};
pub use screenshot::{save_screenshot, ScreenshotError};
pub use viewport::{ScalingMode, Viewport};
