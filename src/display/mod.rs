// Display module - Handles window creation and GPU presentation
//
// This module provides:
// - Streaming frame texture driven through a mappable transfer buffer
// - Viewport placement per scaling mode with border clearing
// - Window creation and the event loop that feeds the driver
// - Hotkeys for filter toggling, scaling modes, and screenshots

pub mod driver;
pub mod window;

pub use driver::{PresentDriver, FRAME_TEXTURE_HEIGHT, FRAME_TEXTURE_WIDTH};
pub use window::{run_display, PresenterApp};
