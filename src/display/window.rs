// Window module - Manages the display window and event loop
//
// This module provides window creation, hotkey handling, and the frame
// loop feeding the presentation driver, using winit.

use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use super::driver::PresentDriver;
use crate::config::PresenterConfig;
use crate::framebuffer::{IndexedFramebuffer, VISIBLE_HEIGHT, VISIBLE_WIDTH};
use crate::palette::{GamePalette, PaletteState};
use crate::screenshot::save_screenshot;
use crate::viewport::ScalingMode;

/// Target frame rate in Hz
const TARGET_FPS: u32 = 60;

/// Frames in the startup fade-in, brightness stepping 4, 12, 20, ... 100
const FADE_FRAMES: u32 = 13;

/// Presenter application driving the window event loop
///
/// Owns the indexed framebuffer, the palette state, and the GPU driver,
/// and maps hotkeys onto the presentation settings:
///
/// * `F` - toggle the dithering filter
/// * `S` - cycle the scaling mode
/// * `F9` - save a screenshot
/// * `Escape` - quit
pub struct PresenterApp {
    window: Option<Arc<Window>>,
    driver: Option<PresentDriver>,
    config: PresenterConfig,
    framebuffer: IndexedFramebuffer,
    palette: PaletteState,
    scaling: ScalingMode,
    filter_dithering: bool,
    frame_count: u64,
    last_frame_time: Instant,
}

impl PresenterApp {
    /// Create a new presenter application (window created when the event
    /// loop starts)
    pub fn new(config: PresenterConfig) -> Self {
        let scaling = config.video.scaling;
        let filter_dithering = config.video.filter_dithering;

        let mut framebuffer = IndexedFramebuffer::new();
        framebuffer.dither_pattern();

        let mut palette = PaletteState::new(GamePalette::grayscale());
        palette.begin_fade();

        Self {
            window: None,
            driver: None,
            config,
            framebuffer,
            palette,
            scaling,
            filter_dithering,
            frame_count: 0,
            last_frame_time: Instant::now(),
        }
    }

    /// Get a mutable reference to the framebuffer
    pub fn framebuffer_mut(&mut self) -> &mut IndexedFramebuffer {
        &mut self.framebuffer
    }

    /// Get a mutable reference to the palette state
    pub fn palette_mut(&mut self) -> &mut PaletteState {
        &mut self.palette
    }

    /// Check if enough time has passed for the next frame
    fn should_render_frame(&mut self) -> bool {
        let elapsed = self.last_frame_time.elapsed();
        let frame_duration = Duration::from_micros(1_000_000 / TARGET_FPS as u64);

        if elapsed >= frame_duration {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }

    /// Advance the startup fade-in, one brightness step per frame
    fn step_fade(&mut self) {
        if self.frame_count < FADE_FRAMES as u64 {
            let brightness = (4 + self.frame_count as u32 * 8).min(100);
            self.palette.step_fade(brightness);
        } else if self.frame_count == FADE_FRAMES as u64 {
            self.palette.restore();
        }
    }

    /// Render the current frame through the driver
    fn render(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.step_fade();
        self.frame_count += 1;

        if let Some(driver) = &mut self.driver {
            driver.present(
                &self.framebuffer,
                self.palette.color_table(),
                self.scaling,
                self.filter_dithering,
            )?;
        }
        Ok(())
    }

    fn toggle_filter(&mut self) {
        self.filter_dithering = !self.filter_dithering;
        log::info!(
            "Dithering filter {}",
            if self.filter_dithering { "on" } else { "off" }
        );
    }

    fn cycle_scaling(&mut self) {
        self.scaling = self.scaling.cycle();
        log::info!("Scaling mode: {}", self.scaling.label());
    }

    fn take_screenshot(&mut self) {
        let Some(driver) = &mut self.driver else {
            return;
        };

        let frame = driver.capture_frame(
            &self.framebuffer,
            self.palette.color_table(),
            self.filter_dithering,
        );
        let directory = self.config.screenshot.screenshot_directory.clone();

        match save_screenshot(&frame, VISIBLE_WIDTH as u32, VISIBLE_HEIGHT as u32, &directory) {
            Ok(path) => log::info!("Screenshot saved to {}", path.display()),
            Err(e) => log::error!("Failed to save screenshot: {}", e),
        }
    }
}

impl ApplicationHandler for PresenterApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(format!("RetroFrame - {}x{}", VISIBLE_WIDTH, VISIBLE_HEIGHT))
            .with_inner_size(LogicalSize::new(VISIBLE_WIDTH as u32, VISIBLE_HEIGHT as u32))
            .with_min_inner_size(LogicalSize::new(320u32, 240u32));

        let window = event_loop
            .create_window(window_attributes)
            .expect("Failed to create window");
        let window = Arc::new(window);

        let driver = PresentDriver::new(window.clone(), &self.config)
            .expect("Failed to create presentation driver");

        self.window = Some(window);
        self.driver = Some(driver);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                println!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(driver) = &mut self.driver {
                    driver.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match physical_key {
                PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                PhysicalKey::Code(KeyCode::KeyF) => self.toggle_filter(),
                PhysicalKey::Code(KeyCode::KeyS) => self.cycle_scaling(),
                PhysicalKey::Code(KeyCode::F9) => self.take_screenshot(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                if self.should_render_frame() {
                    if let Err(err) = self.render() {
                        log::error!("Render error: {}", err);
                        event_loop.exit();
                    }
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Create and run the display window
///
/// # Arguments
/// * `config` - Presenter configuration
///
/// # Returns
/// Result indicating success or error
pub fn run_display(config: PresenterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;

    // Set control flow based on VSync setting
    if config.video.vsync {
        event_loop.set_control_flow(ControlFlow::Wait);
    } else {
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    println!("Starting display window...");
    println!("  Resolution: {}x{}", VISIBLE_WIDTH, VISIBLE_HEIGHT);
    println!("  Scaling: {}", config.video.scaling.label());
    println!("  Dithering filter: {}", config.video.filter_dithering);
    println!("  VSync: {}", config.video.vsync);
    println!("  Workers: {}", config.effective_workers());

    let mut app = PresenterApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_brightness_steps() {
        // 4, 12, 20, ... reaches 100 on the final fade frame
        let brightness_at = |frame: u32| (4 + frame * 8).min(100);
        assert_eq!(brightness_at(0), 4);
        assert_eq!(brightness_at(1), 12);
        assert_eq!(brightness_at(FADE_FRAMES - 1), 100);
    }

    #[test]
    fn test_app_starts_with_config_settings() {
        let mut config = PresenterConfig::default();
        config.video.scaling = ScalingMode::PixelPerfect;
        config.video.filter_dithering = false;

        let app = PresenterApp::new(config);
        assert_eq!(app.scaling, ScalingMode::PixelPerfect);
        assert!(!app.filter_dithering);
        assert!(app.window.is_none());
    }
}
