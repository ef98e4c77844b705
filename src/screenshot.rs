// Screenshot functionality
//
// Captures the current converted frame and saves it as a PNG file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::color::{BLUE_BYTE, GREEN_BYTE, RED_BYTE};

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save a screenshot of the current converted frame
///
/// Strips the alpha channel from the packed RGBA frame and saves it as an
/// RGB PNG named by timestamp under `directory`.
///
/// # Arguments
///
/// * `frame` - Packed RGBA pixels (`width * height` of them)
/// * `width` - Frame width in pixels
/// * `height` - Frame height in pixels
/// * `directory` - Directory to save under; created if missing
///
/// # Returns
///
/// Result containing the path to the saved screenshot or an error
pub fn save_screenshot(
    frame: &[u32],
    width: u32,
    height: u32,
    directory: &Path,
) -> Result<PathBuf, ScreenshotError> {
    assert_eq!(frame.len(), (width * height) as usize, "frame size mismatch");

    fs::create_dir_all(directory)?;

    // Generate filename with timestamp
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("screenshot_{}.png", timestamp);
    let file_path = directory.join(filename);

    let rgb_data = packed_to_rgb(frame);
    save_png(&file_path, &rgb_data, width, height)?;

    Ok(file_path)
}

/// Convert packed RGBA pixels to RGB888 data
fn packed_to_rgb(frame: &[u32]) -> Vec<u8> {
    let mut rgb_data = Vec::with_capacity(frame.len() * 3);

    for &pixel in frame {
        let bytes = pixel.to_ne_bytes();
        rgb_data.push(bytes[RED_BYTE]);
        rgb_data.push(bytes[GREEN_BYTE]);
        rgb_data.push(bytes[BLUE_BYTE]);
    }

    rgb_data
}

/// Save RGB data as a PNG file
fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}
