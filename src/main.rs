// RetroFrame - Main Entry Point
//
// Runs the presentation pipeline on a demo frame: a dithered test pattern
// converted and streamed to the window through the GPU driver.

use retroframe::config::PresenterConfig;
use retroframe::display::run_display;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("RetroFrame (retroframe) v0.1.0");
    println!("==============================");
    println!();

    // Load or create presenter configuration
    let config = PresenterConfig::load_or_default();
    println!("Configuration loaded from 'retroframe.toml'");
    println!();

    println!("Hotkeys: F = dither filter, S = scaling mode, F9 = screenshot");
    println!("Press Escape or the close button to exit.");
    println!();

    run_display(config)?;

    println!("Display window closed.");
    Ok(())
}
