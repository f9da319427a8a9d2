//! Crop command

use anyhow::{Context, Result};
use gigmap_core::config::Config;
use gigmap_image::{validate_upload, CropState, Cropper, CropperOptions, Point};
use gigmap_telemetry::Timer;
use serde_json::json;
use std::path::PathBuf;

use super::is_json;

pub struct Args {
    pub input: PathBuf,
    pub output: PathBuf,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub ui_size: f64,
}

pub fn run(config: &Config, args: &Args, format: &str) -> Result<()> {
    let timer = Timer::start("crop");

    let data = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let mut cropper = Cropper::new(CropperOptions {
        output_size: config.schema.cropper.output_size,
        quality: config.schema.cropper.jpeg_quality,
        ui_size: args.ui_size,
    });
    let (width, height) = cropper.load(&data)?;

    let state = CropState::with_view(Point::new(args.x, args.y), args.scale);
    let cropped = cropper
        .crop(&state)?
        .context("no image loaded")?;

    // Same gate the upload path applies
    validate_upload(&cropped.data, config.schema.storage.max_upload_bytes)?;

    std::fs::write(&args.output, &cropped.data)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    let elapsed = timer.stop();

    if is_json(format) {
        let out = json!({
            "source": { "width": width, "height": height },
            "output": args.output.display().to_string(),
            "size": cropped.size,
            "bytes": cropped.data.len(),
            "mime": cropped.mime_type(),
            "scale": state.scale,
            "elapsedMs": elapsed.as_millis(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "Cropped {}x{} -> {}x{} ({} bytes) at {:.2}x",
            width,
            height,
            cropped.size,
            cropped.size,
            cropped.data.len(),
            state.scale
        );
        println!("Wrote {}", args.output.display());
    }
    Ok(())
}
