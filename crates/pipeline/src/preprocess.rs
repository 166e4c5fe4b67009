use decoder::ModelResolution;
use image::RgbImage;
use ndarray::{Array, IxDyn};

/// Convert an RGB frame into the `[1, 3, H, W]` float buffer the detection
/// models expect, resized to the model resolution and normalized to [0, 1].
///
/// The frame is stretched to the target aspect ratio, not letterboxed.
/// Box coordinates come back in plain model space, which is what the
/// decoder's scale factors assume.
pub fn preprocess_image(
    frame: &RgbImage,
    target: ModelResolution,
) -> anyhow::Result<Array<f32, IxDyn>> {
    if target.width == 0 || target.height == 0 {
        anyhow::bail!(
            "model resolution {}x{} is not usable as a preprocessing target",
            target.width,
            target.height
        );
    }

    let resized = if frame.dimensions() == (target.width, target.height) {
        frame.clone()
    } else {
        image::imageops::resize(
            frame,
            target.width,
            target.height,
            image::imageops::FilterType::Triangle,
        )
    };

    let (width, height) = (target.width as usize, target.height as usize);
    let mut input = Array::zeros(IxDyn(&[1, 3, height, width]));
    for y in 0..height {
        for x in 0..width {
            let pixel = resized.get_pixel(x as u32, y as u32);
            input[[0, 0, y, x]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y, x]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y, x]] = pixel[2] as f32 / 255.0;
        }
    }

    Ok(input)
}
