use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::{Array3, Axis, s};
use shared::ImageFeatureVector;

const SAMPLE_SIZE: u32 = 64;
// Raw mean gradients of everyday photos sit well below 0.25; the gain spreads
// them over the normalized range before clamping.
const TEXTURE_GAIN: f32 = 4.0;

// Derives the one-per-image feature summary from already-decoded pixels.
// Plain statistics only; nothing here recognizes objects.
pub fn extract(image: &RgbImage) -> ImageFeatureVector {
    let resized = imageops::resize(image, SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle);
    let (width, height) = resized.dimensions();

    let mut pixels = Array3::<f32>::zeros((height as usize, width as usize, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            pixels[[y as usize, x as usize, channel]] = f32::from(pixel.0[channel]) / 255.0;
        }
    }

    let brightness = pixels.mean().unwrap_or(0.0);

    let mean_r = pixels.slice(s![.., .., 0]).mean().unwrap_or(0.0);
    let mean_g = pixels.slice(s![.., .., 1]).mean().unwrap_or(0.0);
    let mean_b = pixels.slice(s![.., .., 2]).mean().unwrap_or(0.0);
    let (dominant_hue, dominant_saturation, dominant_value) = rgb_to_hsv(mean_r, mean_g, mean_b);

    let gray = pixels.map_axis(Axis(2), |px| (px[0] + px[1] + px[2]) / 3.0);
    let mut gradient_sum = 0.0;
    let mut samples = 0usize;
    for y in 0..gray.nrows() - 1 {
        for x in 0..gray.ncols() - 1 {
            gradient_sum += (gray[[y, x + 1]] - gray[[y, x]]).abs();
            gradient_sum += (gray[[y + 1, x]] - gray[[y, x]]).abs();
            samples += 2;
        }
    }
    let texture = if samples == 0 {
        0.0
    } else {
        (gradient_sum / samples as f32 * TEXTURE_GAIN).min(1.0)
    };

    ImageFeatureVector {
        dominant_hue,
        dominant_saturation,
        dominant_value,
        brightness,
        texture,
    }
}

fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    (hue, saturation, max)
}
