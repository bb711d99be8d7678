use std::path::Path;

use image::{Rgb, RgbImage};

use crate::tensor::Tensor;

const MARGIN: u32 = 8;

fn to_rgb_image(t: &Tensor) -> RgbImage {
    assert_eq!(t.shape.len(), 3, "expected (H, W, C) in [0, 1]");
    let (h, w, c) = (t.shape[0], t.shape[1], t.shape[2]);
    assert!(c == 1 || c == 3, "panels must be grayscale or RGB");
    RgbImage::from_fn(w as u32, h as u32, |x, y| {
        let base = (y as usize * w + x as usize) * c;
        let px = |ch: usize| (t.data[base + ch].clamp(0.0, 1.0) * 255.0).round() as u8;
        if c == 1 {
            let v = px(0);
            Rgb([v, v, v])
        } else {
            Rgb([px(0), px(1), px(2)])
        }
    })
}

fn blend(original: &RgbImage, overlay: &RgbImage, alpha: f32) -> RgbImage {
    RgbImage::from_fn(original.width(), original.height(), |x, y| {
        let o = original.get_pixel(x, y).0;
        let g = overlay.get_pixel(x, y).0;
        let mut out = [0u8; 3];
        for ch in 0..3 {
            let v = o[ch] as f32 * (1.0 - alpha) + g[ch] as f32 * alpha;
            out[ch] = v.round() as u8;
        }
        Rgb(out)
    })
}

/// Compose the three saliency panels into one figure and write it as PNG:
/// the clipped gradient, the original image, and the original with the
/// gradient alpha-blended on top.
///
/// Both tensors are `(H, W, C)` with values in `[0, 1]`; the gradient may
/// be single-channel.
pub fn render_panels(
    gradient: &Tensor,
    original: &Tensor,
    alpha: f32,
    path: &Path,
) -> Result<(), image::ImageError> {
    let grad_img = to_rgb_image(gradient);
    let orig_img = to_rgb_image(original);
    assert_eq!(grad_img.dimensions(), orig_img.dimensions());
    let blend_img = blend(&orig_img, &grad_img, alpha);

    let (w, h) = orig_img.dimensions();
    let mut figure = RgbImage::from_pixel(3 * w + 2 * MARGIN, h, Rgb([255, 255, 255]));
    for (i, panel) in [&grad_img, &orig_img, &blend_img].iter().enumerate() {
        let x0 = i as u32 * (w + MARGIN);
        for (x, y, px) in panel.enumerate_pixels() {
            figure.put_pixel(x0 + x, y, *px);
        }
    }
    figure.save(path)
}
