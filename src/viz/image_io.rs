use image::imageops::FilterType;

use crate::tensor::Tensor;

/// Load an image file as a `(1, 3, side, side)` channel-first tensor with
/// values in `[0, 1]`, matching the preprocessing the networks expect.
///
/// Missing files and decode failures surface as the image crate's own
/// errors; no additional validation happens here.
pub fn load_img(path: &str, side: usize) -> Result<Tensor, image::ImageError> {
    let rgb = image::open(path)?
        .resize_exact(side as u32, side as u32, FilterType::Triangle)
        .to_rgb8();
    let (w, h) = rgb.dimensions();
    let plane = (w * h) as usize;
    let mut data = vec![0.0f32; 3 * plane];
    for (x, y, px) in rgb.enumerate_pixels() {
        let idx = (y * w + x) as usize;
        for c in 0..3 {
            data[c * plane + idx] = px.0[c] as f32 / 255.0;
        }
    }
    Ok(Tensor::new(data, vec![1, 3, h as usize, w as usize]))
}
