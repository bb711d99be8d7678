use crate::tensor::Tensor;

/// Rearrange a channel-first gradient or image tensor for display.
///
/// Accepts `(1, C, H, W)` or `(C, H, W)` and returns `(H, W, C)`.
pub fn format_for_plotting(t: &Tensor) -> Tensor {
    let t = if t.shape.len() == 4 {
        t.squeeze_batch()
    } else {
        t.clone()
    };
    assert_eq!(t.shape.len(), 3, "expected (C, H, W)");
    let (c, h, w) = (t.shape[0], t.shape[1], t.shape[2]);
    let plane = h * w;
    let mut out = vec![0.0f32; c * plane];
    for ch in 0..c {
        for i in 0..plane {
            out[i * c + ch] = t.data[ch * plane + i];
        }
    }
    Tensor::new(out, vec![h, w, c])
}

/// Standardize a tensor and clip it into the displayable `[0, 1]` range.
///
/// Values are centred and scaled to the requested spread around
/// `brightness` before clamping, so a handful of extreme gradient values
/// cannot wash out the rest of the map.
pub fn standardize_and_clip(t: &Tensor, saturation: f32, brightness: f32) -> Tensor {
    let n = t.data.len() as f32;
    let mean = t.data.iter().sum::<f32>() / n;
    let var = t.data.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / n;
    let mut std = var.sqrt();
    if std < 1e-7 {
        std = 1.0;
    }
    let data = t
        .data
        .iter()
        .map(|&v| (((v - mean) / std) * saturation + brightness).clamp(0.0, 1.0))
        .collect();
    Tensor::new(data, t.shape.clone())
}
