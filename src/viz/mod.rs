pub mod image_io;
pub mod normalize;
pub mod plot;

use std::fmt;
use std::path::PathBuf;

use crate::backprop::{Backprop, BackpropError};
use crate::models::Network;
use crate::tensor::Tensor;
use crate::util::logging::format_prediction;

/// Rendering knobs for the saliency figure.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Where the composed figure is written.
    pub figure_path: PathBuf,
    /// Blend factor for the gradient overlay panel.
    pub overlay_alpha: f32,
    /// Spread of the standardized gradient around `brightness`.
    pub saturation: f32,
    /// Centre of the displayable gradient range.
    pub brightness: f32,
    /// Side length images are resized to before entering the network.
    pub image_side: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            figure_path: PathBuf::from("saliency.png"),
            overlay_alpha: 0.3,
            saturation: 0.1,
            brightness: 0.5,
            image_side: 224,
        }
    }
}

/// Errors from the visualization wrapper.
#[derive(Debug)]
pub enum VizError {
    Image(image::ImageError),
    Backprop(BackpropError),
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VizError::Image(e) => write!(f, "image loading failed: {}", e),
            VizError::Backprop(e) => write!(f, "gradient computation failed: {}", e),
        }
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VizError::Image(e) => Some(e),
            VizError::Backprop(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for VizError {
    fn from(e: image::ImageError) -> Self {
        VizError::Image(e)
    }
}

impl From<BackpropError> for VizError {
    fn from(e: BackpropError) -> Self {
        VizError::Backprop(e)
    }
}

/// Compute and render the input gradient for an image file with default
/// rendering options. See [`get_input_gradient_with`].
pub fn get_input_gradient(
    model: &mut dyn Network,
    file_path: &str,
    guided: bool,
    take_max: bool,
    use_accelerator: bool,
) -> Result<(Tensor, Tensor), VizError> {
    get_input_gradient_with(
        model,
        file_path,
        guided,
        take_max,
        use_accelerator,
        &RenderOptions::default(),
    )
}

/// Load an image, run the gradient engine over it with no explicit target
/// class, and render the three-panel saliency figure.
///
/// The figure (clipped gradient, original image, alpha-blended overlay) is
/// written to `opts.figure_path` as a side effect. Returns the clipped
/// `(H, W, C)` gradient map together with the raw gradient tensor.
pub fn get_input_gradient_with(
    model: &mut dyn Network,
    file_path: &str,
    guided: bool,
    take_max: bool,
    use_accelerator: bool,
    opts: &RenderOptions,
) -> Result<(Tensor, Tensor), VizError> {
    let img = image_io::load_img(file_path, opts.image_side)?;
    let mut backprop = Backprop::new(model);
    let (raw, predicted) =
        backprop.calculate_gradients(&img, None, take_max, guided, use_accelerator)?;
    crate::info!("{}", format_prediction(predicted));

    let clipped = normalize::standardize_and_clip(
        &normalize::format_for_plotting(&raw),
        opts.saturation,
        opts.brightness,
    );
    let original = normalize::format_for_plotting(&img);
    plot::render_panels(&clipped, &original, opts.overlay_alpha, &opts.figure_path)?;
    Ok((clipped, raw))
}
