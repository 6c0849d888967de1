//! Frame to model input conversion

use camera_capture::VideoFrame;
use image::imageops::{self, FilterType};
use tract_onnx::prelude::*;

use crate::InferenceError;

/// Decode, resize and normalize a frame into a `[1, H, W, 3]` f32 tensor
pub fn to_input_tensor(
    frame: &VideoFrame,
    input_width: u32,
    input_height: u32,
) -> Result<Tensor, InferenceError> {
    let rgb = frame.to_rgb()?;
    let resized = if rgb.dimensions() == (input_width, input_height) {
        rgb
    } else {
        imageops::resize(&rgb, input_width, input_height, FilterType::Triangle)
    };

    let input = tract_ndarray::Array4::from_shape_fn(
        (1, input_height as usize, input_width as usize, 3),
        |(_, y, x, c)| resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    );

    Ok(input.into_tensor())
}
