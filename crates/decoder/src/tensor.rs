use crate::error::DecodeError;
use ndarray::{ArrayD, ArrayViewD, IxDyn};

/// Raw model output: a flat f32 buffer plus its shape.
///
/// Produced by the inference provider and consumed once per frame by
/// [`crate::decode::decode`], which never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTensor {
    data: ArrayD<f32>,
}

impl RawTensor {
    /// Build a tensor from a shape descriptor and a flat buffer.
    /// The buffer length must equal the product of the dimension sizes.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>) -> Result<Self, DecodeError> {
        let data =
            ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|_| DecodeError::InvalidInput)?;
        Ok(Self { data })
    }

    pub fn from_array(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }
}

/// Spatial dimensions the tensor's box coordinates are expressed in.
/// Fixed per loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelResolution {
    pub width: u32,
    pub height: u32,
}

impl ModelResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pixel dimensions of the destination drawing surface. Independent of the
/// model resolution; may change between frames but not during a decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFrame {
    pub width: u32,
    pub height: u32,
}

impl DisplayFrame {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
