use crate::math::Matrix;

/// N-dimensional tensor backed by a flat `Vec<f32>`.
///
/// The shape is stored explicitly so the gradient engine can reason about
/// the semantic `(batch, channels, height, width)` layout while layers
/// freely drop to the 2-D [`Matrix`] workhorse and back.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    /// Tensor elements in row-major order.
    pub data: Vec<f32>,
    /// Sizes for each dimension.
    pub shape: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor from raw parts.  The number of elements in `data`
    /// must match the product of the requested `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Self {
        assert_eq!(data.len(), shape.iter().product::<usize>());
        Tensor { data, shape }
    }

    /// Wrap a [`Matrix`], recording its two dimensional shape.
    pub fn from_matrix(m: Matrix) -> Self {
        Tensor {
            shape: vec![m.rows, m.cols],
            data: m.data,
        }
    }

    /// View a rank-2 tensor as a [`Matrix`].
    pub fn to_matrix(&self) -> Matrix {
        assert_eq!(self.shape.len(), 2, "only rank-2 tensors map to matrices");
        Matrix::from_vec(self.shape[0], self.shape[1], self.data.clone())
    }

    fn offset(&self, idx: &[usize]) -> usize {
        assert_eq!(idx.len(), self.shape.len());
        let mut stride = 1;
        let mut off = 0usize;
        for (i, &dim) in self.shape.iter().rev().enumerate() {
            let id = idx[self.shape.len() - 1 - i];
            assert!(id < dim, "index out of bounds");
            off += id * stride;
            stride *= dim;
        }
        off
    }

    /// Basic immutable indexing.
    pub fn get(&self, idx: &[usize]) -> f32 {
        let off = self.offset(idx);
        self.data[off]
    }

    /// Mutable indexing support.
    pub fn set(&mut self, idx: &[usize], value: f32) {
        let off = self.offset(idx);
        self.data[off] = value;
    }

    /// Change the view of the underlying data without modifying order.
    /// The new shape must contain the same number of elements.
    pub fn reshape(&mut self, new_shape: Vec<usize>) {
        assert_eq!(self.data.len(), new_shape.iter().product::<usize>());
        self.shape = new_shape;
    }

    /// Create a tensor of zeros with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len: usize = shape.iter().product();
        Tensor {
            data: vec![0.0; len],
            shape,
        }
    }

    /// Create a tensor of ones matching the shape of `other`.
    pub fn ones_like(other: &Tensor) -> Self {
        Tensor {
            data: vec![1.0; other.data.len()],
            shape: other.shape.clone(),
        }
    }

    /// Drop a leading batch dimension of size one.
    pub fn squeeze_batch(&self) -> Tensor {
        assert!(!self.shape.is_empty() && self.shape[0] == 1);
        Tensor {
            data: self.data.clone(),
            shape: self.shape[1..].to_vec(),
        }
    }

    /// Collapse the channel dimension of a `(channels, height, width)`
    /// tensor by taking the raw maximum across channels, keeping a leading
    /// dimension of one.
    pub fn channel_max(&self) -> Tensor {
        assert_eq!(self.shape.len(), 3, "channel_max expects (C, H, W)");
        let (c, h, w) = (self.shape[0], self.shape[1], self.shape[2]);
        let plane = h * w;
        let mut out = vec![f32::NEG_INFINITY; plane];
        for ch in 0..c {
            let src = &self.data[ch * plane..(ch + 1) * plane];
            for (o, &v) in out.iter_mut().zip(src.iter()) {
                if v > *o {
                    *o = v;
                }
            }
        }
        Tensor::new(out, vec![1, h, w])
    }
}
