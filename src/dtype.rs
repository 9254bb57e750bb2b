//! Element type tags and the traits that bind Rust scalars to them.

use std::fmt;

use num_traits::{Float, FloatConst};

use crate::storage::TensorData;

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
    I32,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            DType::F32 | DType::I32 => 4,
            DType::F64 => 8,
        }
    }

    /// Returns `true` for types the numeric kernels can evaluate.
    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
        };
        f.write_str(name)
    }
}

/// A scalar that can live in tensor storage.
pub trait Element: Copy + Default + fmt::Debug + Send + Sync + 'static {
    const DTYPE: DType;

    /// Borrows the typed buffer if `data` holds this element type.
    fn slice(data: &TensorData) -> Option<&[Self]>;

    /// Mutably borrows the typed buffer if `data` holds this element type.
    fn slice_mut(data: &mut TensorData) -> Option<&mut [Self]>;

    /// Wraps a buffer into type-tagged storage.
    fn into_data(values: Vec<Self>) -> TensorData;
}

/// A floating point element the compute kernels operate on.
pub trait FloatElement: Element + Float + FloatConst {
    /// Gauss error function.
    fn erf(self) -> Self;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const DTYPE: DType = DType::$variant;

            fn slice(data: &TensorData) -> Option<&[Self]> {
                match data {
                    TensorData::$variant(values) => Some(values.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut TensorData) -> Option<&mut [Self]> {
                match data {
                    TensorData::$variant(values) => Some(values.as_mut_slice()),
                    _ => None,
                }
            }

            fn into_data(values: Vec<Self>) -> TensorData {
                TensorData::$variant(values)
            }
        }
    };
}

impl_element!(f32, F32);
impl_element!(f64, F64);
impl_element!(i32, I32);

impl FloatElement for f32 {
    fn erf(self) -> Self {
        libm::erff(self)
    }
}

impl FloatElement for f64 {
    fn erf(self) -> Self {
        libm::erf(self)
    }
}
