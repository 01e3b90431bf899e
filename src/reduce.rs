//! Shared element-wise reduction kernels used by the reduce collective.

use crate::error::{MeshError, Result};
use crate::types::{DataType, ReduceOp};

/// Trait for element types that support the reduction operations.
trait Reducible: Copy + 'static {
    fn reduce(a: Self, b: Self, op: ReduceOp) -> Self;
}

macro_rules! impl_reducible {
    (int: $($ty:ty),*) => {
        $(
            impl Reducible for $ty {
                #[inline]
                fn reduce(a: Self, b: Self, op: ReduceOp) -> Self {
                    match op {
                        ReduceOp::Sum => a.wrapping_add(b),
                        ReduceOp::Min => a.min(b),
                        ReduceOp::Max => a.max(b),
                    }
                }
            }
        )*
    };
    (float: $($ty:ty),*) => {
        $(
            impl Reducible for $ty {
                #[inline]
                fn reduce(a: Self, b: Self, op: ReduceOp) -> Self {
                    match op {
                        ReduceOp::Sum => a + b,
                        ReduceOp::Min => a.min(b),
                        ReduceOp::Max => a.max(b),
                    }
                }
            }
        )*
    };
}

impl_reducible!(int: i8, i32, i64, u8, u32, u64);
impl_reducible!(float: f32, f64);

/// Read/write values from little-endian byte slices (alignment-safe).
trait LeBytes: Sized {
    fn read_le(bytes: &[u8]) -> Self;
    fn write_le(self, bytes: &mut [u8]);
}

macro_rules! impl_le_bytes {
    ($($ty:ty),*) => {
        $(
            impl LeBytes for $ty {
                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut arr = [0u8; std::mem::size_of::<$ty>()];
                    arr.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(arr)
                }

                #[inline]
                fn write_le(self, bytes: &mut [u8]) {
                    bytes.copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_le_bytes!(f32, f64, i8, i32, i64, u8, u32, u64);

fn fold_slice_typed<T: Reducible + LeBytes>(
    dst: &mut [u8],
    src: &[u8],
    count: usize,
    op: ReduceOp,
) {
    let size = std::mem::size_of::<T>();
    for i in 0..count {
        let range = i * size..(i + 1) * size;
        let a = T::read_le(&dst[range.clone()]);
        let b = T::read_le(&src[range.clone()]);
        T::reduce(a, b, op).write_le(&mut dst[range]);
    }
}

/// Element-wise fold of `src` into `dst`, both interpreted as `count`
/// elements of `dtype`.
pub fn fold_slice(
    dst: &mut [u8],
    src: &[u8],
    count: usize,
    dtype: DataType,
    op: ReduceOp,
) -> Result<()> {
    let expected = count * dtype.size_in_bytes();
    if dst.len() != expected {
        return Err(MeshError::BufferSizeMismatch {
            expected,
            actual: dst.len(),
        });
    }
    if src.len() != expected {
        return Err(MeshError::BufferSizeMismatch {
            expected,
            actual: src.len(),
        });
    }

    match dtype {
        DataType::F32 => fold_slice_typed::<f32>(dst, src, count, op),
        DataType::F64 => fold_slice_typed::<f64>(dst, src, count, op),
        DataType::I8 => fold_slice_typed::<i8>(dst, src, count, op),
        DataType::I32 => fold_slice_typed::<i32>(dst, src, count, op),
        DataType::I64 => fold_slice_typed::<i64>(dst, src, count, op),
        DataType::U8 => fold_slice_typed::<u8>(dst, src, count, op),
        DataType::U32 => fold_slice_typed::<u32>(dst, src, count, op),
        DataType::U64 => fold_slice_typed::<u64>(dst, src, count, op),
    }
    Ok(())
}
