//! 4-wide float lanes and the aligned buffers built from them.
//!
//! Every network buffer is a `Vec<F32x4>`, so base addresses are 16-byte
//! aligned and lengths are multiples of [`LANES`] by construction.

use std::ops::{Add, Mul};

use crate::error::NetworkError;

/// Number of floats in one lane group.
pub const LANES: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C, align(16))]
pub struct F32x4(pub [f32; LANES]);

impl F32x4 {
    pub const ZERO: Self = Self([0.0; LANES]);

    #[inline]
    pub fn splat(value: f32) -> Self {
        Self([value; LANES])
    }
}

#[cfg(target_arch = "x86_64")]
impl Add for F32x4 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        use std::arch::x86_64::{_mm_add_ps, _mm_load_ps, _mm_store_ps};
        let mut out = Self::ZERO;
        // SAFETY: SSE is part of the x86_64 baseline; all three operands are
        // `F32x4`, which is 16-byte aligned.
        unsafe {
            let sum = _mm_add_ps(_mm_load_ps(self.0.as_ptr()), _mm_load_ps(rhs.0.as_ptr()));
            _mm_store_ps(out.0.as_mut_ptr(), sum);
        }
        out
    }
}

#[cfg(target_arch = "x86_64")]
impl Mul for F32x4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        use std::arch::x86_64::{_mm_load_ps, _mm_mul_ps, _mm_store_ps};
        let mut out = Self::ZERO;
        // SAFETY: see `Add`.
        unsafe {
            let product = _mm_mul_ps(_mm_load_ps(self.0.as_ptr()), _mm_load_ps(rhs.0.as_ptr()));
            _mm_store_ps(out.0.as_mut_ptr(), product);
        }
        out
    }
}

#[cfg(not(target_arch = "x86_64"))]
impl Add for F32x4 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

#[cfg(not(target_arch = "x86_64"))]
impl Mul for F32x4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] * rhs.0[i]))
    }
}

/// Owned, fixed-length, 16-byte aligned float buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneBuffer {
    lanes: Vec<F32x4>,
}

impl LaneBuffer {
    /// Allocates `len` zeroed floats. `len` must be a multiple of [`LANES`].
    pub fn zeroed(len: usize) -> Result<Self, NetworkError> {
        debug_assert_eq!(len % LANES, 0);
        let count = len / LANES;
        let mut lanes = Vec::new();
        lanes
            .try_reserve_exact(count)
            .map_err(|source| NetworkError::Allocation { len, source })?;
        lanes.resize(count, F32x4::ZERO);
        Ok(Self { lanes })
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self, NetworkError> {
        let mut lanes = Vec::new();
        lanes
            .try_reserve_exact(self.lanes.len())
            .map_err(|source| NetworkError::Allocation { len: self.len(), source })?;
        lanes.extend_from_slice(&self.lanes);
        Ok(Self { lanes })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lanes.len() * LANES
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    #[inline]
    pub fn lanes(&self) -> &[F32x4] {
        &self.lanes
    }

    #[inline]
    pub fn lanes_mut(&mut self) -> &mut [F32x4] {
        &mut self.lanes
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        // SAFETY: `F32x4` is `repr(C)` over `[f32; LANES]` with no padding
        // (size 16, align 16), so the lane vector is a contiguous run of
        // `len()` initialized floats.
        unsafe { std::slice::from_raw_parts(self.lanes.as_ptr().cast::<f32>(), self.len()) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        let len = self.len();
        // SAFETY: as in `as_slice`; the exclusive borrow of `self` covers the
        // whole allocation.
        unsafe { std::slice::from_raw_parts_mut(self.lanes.as_mut_ptr().cast::<f32>(), len) }
    }
}
