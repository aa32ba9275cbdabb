//! Zero-initialised, 64-byte aligned `f32` storage.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Alignment of every matrix buffer in bytes.
///
/// Covers aligned AVX2 (32-byte) and AVX-512 (64-byte) loads as well as a
/// cache line.
pub const ALIGNMENT: usize = 64;

pub(crate) struct AlignedBuf {
    ptr: NonNull<f32>,
    len: usize,
}

// SAFETY: AlignedBuf owns its allocation exclusively, like a Box<[f32]>.
unsafe impl Send for AlignedBuf {}
unsafe impl Sync for AlignedBuf {}

impl AlignedBuf {
    /// Allocates `len` zeroed elements.
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows `isize`, as `Vec` does.
    pub(crate) fn zeroed(len: usize) -> Self {
        if len == 0 {
            return Self {
                ptr: NonNull::dangling(),
                len,
            };
        }
        let layout = Self::layout(len);
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) } as *mut f32;
        match NonNull::new(raw) {
            Some(ptr) => Self { ptr, len },
            None => alloc::handle_alloc_error(layout),
        }
    }

    fn layout(len: usize) -> Layout {
        len.checked_mul(size_of::<f32>())
            .and_then(|bytes| Layout::from_size_align(bytes, ALIGNMENT).ok())
            .unwrap_or_else(|| panic!("matrix buffer of {len} elements overflows"))
    }

    pub(crate) fn as_slice(&self) -> &[f32] {
        // SAFETY: ptr is valid for len initialised elements (or dangling with len 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        if self.len != 0 {
            // SAFETY: allocated in `zeroed` with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, Self::layout(self.len)) };
        }
    }
}

impl Clone for AlignedBuf {
    fn clone(&self) -> Self {
        let mut copy = Self::zeroed(self.len);
        copy.as_mut_slice().copy_from_slice(self.as_slice());
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_and_zeroing() {
        for len in [1, 7, 64, 1000, 4096] {
            let buf = AlignedBuf::zeroed(len);
            assert_eq!(buf.as_slice().as_ptr() as usize % ALIGNMENT, 0);
            assert_eq!(buf.as_slice().len(), len);
            assert!(buf.as_slice().iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_empty_buffer() {
        let mut buf = AlignedBuf::zeroed(0);
        assert!(buf.as_slice().is_empty());
        assert!(buf.as_mut_slice().is_empty());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut buf = AlignedBuf::zeroed(16);
        buf.as_mut_slice()[3] = 2.5;
        let copy = buf.clone();
        buf.as_mut_slice()[3] = 0.0;
        assert_eq!(copy.as_slice()[3], 2.5);
        assert_eq!(copy.as_slice().as_ptr() as usize % ALIGNMENT, 0);
    }
}
