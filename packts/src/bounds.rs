// パケットバッファの境界チェック
//
// verifierはアクセス直前のチェックしか信用しないので、
// チェックはまとめずにアクセスごとに行うこと

use core::marker::PhantomData;
use core::mem;

/// A `[start, end)` view over packet memory.
///
/// Nothing is ever dereferenced without first proving that the access lies
/// inside the region. The view does not own the memory; the lifetime ties it
/// to whoever does (a host slice, or the kernel for one program invocation).
pub struct FrameBuffer<'a> {
    start: usize,
    end: usize,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> FrameBuffer<'a> {
    #[inline(always)]
    pub fn from_slice(buf: &'a mut [u8]) -> Self {
        let start = buf.as_mut_ptr() as usize;
        Self {
            start,
            end: start + buf.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `start..end` must be memory that is valid for reads and writes for
    /// `'a`, such as the `data`/`data_end` pair of a socket buffer.
    #[inline(always)]
    pub unsafe fn from_raw(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `start + offset + len <= end`
    #[inline(always)]
    pub fn check(&self, offset: usize, len: usize) -> bool {
        match self
            .start
            .checked_add(offset)
            .and_then(|p| p.checked_add(len))
        {
            Some(last) => last <= self.end,
            None => false,
        }
    }

    #[inline(always)]
    pub fn ptr_at<T>(&self, offset: usize) -> Option<*const T> {
        if !self.check(offset, mem::size_of::<T>()) {
            return None;
        }
        Some((self.start + offset) as *const T)
    }

    #[inline(always)]
    pub fn ptr_at_mut<T>(&mut self, offset: usize) -> Option<*mut T> {
        if !self.check(offset, mem::size_of::<T>()) {
            return None;
        }
        Some((self.start + offset) as *mut T)
    }
}
