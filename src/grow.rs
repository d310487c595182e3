//! Heap growth providers.
//!
//! A grower is the only source of new memory for a [`Heap`](crate::Heap). It
//! keeps no bookkeeping about what it handed out and never takes memory back.

use std::ptr::{self, NonNull};

use log::trace;

use crate::align::WORD;

/// Extends the memory available to a heap.
///
/// # Safety
///
/// Every span returned by [`grow`](HeapGrower::grow) must be writable for
/// `bytes` bytes, word aligned, disjoint from every span returned before,
/// and must stay valid for as long as the grower is alive.
pub unsafe trait HeapGrower {
  /// Reserves `bytes` more bytes and returns the start of the new span,
  /// or `None` when the environment refuses to grow.
  ///
  /// # Safety
  ///
  /// Not reentrant. Callers must not race two growth requests.
  unsafe fn grow(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>>;
}

/// Grows the process data segment with `sbrk(2)`.
///
/// Memory obtained this way belongs to the process until it exits. Other
/// code moving the break in between calls is tolerated, but the calls
/// themselves must come from a single thread.
#[cfg(feature = "sbrk")]
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

#[cfg(feature = "sbrk")]
impl Sbrk {
  /// Current program break, as reported by `sbrk(0)`.
  pub fn program_break() -> *mut u8 {
    unsafe { libc::sbrk(0) as *mut u8 }
  }
}

#[cfg(feature = "sbrk")]
unsafe impl HeapGrower for Sbrk {
  unsafe fn grow(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>> {
    use libc::{c_void, intptr_t, sbrk};

    let failed = usize::MAX as *mut c_void;

    unsafe {
      let current = sbrk(0);
      if current == failed {
        return None;
      }

      let pad = (current as *mut u8).align_offset(WORD);
      let increment = bytes.checked_add(pad).and_then(|n| intptr_t::try_from(n).ok())?;

      let previous = sbrk(increment);
      if previous == failed {
        trace!("sbrk({increment}) refused");
        return None;
      }
      assert_eq!(previous, current, "program break moved during a growth request");

      trace!("sbrk grew {increment} bytes at {previous:?}");
      NonNull::new((previous as *mut u8).add(pad))
    }
  }
}

/// A fixed-capacity buffer handed out front to back.
///
/// Gives each heap its own address space, which is what tests and bounded
/// arenas want. Exhaustion is reported as a failed growth request.
pub struct Region {
  base: NonNull<usize>,
  words: usize,
  used: usize,
}

impl Region {
  /// Creates a region able to hold `capacity` bytes, rounded up to a word.
  pub fn new(capacity: usize) -> Self {
    let words = capacity.div_ceil(WORD);
    let storage: Box<[usize]> = vec![0usize; words].into_boxed_slice();
    let base = NonNull::new(Box::into_raw(storage) as *mut usize).unwrap_or(NonNull::dangling());

    Self {
      base,
      words,
      used: 0,
    }
  }

  pub fn capacity(&self) -> usize {
    self.words * WORD
  }

  /// Bytes handed out so far.
  pub fn used(&self) -> usize {
    self.used
  }

  pub fn contains(
    &self,
    address: *const u8,
  ) -> bool {
    let start = self.base.as_ptr() as usize;
    let address = address as usize;

    address >= start && address < start + self.capacity()
  }
}

unsafe impl HeapGrower for Region {
  unsafe fn grow(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>> {
    let padded = crate::align::align_up(bytes)?;
    let end = self.used.checked_add(padded)?;

    if end > self.capacity() {
      trace!("region exhausted: {} of {} bytes used, {} requested", self.used, self.capacity(), bytes);
      return None;
    }

    let span = unsafe { (self.base.as_ptr() as *mut u8).add(self.used) };
    self.used = end;

    NonNull::new(span)
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    unsafe {
      drop(Box::from_raw(ptr::slice_from_raw_parts_mut(self.base.as_ptr(), self.words)));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn region_hands_out_consecutive_spans() {
    let mut region = Region::new(128);

    unsafe {
      let a = region.grow(24).unwrap();
      let b = region.grow(10).unwrap();

      assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 24);
      assert_eq!(b.as_ptr() as usize % WORD, 0);
      assert_eq!(region.used(), 24 + crate::align!(10));
      assert!(region.contains(a.as_ptr()));
    }
  }

  #[test]
  fn region_reports_exhaustion() {
    let mut region = Region::new(32);

    unsafe {
      assert!(region.grow(32).is_some());
      assert!(region.grow(1).is_none());
      assert!(region.grow(usize::MAX).is_none());
    }

    assert_eq!(region.used(), 32);
  }

  #[test]
  fn empty_region_never_grows() {
    let mut region = Region::new(0);

    assert_eq!(region.capacity(), 0);
    assert!(unsafe { region.grow(8) }.is_none());
  }
}
