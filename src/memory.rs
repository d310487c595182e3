//! Growable-array helpers layered over [`Heap::resize`].
//!
//! Dynamic arrays keep a capacity, double it with [`grow_capacity`] when
//! full, and hand the old and new byte sizes to [`reallocate`]. A new size
//! of zero frees the array.

use std::{mem, ptr};

use log::trace;

use crate::{error::AllocError, grow::HeapGrower, heap::Heap};

/// Smallest non-zero capacity a growing array jumps to.
pub const MIN_CAPACITY: usize = 8;

pub fn grow_capacity(capacity: usize) -> usize {
  if capacity < MIN_CAPACITY {
    MIN_CAPACITY
  } else {
    capacity.saturating_mul(2)
  }
}

/// Grows, shrinks or frees an array payload.
///
/// `new_size == 0` releases `ptr` and returns null. Anything else resizes,
/// so a null `ptr` allocates.
///
/// # Safety
///
/// `ptr` must be null or a live payload returned by `heap`.
pub unsafe fn reallocate<G: HeapGrower>(
  heap: &mut Heap<G>,
  ptr: *mut u8,
  old_size: usize,
  new_size: usize,
) -> Result<*mut u8, AllocError> {
  trace!("reallocate {ptr:?}: {old_size} -> {new_size} bytes");

  if new_size == 0 {
    unsafe { heap.release(ptr) };
    return Ok(ptr::null_mut());
  }

  unsafe { heap.resize(ptr, new_size) }.map(|moved| moved.as_ptr())
}

/// Typed [`reallocate`] from `old_count` to `new_count` elements of `T`.
///
/// # Safety
///
/// As for [`reallocate`]. The returned pointer is only as aligned as a
/// heap payload, which is one machine word.
pub unsafe fn grow_array<T, G: HeapGrower>(
  heap: &mut Heap<G>,
  ptr: *mut T,
  old_count: usize,
  new_count: usize,
) -> Result<*mut T, AllocError> {
  debug_assert!(mem::align_of::<T>() <= mem::align_of::<usize>());

  let old_size = old_count.checked_mul(mem::size_of::<T>()).ok_or(AllocError::Overflow)?;
  let new_size = new_count.checked_mul(mem::size_of::<T>()).ok_or(AllocError::Overflow)?;

  unsafe { reallocate(heap, ptr as *mut u8, old_size, new_size) }.map(|moved| moved as *mut T)
}

/// Releases an array allocated through [`grow_array`].
///
/// # Safety
///
/// As for [`reallocate`].
pub unsafe fn free_array<T, G: HeapGrower>(
  heap: &mut Heap<G>,
  ptr: *mut T,
  old_count: usize,
) {
  let old_size = old_count.saturating_mul(mem::size_of::<T>());

  unsafe { heap.release(ptr as *mut u8) };
  trace!("freed array {ptr:?} of {old_size} bytes");
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn capacity_doubles_from_eight() {
    assert_eq!(grow_capacity(0), 8);
    assert_eq!(grow_capacity(7), 8);
    assert_eq!(grow_capacity(8), 16);
    assert_eq!(grow_capacity(100), 200);
    assert_eq!(grow_capacity(usize::MAX), usize::MAX);
  }

  #[test]
  fn array_grows_and_keeps_contents() {
    let mut heap = Heap::with_region(4096);
    let mut code: *mut u8 = ptr::null_mut();
    let mut capacity = 0;

    unsafe {
      for (count, byte) in (0u8..40).enumerate() {
        if capacity < count + 1 {
          let old = capacity;
          capacity = grow_capacity(old);
          code = grow_array(&mut heap, code, old, capacity).unwrap();
        }
        code.add(count).write(byte);
      }

      for i in 0..40 {
        assert_eq!(*code.add(i), i as u8);
      }

      free_array(&mut heap, code, capacity);
    }

    assert_eq!(capacity, 64);
    let stats = heap.stats();
    assert_eq!(stats.blocks, 4);
    assert_eq!(stats.free_blocks, 4);
  }

  #[test]
  fn zero_size_frees() {
    let mut heap = Heap::with_region(256);

    unsafe {
      let lines = grow_array::<i32, _>(&mut heap, ptr::null_mut(), 0, 8).unwrap();
      lines.write(123);

      let freed = reallocate(&mut heap, lines as *mut u8, 32, 0).unwrap();
      assert!(freed.is_null());
    }

    assert_eq!(heap.stats().free_blocks, 1);
  }

  #[test]
  fn element_count_overflow() {
    let mut heap = Heap::with_region(64);

    let result = unsafe { grow_array::<u64, _>(&mut heap, ptr::null_mut(), 0, usize::MAX) };
    assert_eq!(result, Err(AllocError::Overflow));
  }
}
