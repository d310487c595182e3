use std::{fmt, ptr::{self, NonNull}};

use log::{debug, trace};

use crate::{
  align::align_up,
  block::{Block, HEADER_SIZE, Tag},
  error::AllocError,
  grow::{HeapGrower, Region},
  list::{BlockList, Blocks},
};

#[cfg(feature = "sbrk")]
use crate::grow::Sbrk;

/// A first-fit heap over memory obtained from a [`HeapGrower`].
///
/// The heap holds raw pointers into its own memory and is therefore neither
/// `Send` nor `Sync`: one heap is driven by exactly one thread.
pub struct Heap<G: HeapGrower> {
  grower: G,
  blocks: BlockList,
}

/// Totals over every block in a heap.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
  pub blocks: usize,
  pub free_blocks: usize,
  pub live_bytes: usize,
  pub free_bytes: usize,
}

#[cfg(feature = "sbrk")]
impl Heap<Sbrk> {
  /// A heap that grows the process data segment.
  pub fn new() -> Self {
    Self::with_grower(Sbrk)
  }
}

#[cfg(feature = "sbrk")]
impl Default for Heap<Sbrk> {
  fn default() -> Self {
    Self::new()
  }
}

impl Heap<Region> {
  /// A heap confined to a private buffer of `capacity` bytes.
  pub fn with_region(capacity: usize) -> Self {
    Self::with_grower(Region::new(capacity))
  }
}

impl<G: HeapGrower> Heap<G> {
  pub fn with_grower(grower: G) -> Self {
    Self {
      grower,
      blocks: BlockList::new(),
    }
  }

  pub fn grower(&self) -> &G {
    &self.grower
  }

  /// True until the first block is carved.
  pub fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  /// Returns a payload of at least `size` bytes.
  ///
  /// Reuses the first released block strictly larger than `size`, otherwise
  /// grows the heap by one block of exactly `size` usable bytes. A reused
  /// block keeps its original size.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if size == 0 {
      return Err(AllocError::ZeroSize);
    }

    unsafe {
      let search = self.blocks.find_free_block(size);

      let block = if search.found.is_null() {
        self.request_space(search.last, size)?
      } else {
        let block = search.found;
        (*block).is_free = false;
        (*block).tag = Tag::Reused as u32;
        trace!("reusing {} byte block at {:?} for {} bytes", (*block).size, block, size);
        block
      };

      Ok(NonNull::new_unchecked(Block::payload(block)))
    }
  }

  /// Marks the block behind `ptr` free. A null pointer is ignored.
  ///
  /// The block stays linked and keeps its memory.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a payload returned by this heap.
  ///
  /// # Panics
  ///
  /// On a double release or a header whose tag is not a live tag.
  pub unsafe fn release(
    &mut self,
    ptr: *mut u8,
  ) {
    if ptr.is_null() {
      return;
    }

    unsafe {
      let block = Block::from_payload(ptr);

      assert!(!(*block).is_free, "double release of {ptr:?}");
      assert!(
        (*block).tag().is_some_and(Tag::is_live),
        "release of {ptr:?} with invalid header tag {:#x}",
        (*block).tag
      );

      (*block).is_free = true;
      (*block).tag = Tag::Released as u32;
      trace!("released {} bytes at {ptr:?}", (*block).size);
    }
  }

  /// Resizes the payload at `ptr` to hold `new_size` bytes.
  ///
  /// A block that is already large enough is returned unchanged. Otherwise
  /// the old contents move to a fresh allocation and the old block is
  /// released. On failure the original block is left untouched.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a live payload returned by this heap.
  pub unsafe fn resize(
    &mut self,
    ptr: *mut u8,
    new_size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let Some(current) = NonNull::new(ptr) else {
      return self.allocate(new_size);
    };

    unsafe {
      let old_size = (*Block::from_payload(ptr)).size;
      if old_size >= new_size {
        return Ok(current);
      }

      let moved = self.allocate(new_size)?;
      ptr::copy_nonoverlapping(ptr, moved.as_ptr(), old_size);
      self.release(ptr);

      trace!("moved {old_size} bytes from {ptr:?} to {moved:?} for {new_size} bytes");
      Ok(moved)
    }
  }

  /// Allocates room for `count` elements of `size` bytes, all zeroed.
  ///
  /// The whole payload is zeroed, including any slack left in a reused
  /// block that is larger than requested.
  pub fn zero_allocate(
    &mut self,
    count: usize,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let total = count.checked_mul(size).ok_or(AllocError::Overflow)?;
    let payload = self.allocate(total)?;

    unsafe {
      let block = Block::from_payload(payload.as_ptr());
      ptr::write_bytes(payload.as_ptr(), 0, (*block).size);
    }

    Ok(payload)
  }

  /// Every block in creation order.
  pub fn blocks(&self) -> Blocks<'_> {
    self.blocks.iter()
  }

  pub fn stats(&self) -> HeapStats {
    self.blocks().fold(HeapStats::default(), |mut stats, info| {
      stats.blocks += 1;
      if info.is_free {
        stats.free_blocks += 1;
        stats.free_bytes += info.size;
      } else {
        stats.live_bytes += info.size;
      }
      stats
    })
  }

  /// Carves a new block of `size` usable bytes and links it after `last`.
  unsafe fn request_space(
    &mut self,
    last: *mut Block,
    size: usize,
  ) -> Result<*mut Block, AllocError> {
    let bytes = HEADER_SIZE
      .checked_add(size)
      .and_then(align_up)
      .ok_or(AllocError::Overflow)?;

    unsafe {
      let span = self
        .grower
        .grow(bytes)
        .ok_or(AllocError::OutOfMemory { requested: bytes })?;

      let block = span.as_ptr() as *mut Block;
      block.write(Block::new(size));
      self.blocks.append(last, block);

      debug!("carved {size} byte block at {block:?} ({bytes} bytes reserved)");
      Ok(block)
    }
  }
}

impl<G: HeapGrower> fmt::Debug for Heap<G> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Heap").field("stats", &self.stats()).finish()
  }
}
