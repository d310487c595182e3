use std::{marker::PhantomData, ptr};

use crate::block::{Block, Tag};

/// Outcome of a first-fit scan.
pub struct Search {
  /// First free block strictly larger than the request, or null.
  pub found: *mut Block,
  /// Last block visited before the scan stopped; null only for an empty list.
  pub last: *mut Block,
}

/// The chain of every block ever carved, free or live, in creation order.
///
/// Blocks are never unlinked. Releasing one only flips its flag.
pub struct BlockList {
  head: *mut Block,
}

impl BlockList {
  pub const fn new() -> Self {
    Self {
      head: ptr::null_mut(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_null()
  }

  /// Scans from the head for the first free block with `size > min_size`.
  ///
  /// A free block whose size equals `min_size` is skipped.
  ///
  /// # Safety
  ///
  /// Every linked block must still be a valid header.
  pub unsafe fn find_free_block(
    &self,
    min_size: usize,
  ) -> Search {
    unsafe {
      let mut last: *mut Block = ptr::null_mut();
      let mut current: *mut Block = self.head;

      while !current.is_null() {
        if (*current).is_free && (*current).size > min_size {
          break;
        }
        last = current;
        current = (*current).next;
      }

      Search { found: current, last }
    }
  }

  /// Links `block` after `last`, or makes it the head when `last` is null.
  ///
  /// # Safety
  ///
  /// `last` must be the tail of this list (or null for an empty list) and
  /// `block` a freshly written header whose `next` is null.
  pub unsafe fn append(
    &mut self,
    last: *mut Block,
    block: *mut Block,
  ) {
    if last.is_null() {
      debug_assert!(self.head.is_null());
      self.head = block;
    } else {
      unsafe {
        debug_assert!((*last).next.is_null());
        (*last).next = block;
      }
    }
  }

  pub fn iter(&self) -> Blocks<'_> {
    Blocks {
      current: self.head,
      _list: PhantomData,
    }
  }
}

impl Default for BlockList {
  fn default() -> Self {
    Self::new()
  }
}

/// Snapshot of one block, as seen by [`Heap::blocks`](crate::Heap::blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  pub payload: *mut u8,
  pub size: usize,
  pub is_free: bool,
  pub tag: Option<Tag>,
}

pub struct Blocks<'a> {
  current: *mut Block,
  _list: PhantomData<&'a BlockList>,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<Self::Item> {
    if self.current.is_null() {
      return None;
    }

    unsafe {
      let block = self.current;
      self.current = (*block).next;

      Some(BlockInfo {
        payload: Block::payload(block),
        size: (*block).size,
        is_free: (*block).is_free,
        tag: (*block).tag(),
      })
    }
  }
}
