use std::{mem, ptr};

/// Validation marker stored in every header.
///
/// The values are arbitrary bit patterns, chosen so that a header read from
/// memory the heap never wrote is unlikely to pass as valid.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
  /// Freshly carved from a growth request.
  Carved = 0x1234_5678,
  /// Handed out again after a release.
  Reused = 0x7777_7777,
  /// Released, waiting for reuse.
  Released = 0x5555_5555,
}

impl Tag {
  pub fn from_raw(raw: u32) -> Option<Self> {
    match raw {
      0x1234_5678 => Some(Tag::Carved),
      0x7777_7777 => Some(Tag::Reused),
      0x5555_5555 => Some(Tag::Released),
      _ => None,
    }
  }

  pub fn is_live(self) -> bool {
    matches!(self, Tag::Carved | Tag::Reused)
  }
}

/// Header written immediately before every payload.
#[repr(C)]
pub struct Block {
  pub size: usize,
  pub next: *mut Block,
  pub is_free: bool,
  pub tag: u32,
}

pub const HEADER_SIZE: usize = mem::size_of::<Block>();

impl Block {
  pub fn new(size: usize) -> Self {
    Self {
      size,
      next: ptr::null_mut(),
      is_free: false,
      tag: Tag::Carved as u32,
    }
  }

  pub fn tag(&self) -> Option<Tag> {
    Tag::from_raw(self.tag)
  }

  /// Header to payload.
  ///
  /// # Safety
  ///
  /// `block` must point at a header that is followed by its payload within
  /// the same growth span.
  pub unsafe fn payload(block: *mut Block) -> *mut u8 {
    unsafe { (block as *mut u8).add(HEADER_SIZE) }
  }

  /// Payload to header; the exact inverse of [`Block::payload`].
  ///
  /// # Safety
  ///
  /// `payload` must have been produced by [`Block::payload`].
  pub unsafe fn from_payload(payload: *mut u8) -> *mut Block {
    unsafe { payload.sub(HEADER_SIZE) as *mut Block }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_is_word_sized() {
    assert_eq!(HEADER_SIZE % mem::size_of::<usize>(), 0);
    assert_eq!(mem::align_of::<Block>(), mem::align_of::<usize>());
  }

  #[test]
  fn payload_round_trip() {
    let mut storage = [0usize; 8];
    let block = storage.as_mut_ptr() as *mut Block;

    unsafe {
      block.write(Block::new(16));

      let payload = Block::payload(block);
      assert_eq!(payload as usize - block as usize, HEADER_SIZE);
      assert_eq!(Block::from_payload(payload), block);
      assert_eq!((*block).tag(), Some(Tag::Carved));
    }
  }

  #[test]
  fn unknown_tags_are_rejected() {
    assert_eq!(Tag::from_raw(0), None);
    assert_eq!(Tag::from_raw(0xDEAD_BEEF), None);
    assert_eq!(Tag::from_raw(Tag::Released as u32), Some(Tag::Released));
    assert!(!Tag::Released.is_live());
    assert!(Tag::Reused.is_live());
  }
}
