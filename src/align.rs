//! Word alignment for growth requests.
//!
//! Every span handed out by a [`HeapGrower`](crate::HeapGrower) starts with a
//! block header, so spans are padded to a multiple of the
//! machine word to keep the *next* header aligned as well.

use std::mem;

/// Rounds a value up to the next multiple of the machine word.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use fitalloc::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::std::mem::size_of::<usize>() - 1) & !(::std::mem::size_of::<usize>() - 1)
  };
}

pub const WORD: usize = mem::size_of::<usize>();

/// Checked form of [`align!`]; `None` when rounding would overflow `usize`.
pub const fn align_up(value: usize) -> Option<usize> {
  match value.checked_add(WORD - 1) {
    Some(padded) => Some(padded & !(WORD - 1)),
    None => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align() {
    for i in 0..10 {
      let expected = WORD * (i + 1);

      for size in (WORD * i + 1)..=(WORD * (i + 1)) {
        assert_eq!(expected, align!(size));
        assert_eq!(Some(expected), align_up(size));
      }
    }
  }

  #[test]
  fn align_up_zero_and_overflow() {
    assert_eq!(align_up(0), Some(0));
    assert_eq!(align_up(usize::MAX), None);
    assert_eq!(align_up(usize::MAX - WORD + 1), Some(usize::MAX - WORD + 1));
  }
}
