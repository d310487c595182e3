use thiserror::Error;

/// Recoverable allocation failures.
///
/// Misuse of a pointer (double release, foreign pointer, corrupted header)
/// is not an error value; it panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
  #[error("zero-sized allocation")]
  ZeroSize,
  #[error("out of memory while growing the heap by {requested} bytes")]
  OutOfMemory { requested: usize },
  #[error("allocation size overflows usize")]
  Overflow,
}
