//! # fitalloc - A First-Fit Heap Allocator
//!
//! This crate provides a small general-purpose heap: `allocate`, `release`,
//! `resize` and `zero_allocate` over memory that only ever grows, obtained
//! from `sbrk(2)` or from a private buffer.
//!
//! ## Overview
//!
//! Every block ever carved stays on one chronological chain. Releasing a
//! block flips its flag; allocating scans the chain from the head for the
//! first free block that is strictly larger than the request:
//!
//! ```text
//!   head
//!    │
//!    ▼
//!   ┌────────┬──────────┐   ┌────────┬──────────────────┐   ┌────────┬──────┐
//!   │ hdr 10 │ payload  │──▶│ hdr 20 │     payload      │──▶│ hdr 5  │ ...  │──▶ null
//!   │ free   │          │   │ live   │                  │   │ free   │      │
//!   └────────┴──────────┘   └────────┴──────────────────┘   └────────┴──────┘
//!
//!   allocate(5)  → reuses the first block (10 > 5), size stays 10
//!   allocate(5)  → skips the third block (5 > 5 is false), grows the heap
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fitalloc
//!   ├── align      - Word alignment (align!, align_up)
//!   ├── block      - Block header and payload arithmetic (internal)
//!   ├── grow       - Growth providers (Sbrk, Region)
//!   ├── list       - The block chain and first-fit search
//!   ├── heap       - Heap: allocate, release, resize, zero_allocate
//!   └── memory     - Growable-array helpers (reallocate, grow_array)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitalloc::Heap;
//!
//! let mut heap = Heap::with_region(4096);
//!
//! let a = heap.allocate(10).unwrap();
//! let b = heap.allocate(20).unwrap();
//!
//! unsafe {
//!     heap.release(a.as_ptr());
//!
//!     // First fit: the released 10 byte block is larger than 5.
//!     assert_eq!(heap.allocate(5).unwrap(), a);
//!
//!     // Too small in place, so the contents move.
//!     let c = heap.resize(b.as_ptr(), 30).unwrap();
//!     assert_ne!(b, c);
//! }
//! ```
//!
//! ## Block Layout
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ next: ptr/null  │  │  │     N bytes usable       │  │
//!   │  │ is_free         │  │  │                          │  │
//!   │  │ tag             │  │  └──────────────────────────┘  │
//!   │  └─────────────────┘  │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to the caller
//! ```
//!
//! The header of a block is always found by subtracting the header size from the
//! payload pointer. Each growth request is padded to a machine word so the
//! next header is aligned; payloads are therefore word aligned.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: `Heap` is neither `Send` nor `Sync`, and two
//!   `sbrk`-backed heaps must not be driven from different threads
//! - **No coalescing or splitting**: released blocks are reused whole
//! - **Never shrinks**: memory is not returned to the operating system
//! - **Exact fits are skipped**: reuse requires a strictly larger block
//!
//! ## Errors
//!
//! Exhaustion, zero-sized requests and size overflow come back as
//! [`AllocError`]. Releasing a block twice, or a pointer whose header does
//! not carry a live tag, panics.

pub mod align;
mod block;
mod error;
mod grow;
mod heap;
mod list;
pub mod memory;

pub use block::{HEADER_SIZE, Tag};
pub use error::AllocError;
#[cfg(feature = "sbrk")]
pub use grow::Sbrk;
pub use grow::{HeapGrower, Region};
pub use heap::{Heap, HeapStats};
pub use list::{BlockInfo, Blocks};
