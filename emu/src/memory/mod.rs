//! # Memory
//!
//! A flat, fixed-capacity byte store addressed from 0.
//!
//! Multi-byte values are composed from byte accesses in the order given by an
//! explicit [`Endianness`], which describes the *simulated* target and is
//! independent of the host. Accesses are not required to be aligned.
//!
//! Any access that reaches past the end of the store fails with
//! [`MemoryError::OutOfBounds`] before a single byte is touched.

pub mod internal_memory;
pub mod io_device;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Byte order used to compose halfwords and words.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endianness {
    /// Least significant byte at the lowest address.
    #[default]
    Little,

    /// Most significant byte at the lowest address.
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("access of {width} byte(s) at 0x{address:08X} is outside memory of {size} bytes")]
    OutOfBounds {
        address: u32,
        width: usize,
        size: usize,
    },
}
