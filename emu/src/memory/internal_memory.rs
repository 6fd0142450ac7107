use serde::{Deserialize, Serialize};

use super::io_device::IoDevice;
use super::{Endianness, MemoryError};

/// The simulated address space: `size` bytes starting at address 0.
#[derive(Clone, Serialize, Deserialize)]
pub struct InternalMemory {
    data: Vec<u8>,
}

impl InternalMemory {
    /// Creates a zero-filled memory of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the index of the first byte of an access of `width` bytes,
    /// or an error if any of those bytes falls outside the store.
    fn checked_range(&self, address: u32, width: usize) -> Result<usize, MemoryError> {
        let start = address as usize;
        match start.checked_add(width) {
            Some(end) if end <= self.data.len() => Ok(start),
            _ => Err(MemoryError::OutOfBounds {
                address,
                width,
                size: self.data.len(),
            }),
        }
    }

    fn read_bytes<const N: usize>(&self, address: u32) -> Result<[u8; N], MemoryError> {
        let start = self.checked_range(address, N)?;
        let mut bytes = [0; N];
        bytes.copy_from_slice(&self.data[start..start + N]);
        Ok(bytes)
    }

    fn write_bytes<const N: usize>(
        &mut self,
        address: u32,
        bytes: [u8; N],
    ) -> Result<(), MemoryError> {
        let start = self.checked_range(address, N)?;
        self.data[start..start + N].copy_from_slice(&bytes);
        Ok(())
    }

    pub fn read_byte(&self, address: u32) -> Result<u8, MemoryError> {
        self.read_at(address)
    }

    pub fn read_half_word(&self, address: u32, endianness: Endianness) -> Result<u16, MemoryError> {
        let bytes = self.read_bytes::<2>(address)?;
        Ok(match endianness {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_word(&self, address: u32, endianness: Endianness) -> Result<u32, MemoryError> {
        let bytes = self.read_bytes::<4>(address)?;
        Ok(match endianness {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.write_at(address, value)
    }

    pub fn write_half_word(
        &mut self,
        address: u32,
        value: u16,
        endianness: Endianness,
    ) -> Result<(), MemoryError> {
        let bytes = match endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes(address, bytes)
    }

    pub fn write_word(
        &mut self,
        address: u32,
        value: u32,
        endianness: Endianness,
    ) -> Result<(), MemoryError> {
        let bytes = match endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes(address, bytes)
    }

    /// Copies a raw image into memory starting at `address`.
    /// Nothing is written if the image does not fit.
    pub fn load(&mut self, address: u32, image: &[u8]) -> Result<(), MemoryError> {
        let start = self.checked_range(address, image.len())?;
        self.data[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }
}

impl IoDevice for InternalMemory {
    type Address = u32;
    type Value = u8;

    fn read_at(&self, address: Self::Address) -> Result<Self::Value, MemoryError> {
        let index = self.checked_range(address, 1)?;
        Ok(self.data[index])
    }

    fn write_at(&mut self, address: Self::Address, value: Self::Value) -> Result<(), MemoryError> {
        let index = self.checked_range(address, 1)?;
        self.data[index] = value;
        Ok(())
    }
}
