use super::MemoryError;

/// Something that can be read and written one cell at a time.
pub trait IoDevice {
    type Address;
    type Value;

    fn read_at(&self, address: Self::Address) -> Result<Self::Value, MemoryError>;

    fn write_at(&mut self, address: Self::Address, value: Self::Value) -> Result<(), MemoryError>;
}
