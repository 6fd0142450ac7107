pub mod arm;

#[allow(clippy::cast_lossless)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::module_name_repetitions)]
pub mod armv5t;
pub mod condition;
pub mod cpu_modes;
pub mod exception;

#[allow(clippy::cast_possible_truncation)]
pub mod flags;
pub mod psr;
pub mod register_bank;
