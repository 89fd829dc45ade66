mod buffer;
pub mod codec;
pub mod layout;
mod space;

pub use buffer::ByteBuffer;
pub use layout::{cartridge, header, irq, rom_address, rom_offset};
pub use space::*;
