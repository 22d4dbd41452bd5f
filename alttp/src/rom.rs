use log::info;
use std::fs;
use std::path::Path;

use crate::error::{FormatError, RomError};
use crate::util::RomReader;

/// Size of the header some copiers prepend to dumps.
pub const COPIER_HEADER_SIZE: usize = 0x200;

/// Converts a LoROM SNES address to a file offset.  Addresses below $8000 in
/// a bank are not ROM; they fall back to a plain 22 bit mask.
pub fn snes_to_pc(snes_addr: u32) -> usize {
    let mut bank = (snes_addr >> 16) & 0xff;
    let offset = snes_addr & 0xffff;

    if bank >= 0x80 {
        bank -= 0x80;
    }

    if offset >= 0x8000 {
        (bank * 0x8000 + (offset - 0x8000)) as usize
    } else {
        (snes_addr & 0x3f_ffff) as usize
    }
}

/// Inverse of `snes_to_pc` for ROM addresses.  Returns `(bank, offset)`.
pub fn pc_to_snes(pc_addr: usize) -> (u8, u16) {
    let bank = ((pc_addr >> 15) & 0xff) as u8;
    let offset = ((pc_addr & 0x7fff) | 0x8000) as u16;
    (bank, offset)
}

/// Packs `pc_to_snes` into a single 24 bit address.
pub fn pc_to_snes_addr(pc_addr: usize) -> u32 {
    let (bank, offset) = pc_to_snes(pc_addr);
    ((bank as u32) << 16) | offset as u32
}

/// `pc_to_snes` written the way a debugger shows it, e.g. `$01:8200`.
pub fn snes_display(pc_addr: usize) -> String {
    let (bank, offset) = pc_to_snes(pc_addr);
    format!("${:02X}:{:04X}", bank, offset)
}

/// Read-only image of a cartridge dump with any copier header removed.
#[derive(Debug)]
pub struct RomImage {
    data: Vec<u8>,
    has_header: bool,
}

impl RomImage {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RomImage, RomError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| RomError::Io {
            path: path.display().to_string(),
            cause: e,
        })?;
        let rom = RomImage::from_bytes(data);
        info!(
            "loaded {} (0x{:x} bytes, copier header: {})",
            path.display(),
            rom.len(),
            rom.has_header()
        );
        Ok(rom)
    }

    pub fn from_bytes(mut data: Vec<u8>) -> RomImage {
        let has_header = data.len() % 1024 == COPIER_HEADER_SIZE;
        if has_header {
            data.drain(..COPIER_HEADER_SIZE);
        }
        RomImage {
            data: data,
            has_header: has_header,
        }
    }

    #[cfg(test)]
    pub(crate) fn without_header_check(data: Vec<u8>) -> RomImage {
        RomImage {
            data: data,
            has_header: false,
        }
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn reader(&self, offset: usize) -> RomReader<'_> {
        RomReader::new(&self.data, offset)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, FormatError> {
        self.reader(offset).byte()
    }

    pub fn read_u16le(&self, offset: usize) -> Result<u16, FormatError> {
        self.reader(offset).word()
    }

    pub fn read_u24le(&self, offset: usize) -> Result<u32, FormatError> {
        self.reader(offset).long()
    }

    /// Follows a 24 bit pointer stored at `offset` and returns the file
    /// offset it points to.
    pub fn follow_long(&self, offset: usize) -> Result<usize, FormatError> {
        Ok(snes_to_pc(self.read_u24le(offset)?))
    }
}
