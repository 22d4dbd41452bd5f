use byteorder::{LittleEndian, ReadBytesExt};
use std::io;
use std::io::prelude::*;
use std::io::Cursor;

use crate::error::FormatError;

/// A cursor over the ROM that remembers where in the file it started, so
/// errors and listings can report absolute addresses.
pub struct RomReader<'a> {
    cursor: Cursor<&'a [u8]>,
    base_offset: usize,
    rom_len: usize,
}

impl<'a> RomReader<'a> {
    pub fn new(data: &'a [u8], base_offset: usize) -> RomReader<'a> {
        let start = base_offset.min(data.len());
        RomReader {
            cursor: Cursor::new(&data[start..]),
            base_offset: base_offset,
            rom_len: data.len(),
        }
    }

    pub fn cur_address(&self) -> usize {
        self.base_offset + self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.rom_len.saturating_sub(self.cur_address())
    }

    /// Looks at the next two bytes without consuming them.
    pub fn peek_pair(&self) -> Option<(u8, u8)> {
        let data = self.cursor.get_ref();
        let pos = self.cursor.position() as usize;
        match (data.get(pos), data.get(pos + 1)) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn skip(&mut self, n: usize) {
        let pos = self.cursor.position();
        self.cursor.set_position(pos + n as u64);
    }

    fn truncated(&self, len: usize) -> FormatError {
        FormatError::Truncated {
            offset: self.cur_address(),
            len: len,
            rom_len: self.rom_len,
        }
    }

    pub fn byte(&mut self) -> Result<u8, FormatError> {
        if self.remaining() < 1 {
            return Err(self.truncated(1));
        }
        self.cursor.read_u8().map_err(|_| self.truncated(1))
    }

    pub fn word(&mut self) -> Result<u16, FormatError> {
        if self.remaining() < 2 {
            return Err(self.truncated(2));
        }
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.truncated(2))
    }

    pub fn long(&mut self) -> Result<u32, FormatError> {
        if self.remaining() < 3 {
            return Err(self.truncated(3));
        }
        self.cursor
            .read_u24::<LittleEndian>()
            .map_err(|_| self.truncated(3))
    }
}

impl<'a> Read for RomReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_reader() {
        let data = [
            0x0, 0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0x8, 0x9, 0xa, 0xb, 0xc, 0xd, 0xe, 0xf,
        ];

        let mut r = RomReader::new(&data, 0x4);
        assert_eq!(r.cur_address(), 0x4);

        let mut rdata = [0; 4];
        let size = r.read(&mut rdata).unwrap();
        assert_eq!(size, 4);
        assert_eq!(rdata, [0x4, 0x5, 0x6, 0x7]);
        assert_eq!(r.cur_address(), 0x8);

        assert_eq!(r.peek_pair(), Some((0x8, 0x9)));
        assert_eq!(r.word().unwrap(), 0x0908);
        assert_eq!(r.long().unwrap(), 0x0c0b0a);
        assert_eq!(r.remaining(), 3);
    }

    #[test]
    fn reads_past_end_are_truncated() {
        let data = [0xff, 0xff];
        let mut r = RomReader::new(&data, 1);
        assert_eq!(
            r.word(),
            Err(FormatError::Truncated {
                offset: 1,
                len: 2,
                rom_len: 2
            })
        );
        assert_eq!(r.peek_pair(), None);
        assert_eq!(r.byte().unwrap(), 0xff);
        assert!(r.byte().is_err());
    }

    #[test]
    fn start_past_end() {
        let data = [0u8; 4];
        let r = RomReader::new(&data, 10);
        assert_eq!(r.remaining(), 0);
        assert_eq!(r.peek_pair(), None);
    }
}
