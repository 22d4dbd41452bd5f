//! Builds small LoROM images laid out like the real game for tests.

use crate::rom::{pc_to_snes_addr, RomImage};
use crate::rommap::{RomLayout, ROOM_HEADER_SIZE};

const ROM_SIZE: usize = 0x40000;
const OBJECT_TABLE: usize = 0x20000;
const HEADER_TABLE: usize = 0x21000;
const HEADER_DATA: usize = 0x28000;
const ROOM_DATA: usize = 0x30000;

/// Encodes one room stream: two header bytes, three terminated layers and
/// an optional door list inside the last layer.
pub fn stream(floor: u8, layout: u8, layers: [&[[u8; 3]]; 3], doors: &[(u8, u8)]) -> Vec<u8> {
    let mut data = vec![floor, layout];
    for (i, layer) in layers.iter().enumerate() {
        for obj in layer.iter() {
            data.extend_from_slice(obj);
        }
        if i == 2 && !doors.is_empty() {
            data.extend_from_slice(&[0xf0, 0xff]);
            for &(d1, d2) in doors {
                data.push(d1);
                data.push(d2);
            }
        }
        data.extend_from_slice(&[0xff, 0xff]);
    }
    data
}

/// Type 1 cell for `id` at `(x, y)`.
pub fn cell(id: u8, x: u8, y: u8, size: u8) -> [u8; 3] {
    [(x << 2) | ((size >> 2) & 0x3), (y << 2) | (size & 0x3), id]
}

pub struct TestRom {
    data: Vec<u8>,
    next_room: usize,
    next_header: usize,
    layout: RomLayout,
}

impl TestRom {
    pub fn new() -> TestRom {
        let layout = RomLayout::default();
        let mut rom = TestRom {
            data: vec![0; ROM_SIZE],
            next_room: ROOM_DATA,
            next_header: HEADER_DATA,
            layout: layout,
        };
        let object_pointer = rom.layout.room_object_pointer;
        let header_pointer = rom.layout.room_header_pointer;
        rom.put_long(object_pointer, pc_to_snes_addr(OBJECT_TABLE));
        rom.put_long(header_pointer, pc_to_snes_addr(HEADER_TABLE));
        let bank = rom.layout.room_header_pointer_bank;
        rom.data[bank] = (pc_to_snes_addr(HEADER_DATA) >> 16) as u8;
        rom
    }

    fn put_word(&mut self, offset: usize, value: u16) {
        self.data[offset] = value as u8;
        self.data[offset + 1] = (value >> 8) as u8;
    }

    fn put_long(&mut self, offset: usize, value: u32) {
        self.put_word(offset, value as u16);
        self.data[offset + 2] = (value >> 16) as u8;
    }

    pub fn room_pointer(&mut self, room_id: u16, snes_addr: u32) {
        self.put_long(OBJECT_TABLE + room_id as usize * 3, snes_addr);
    }

    /// Appends a room stream after the previously added one.
    pub fn room(&mut self, room_id: u16, bytes: &[u8]) {
        let at = self.next_room;
        self.data[at..at + bytes.len()].copy_from_slice(bytes);
        self.next_room += bytes.len();
        self.room_pointer(room_id, pc_to_snes_addr(at));
    }

    pub fn header(&mut self, room_id: u16, bytes: &[u8; ROOM_HEADER_SIZE]) {
        let at = self.next_header;
        self.data[at..at + ROOM_HEADER_SIZE].copy_from_slice(bytes);
        self.next_header += ROOM_HEADER_SIZE;
        self.put_word(
            HEADER_TABLE + room_id as usize * 2,
            pc_to_snes_addr(at) as u16,
        );
    }

    /// Header whose only content is the holewarp and staircase rooms.
    pub fn links(&mut self, room_id: u16, holewarp: u8, stairs: [u8; 4]) {
        let mut header = [0u8; ROOM_HEADER_SIZE];
        header[9] = holewarp;
        header[10..14].copy_from_slice(&stairs);
        self.header(room_id, &header);
    }

    pub fn entrance(&mut self, id: usize, room: u16, dungeon: u8, x: u16, y: u16) {
        let layout = self.layout.clone();
        self.put_word(layout.entrance_room + id * 2, room);
        self.put_word(layout.entrance_x_position + id * 2, x);
        self.put_word(layout.entrance_y_position + id * 2, y);
        self.data[layout.entrance_dungeon + id] = dungeon;
    }

    pub fn build(self) -> RomImage {
        RomImage::from_bytes(self.data)
    }

    /// Cuts the image right after the last room added.
    pub fn build_truncated(mut self) -> RomImage {
        self.data.truncate(self.next_room);
        RomImage::without_header_check(self.data)
    }
}
