use log::warn;
use serde::Serialize;

use crate::error::FormatError;
use crate::rom::RomImage;
use crate::rommap::RomLayout;

/// One row of the dungeon entrance tables.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entrance {
    pub id: u8,
    pub room_id: u16,
    pub dungeon_id: u8,
    pub x: u16,
    pub y: u16,
}

impl Entrance {
    /// The room the entrance drops the player into.  The high byte of the
    /// table entry isn't part of the room id.
    pub fn start_room(&self) -> u16 {
        self.room_id & 0xff
    }
}

#[derive(Debug, Default)]
pub struct EntranceTable {
    entrances: Vec<Entrance>,
}

impl EntranceTable {
    pub fn read(rom: &RomImage, layout: &RomLayout, id: u8) -> Result<Entrance, FormatError> {
        let i = id as usize;
        Ok(Entrance {
            id: id,
            room_id: rom.read_u16le(layout.entrance_room + i * 2)?,
            dungeon_id: rom.read_u8(layout.entrance_dungeon + i)?,
            x: rom.read_u16le(layout.entrance_x_position + i * 2)?,
            y: rom.read_u16le(layout.entrance_y_position + i * 2)?,
        })
    }

    /// Reads every entrance the layout describes, skipping unreadable rows.
    pub fn load(rom: &RomImage, layout: &RomLayout) -> EntranceTable {
        let mut entrances = Vec::new();
        for id in 0..layout.entrance_count {
            let id = id as u8;
            match EntranceTable::read(rom, layout, id) {
                Ok(entrance) => entrances.push(entrance),
                Err(e) => warn!("entrance 0x{:02x}: {}", id, e),
            }
        }
        EntranceTable {
            entrances: entrances,
        }
    }

    pub fn get(&self, id: u8) -> Option<&Entrance> {
        self.entrances.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entrance> {
        self.entrances.iter()
    }

    pub fn len(&self) -> usize {
        self.entrances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rommap::NUMBER_OF_ENTRANCES;
    use crate::testrom::TestRom;

    #[test]
    fn reads_rows() {
        let mut rom = TestRom::new();
        rom.entrance(0x08, 0x00c9, 0x04, 0x1278, 0x1d50);
        let rom = rom.build();
        let layout = RomLayout::default();

        let e = EntranceTable::read(&rom, &layout, 0x08).unwrap();
        assert_eq!(
            e,
            Entrance {
                id: 0x08,
                room_id: 0xc9,
                dungeon_id: 0x04,
                x: 0x1278,
                y: 0x1d50,
            }
        );
    }

    #[test]
    fn start_room_drops_high_byte() {
        let e = Entrance {
            id: 0,
            room_id: 0x0112,
            dungeon_id: 0,
            x: 0,
            y: 0,
        };
        assert_eq!(e.start_room(), 0x12);
    }

    #[test]
    fn load_all() {
        let mut rom = TestRom::new();
        rom.entrance(0x84, 0x0012, 0x02, 0, 0);
        let rom = rom.build();
        let table = EntranceTable::load(&rom, &RomLayout::default());
        assert_eq!(table.len(), NUMBER_OF_ENTRANCES);
        assert_eq!(table.get(0x84).unwrap().room_id, 0x12);
        assert!(table.get(0x85).is_none());
    }

    #[test]
    fn load_skips_truncated_rows() {
        let rom = RomImage::from_bytes(vec![0; 0x15000]);
        let table = EntranceTable::load(&rom, &RomLayout::default());
        // The room ids fit but the dungeon ids at 0x1548b don't.
        assert!(table.is_empty());
    }
}
