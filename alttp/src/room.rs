use log::{debug, warn};
use num::FromPrimitive;
use num_derive::FromPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::connectivity::Edge;
use crate::error::FormatError;
use crate::object::{self, ObjectEntry};
use crate::rom::{snes_display, snes_to_pc, RomImage};
use crate::rommap::{RomLayout, ROOM_HEADER_SIZE};
use crate::util::RomReader;

pub const LAYER_COUNT: usize = 3;
pub const LAYER_NAMES: [&str; LAYER_COUNT] = ["BG1 Main", "BG2 Overlay", "BG1 Priority"];

const LAYER_END: (u8, u8) = (0xff, 0xff);
const DOOR_MARKER: (u8, u8) = (0xf0, 0xff);

/// Objects that lead to another room.  Their destinations come from the
/// room header, in the order the objects appear in the stream.
pub const STAIRCASE_OBJECTS: [u16; 5] = [0x12d, 0x12e, 0x138, 0x139, 0x13b];
pub const STAIRCASE_SLOTS: usize = 4;

pub const CHEST_OBJECTS: [u16; 6] = [0x0c0, 0x0c1, 0x0c2, 0x0c3, 0x399, 0x3b1];
pub const BIG_CHEST_OBJECTS: [u16; 3] = [0x0c2, 0x0c3, 0x3b1];

#[derive(Clone, Copy, Debug, FromPrimitive, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    North = 0,
    South = 1,
    West = 2,
    East = 3,
}

impl Direction {
    /// Decodes the two direction bits of a door record.
    pub fn from_bits(bits: u8) -> Direction {
        Direction::from_u8(bits & 0x3).unwrap_or(Direction::East)
    }

    /// Offset to the neighboring room on the 16 wide room grid.
    pub fn grid_delta(self) -> i32 {
        match self {
            Direction::North => -16,
            Direction::South => 16,
            Direction::West => -1,
            Direction::East => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Door {
    pub position: u8,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub kind: u8,
    // Filled in by the connectivity pass.
    pub target_room: Option<u16>,
}

impl Door {
    pub fn from_bytes(d1: u8, d2: u8) -> Door {
        Door {
            position: (d1 >> 4) & 0xf,
            direction: Direction::from_bits(d1),
            kind: d2,
            target_room: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Staircase {
    pub object_id: u16,
    pub x: u8,
    pub y: u8,
    pub label: String,
    pub target_room: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chest {
    pub object_id: u16,
    pub x: u8,
    pub y: u8,
    pub big: bool,
}

/// The 14 byte room header found through the second pointer table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RoomHeader {
    pub bg2: u8,
    pub collision: u8,
    pub is_light: bool,
    pub palette: u8,
    pub blockset: u8,
    pub spriteset: u8,
    pub effect: u8,
    pub tag1: u8,
    pub tag2: u8,
    pub staircase_planes: [u8; STAIRCASE_SLOTS],
    pub holewarp: u8,
    pub staircase_rooms: [u8; STAIRCASE_SLOTS],
}

impl RoomHeader {
    pub fn from_bytes(b: &[u8; ROOM_HEADER_SIZE]) -> RoomHeader {
        RoomHeader {
            bg2: (b[0] >> 5) & 0x07,
            collision: (b[0] >> 2) & 0x07,
            is_light: b[0] & 0x01 == 0x01,
            palette: b[1] & 0x3f,
            blockset: b[2],
            spriteset: b[3],
            effect: b[4],
            tag1: b[5],
            tag2: b[6],
            staircase_planes: [(b[7] >> 2) & 0x3, (b[7] >> 4) & 0x3, (b[7] >> 6) & 0x3, b[8] & 0x3],
            holewarp: b[9],
            staircase_rooms: [b[10], b[11], b[12], b[13]],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoomModel {
    pub room_id: u16,
    pub data_address: usize,
    pub floor1: u8,
    pub floor2: u8,
    pub layout: u8,
    pub objects_by_layer: [Vec<ObjectEntry>; LAYER_COUNT],
    pub doors: Vec<Door>,
    pub header: Option<RoomHeader>,
    pub staircases: Vec<Staircase>,
    pub chests: Vec<Chest>,
    // Filled in by the connectivity pass.
    pub neighbors: Vec<Edge>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Compositing {
    pub has_bg2_objects: bool,
    pub bg2_object_count: usize,
    pub same_floor_graphics: bool,
    pub potential_issues: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoomSummary {
    pub room_id: u16,
    pub layer_counts: [usize; LAYER_COUNT],
    pub doors: usize,
    pub floor1: u8,
    pub floor2: u8,
}

impl RoomModel {
    /// All objects in stream order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectEntry> {
        self.objects_by_layer.iter().flat_map(|layer| layer.iter())
    }

    pub fn object_count(&self) -> usize {
        self.objects_by_layer.iter().map(|l| l.len()).sum()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.room_id,
            layer_counts: [
                self.objects_by_layer[0].len(),
                self.objects_by_layer[1].len(),
                self.objects_by_layer[2].len(),
            ],
            doors: self.doors.len(),
            floor1: self.floor1,
            floor2: self.floor2,
        }
    }

    pub fn id_counts(&self, layer: usize) -> BTreeMap<u16, usize> {
        let mut counts = BTreeMap::new();
        if let Some(objects) = self.objects_by_layer.get(layer) {
            for obj in objects {
                *counts.entry(obj.id).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn compositing(&self) -> Compositing {
        let bg2_object_count = self.objects_by_layer[1].len();
        let has_bg2_objects = bg2_object_count > 0;
        let same_floor_graphics = self.floor1 == self.floor2;

        let mut potential_issues = Vec::new();
        if has_bg2_objects && same_floor_graphics {
            potential_issues.push(
                "BG2 overlay objects with same floor graphics - may have compositing issues"
                    .to_string(),
            );
        }

        Compositing {
            has_bg2_objects: has_bg2_objects,
            bg2_object_count: bg2_object_count,
            same_floor_graphics: same_floor_graphics,
            potential_issues: potential_issues,
        }
    }

    /// Rebuilds the staircase and chest lists from the objects and header.
    fn collect_special_objects(&mut self) {
        let mut staircases = Vec::new();
        let mut chests = Vec::new();

        for obj in self.objects() {
            if STAIRCASE_OBJECTS.contains(&obj.id) {
                let slot = staircases.len();
                // A zero slot has no destination.
                let label = match &self.header {
                    Some(header)
                        if slot < STAIRCASE_SLOTS && header.staircase_rooms[slot] != 0 =>
                    {
                        format!("To {}", header.staircase_rooms[slot])
                    }
                    _ => "To ???".to_string(),
                };
                staircases.push(Staircase {
                    object_id: obj.id,
                    x: obj.x,
                    y: obj.y,
                    label: label,
                    target_room: None,
                });
            } else if CHEST_OBJECTS.contains(&obj.id) {
                chests.push(Chest {
                    object_id: obj.id,
                    x: obj.x,
                    y: obj.y,
                    big: BIG_CHEST_OBJECTS.contains(&obj.id),
                });
            }
        }

        self.staircases = staircases;
        self.chests = chests;
    }
}

/// Reads rooms out of the two room pointer tables.  Holds nothing but
/// borrowed references, so parsing the same room twice gives the same model.
pub struct RoomParser<'a> {
    rom: &'a RomImage,
    layout: &'a RomLayout,
}

impl<'a> RoomParser<'a> {
    pub fn new(rom: &'a RomImage, layout: &'a RomLayout) -> RoomParser<'a> {
        RoomParser {
            rom: rom,
            layout: layout,
        }
    }

    /// File offset of a room's object stream.
    pub fn room_data_address(&self, room_id: u16) -> Result<usize, FormatError> {
        let table = self.rom.follow_long(self.layout.room_object_pointer)?;
        self.rom.follow_long(table + room_id as usize * 3)
    }

    /// File offset of a room's header.
    pub fn room_header_address(&self, room_id: u16) -> Result<usize, FormatError> {
        let table = self.rom.follow_long(self.layout.room_header_pointer)?;
        let bank = self.rom.read_u8(self.layout.room_header_pointer_bank)? as u32;
        let offset = self.rom.read_u16le(table + room_id as usize * 2)? as u32;
        Ok(snes_to_pc((bank << 16) | offset))
    }

    pub fn parse_header(&self, room_id: u16) -> Result<RoomHeader, FormatError> {
        let mut r = self.rom.reader(self.room_header_address(room_id)?);
        let mut b = [0u8; ROOM_HEADER_SIZE];
        for byte in b.iter_mut() {
            *byte = r.byte()?;
        }
        Ok(RoomHeader::from_bytes(&b))
    }

    /// Parses a room's object stream.  The header is optional extra data:
    /// if it can't be read the room is still returned, with `header: None`
    /// and every staircase labelled as unknown.
    pub fn parse(&self, room_id: u16) -> Result<RoomModel, FormatError> {
        let data_address = self.room_data_address(room_id)?;
        debug!(
            "room 0x{:03x}: data at 0x{:06x} ({})",
            room_id,
            data_address,
            snes_display(data_address)
        );
        let mut r = self.rom.reader(data_address);

        let floor_byte = r.byte()?;
        let layout_byte = r.byte()?;

        let mut objects_by_layer: [Vec<ObjectEntry>; LAYER_COUNT] = Default::default();
        let mut doors = Vec::new();
        let mut layer = 0;

        loop {
            let unterminated = FormatError::UnterminatedRoom {
                room_id: room_id,
                layer: layer,
            };
            let (b1, b2) = r.peek_pair().ok_or(unterminated)?;

            if (b1, b2) == LAYER_END {
                r.skip(2);
                layer += 1;
                if layer >= LAYER_COUNT {
                    break;
                }
            } else if (b1, b2) == DOOR_MARKER {
                r.skip(2);
                parse_doors(&mut r, room_id, layer, &mut doors)?;
            } else {
                r.skip(2);
                let b3 = r.byte().map_err(|_| FormatError::UnterminatedRoom {
                    room_id: room_id,
                    layer: layer,
                })?;
                objects_by_layer[layer].push(object::decode(b1, b2, b3, layer as u8));
            }
        }

        let header = match self.parse_header(room_id) {
            Ok(header) => Some(header),
            Err(e) => {
                warn!("room 0x{:03x}: no header: {}", room_id, e);
                None
            }
        };

        let mut room = RoomModel {
            room_id: room_id,
            data_address: data_address,
            floor1: floor_byte & 0x0f,
            floor2: (floor_byte >> 4) & 0x0f,
            layout: (layout_byte >> 2) & 0x07,
            objects_by_layer: objects_by_layer,
            doors: doors,
            header: header,
            staircases: Vec::new(),
            chests: Vec::new(),
            neighbors: Vec::new(),
        };
        room.collect_special_objects();

        Ok(room)
    }
}

// The door list has no terminator of its own.  It ends at the next layer
// terminator, which is left in the stream for the caller to consume.
fn parse_doors(
    r: &mut RomReader,
    room_id: u16,
    layer: usize,
    doors: &mut Vec<Door>,
) -> Result<(), FormatError> {
    loop {
        let (d1, d2) = r.peek_pair().ok_or(FormatError::UnterminatedRoom {
            room_id: room_id,
            layer: layer,
        })?;
        if (d1, d2) == LAYER_END {
            return Ok(());
        }
        r.skip(2);
        doors.push(Door::from_bytes(d1, d2));
    }
}
