use serde::{Serialize, Serializer};
use std::borrow::Cow;

use crate::error::FormatError;
use crate::rom::RomImage;
use crate::rommap::RomLayout;

/// The three bit packings used for objects in a room's stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectType {
    // xxxxxxss yyyyyyss iiiiiiii
    Type1 = 1,
    // 111111xx xxxxyyyy yyiiiiii
    Type2 = 2,
    // xxxxxxii yyyyyyii 11111iii
    Type3 = 3,
}

impl Serialize for ObjectType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectEntry {
    #[serde(rename = "type")]
    pub ty: ObjectType,
    pub id: u16,
    pub x: u8,
    pub y: u8,
    pub size: u8,
    pub layer: u8,
    pub raw: [u8; 3],
}

/// Decodes one 3 byte object cell.  Every triple decodes to something; it's
/// up to the stream parser not to hand us sentinel bytes.
pub fn decode(b1: u8, b2: u8, b3: u8, layer: u8) -> ObjectEntry {
    let (ty, id, x, y, size) = if b1 >= 0xfc {
        (
            ObjectType::Type2,
            (b3 as u16 & 0x3f) | 0x100,
            ((b2 & 0xf0) >> 4) | ((b1 & 0x03) << 4),
            ((b2 & 0x0f) << 2) | ((b3 & 0xc0) >> 6),
            0,
        )
    } else if b3 >= 0xf8 {
        let id = ((b3 as u16) << 4)
            | 0x80
            | ((b2 as u16 & 0x03) << 2)
            | (b1 as u16 & 0x03);
        (
            ObjectType::Type3,
            id & 0x3ff,
            (b1 & 0xfc) >> 2,
            (b2 & 0xfc) >> 2,
            ((b1 & 0x03) << 2) | (b2 & 0x03),
        )
    } else {
        (
            ObjectType::Type1,
            b3 as u16,
            (b1 & 0xfc) >> 2,
            (b2 & 0xfc) >> 2,
            ((b1 & 0x03) << 2) | (b2 & 0x03),
        )
    };

    ObjectEntry {
        ty: ty,
        id: id,
        x: x,
        y: y,
        size: size,
        layer: layer,
        raw: [b1, b2, b3],
    }
}

impl ObjectEntry {
    pub fn description(&self) -> Cow<'static, str> {
        describe(self.id)
    }

    pub fn draw_routine(&self) -> Option<&'static str> {
        draw_routine(self.id)
    }

    /// Index of this object in its type's handler table in bank $01.
    pub fn handler_index(&self) -> usize {
        match self.ty {
            ObjectType::Type1 => self.id as usize & 0xff,
            ObjectType::Type2 => self.id as usize & 0x3f,
            ObjectType::Type3 => (self.id as usize & 0xff) - 0x80,
        }
    }

    /// Reads the bank $01 address of the routine that draws this object.
    pub fn handler(&self, rom: &RomImage, layout: &RomLayout) -> Result<u16, FormatError> {
        let table = match self.ty {
            ObjectType::Type1 => layout.type1_handler_table,
            ObjectType::Type2 => layout.type2_handler_table,
            ObjectType::Type3 => layout.type3_handler_table,
        };
        rom.read_u16le(table + self.handler_index() * 2)
    }
}

// Sorted by id for binary search.
const OBJECT_DESCRIPTIONS: &[(u16, &str)] = &[
    (0x000, "Ceiling (2x2)"),
    (0x001, "Wall horizontal (2x4)"),
    (0x002, "Wall horizontal (2x4, variant)"),
    (0x003, "Diagonal wall NW->SE"),
    (0x004, "Diagonal wall NE->SW"),
    (0x005, "Pit horizontal (4x2)"),
    (0x006, "Pit vertical (2x4)"),
    (0x007, "Floor pattern"),
    (0x008, "Water edge"),
    (0x009, "Water edge variant"),
    (0x00a, "Conveyor belt"),
    (0x00b, "Conveyor belt variant"),
    (0x00c, "Diagonal acute"),
    (0x00d, "Diagonal acute variant"),
    (0x00e, "Pushable block"),
    (0x00f, "Rail"),
    (0x010, "Diagonal grave"),
    (0x011, "Diagonal grave variant"),
    (0x012, "Wall top edge"),
    (0x013, "Wall bottom edge"),
    (0x014, "Diagonal acute 2"),
    (0x015, "Diagonal acute 2 variant"),
    (0x016, "Wall pattern"),
    (0x017, "Wall pattern variant"),
    (0x018, "Diagonal grave 2"),
    (0x019, "Diagonal grave 2 variant"),
    (0x01a, "Inner corner NW"),
    (0x01b, "Inner corner NE"),
    (0x01c, "Diagonal acute 3"),
    (0x01d, "Diagonal acute 3 variant"),
    (0x01e, "Diagonal grave 3"),
    (0x01f, "Diagonal grave 3 variant"),
    (0x020, "Diagonal acute 4"),
    (0x021, "Floor edge 1x2"),
    (0x022, "Has edge 1x1"),
    (0x023, "Has edge 1x1 variant"),
    (0x024, "Has edge 1x1 variant 2"),
    (0x025, "Has edge 1x1 variant 3"),
    (0x026, "Has edge 1x1 variant 4"),
    (0x030, "Bottom corners 1x2"),
    (0x031, "Minecart track"),
    (0x032, "Nothing A"),
    (0x033, "Floor 4x4"),
    (0x034, "Solid 1x1"),
    (0x035, "Door switcher"),
    (0x036, "Decor 4x4"),
    (0x037, "Decor 4x4 variant"),
    (0x038, "Statue 2x3"),
    (0x039, "Pillar 2x4"),
    (0x03a, "Decor 4x3"),
    (0x03b, "Decor 4x3 variant"),
    (0x03c, "Doubled 2x2"),
    (0x03d, "Pillar 2x4 variant"),
    (0x03e, "Decor 2x2"),
    (0x047, "Waterfall"),
    (0x048, "Waterfall variant"),
    (0x049, "Floor tile 4x2"),
    (0x04a, "Floor tile 4x2 variant"),
    (0x04c, "Bar 4x3"),
    (0x04d, "Shelf 4x4"),
    (0x04e, "Shelf 4x4 variant"),
    (0x04f, "Shelf 4x4 variant 2"),
    (0x050, "Line 1x1"),
    (0x051, "Cannon hole 4x3"),
    (0x052, "Cannon hole 4x3 variant"),
    (0x060, "Wall vertical (2x2)"),
    (0x061, "Wall vertical (4x2)"),
    (0x062, "Wall vertical (4x2, variant)"),
    (0x063, "Diagonal wall NW->SE (vert)"),
    (0x064, "Diagonal wall NE->SW (vert)"),
    (0x065, "Decor 4x2"),
    (0x066, "Decor 4x2 variant"),
    (0x067, "Floor 2x2"),
    (0x068, "Floor 2x2 variant"),
    (0x069, "Has edge 1x1 (vert)"),
    (0x06a, "Edge 1x1"),
    (0x06b, "Edge 1x1 variant"),
    (0x06c, "Left corners 2x1"),
    (0x06d, "Right corners 2x1"),
    (0x070, "Floor 4x4 (vert)"),
    (0x071, "Solid 1x1 (vert)"),
    (0x072, "Nothing B"),
    (0x073, "Decor 4x4 (vert)"),
    (0x085, "Cannon hole 3x4"),
    (0x086, "Cannon hole 3x4 variant"),
    (0x087, "Pillar 2x4 (vert)"),
    (0x088, "Big rail 3x1"),
    (0x089, "Block 2x2"),
    (0x0a0, "Diagonal ceiling TL"),
    (0x0a1, "Diagonal ceiling BL"),
    (0x0a2, "Diagonal ceiling TR"),
    (0x0a3, "Diagonal ceiling BR"),
    (0x0a4, "Big hole 4x4"),
    (0x0a5, "Diagonal ceiling TL B"),
    (0x0a6, "Diagonal ceiling BL B"),
    (0x0a7, "Diagonal ceiling TR B"),
    (0x0a8, "Diagonal ceiling BR B"),
    (0x0c0, "Chest"),
    (0x0c1, "Chest variant"),
    (0x0c2, "Big chest"),
    (0x0c3, "Big chest variant"),
    (0x0c4, "Interroom stairs"),
    (0x0c5, "Torch"),
    (0x0c6, "Torch (variant)"),
    (0x0c9, "Flood water"),
    (0x0d9, "Flood water variant"),
    (0x0e0, "Pot"),
    (0x0e1, "Block"),
    (0x0e2, "Pot variant"),
    (0x0e3, "Block variant"),
    (0x0e4, "Pot (skull)"),
    (0x0e5, "Block (push any)"),
    (0x0e6, "Skull pot"),
    (0x0e7, "Big gray block"),
    (0x0e8, "Spike block"),
    (0x0e9, "Spike block variant"),
    (0x100, "Corner NW (concave)"),
    (0x101, "Corner NE (concave)"),
    (0x102, "Corner SW (concave)"),
    (0x103, "Corner SE (concave)"),
    (0x104, "Corner NW (convex)"),
    (0x105, "Corner NE (convex)"),
    (0x106, "Corner SW (convex)"),
    (0x107, "Corner SE (convex)"),
    (0x108, "4x4 Corner NW"),
    (0x109, "4x4 Corner NE"),
    (0x10a, "4x4 Corner SW"),
    (0x10b, "4x4 Corner SE"),
    (0x10c, "Corner piece NW"),
    (0x10d, "Corner piece NE"),
    (0x10e, "Corner piece SW"),
    (0x10f, "Corner piece SE"),
    (0x110, "Weird corner bottom NW"),
    (0x111, "Weird corner bottom NE"),
    (0x112, "Weird corner bottom SW"),
    (0x113, "Weird corner bottom SE"),
    (0x114, "Weird corner top NW"),
    (0x115, "Weird corner top NE"),
    (0x116, "Platform / Floor overlay"),
    (0x117, "Platform variant"),
    (0x118, "Statue / Pillar"),
    (0x119, "Statue / Pillar variant"),
    (0x11a, "Star tile switch"),
    (0x11b, "Star tile switch variant"),
    (0x11c, "Rail platform"),
    (0x11d, "Rail platform variant"),
    (0x11e, "Somaria platform"),
    (0x11f, "Somaria platform variant"),
    (0x120, "Stairs up (north)"),
    (0x121, "Stairs down (south)"),
    (0x122, "Stairs left"),
    (0x123, "Stairs right"),
    (0x124, "Spiral stairs up"),
    (0x125, "Spiral stairs down"),
    (0x126, "Sanctuary entrance"),
    (0x127, "Sanctuary entrance variant"),
    (0x128, "Hole/pit"),
    (0x129, "Hole/pit variant"),
    (0x12a, "Warp tile"),
    (0x12b, "Warp tile variant"),
    (0x12c, "Layer switch NW"),
    (0x12d, "Layer switch NE"),
    (0x12e, "Layer switch SW"),
    (0x12f, "Layer switch SE"),
    (0x130, "Light cone"),
    (0x131, "Light cone variant"),
    (0x132, "Floor switch"),
    (0x133, "Floor switch (heavy)"),
    (0x134, "Bombable floor"),
    (0x135, "Bombable floor variant"),
    (0x136, "Cracked floor"),
    (0x137, "Cracked floor variant"),
    (0x138, "Stairs inter-room"),
    (0x139, "Stairs inter-room variant"),
    (0x13a, "Stairs straight"),
    (0x13b, "Stairs straight variant"),
    (0x13c, "Eye switch"),
    (0x13d, "Eye switch variant"),
    (0x13e, "Crystal switch"),
    (0x13f, "Crystal switch variant"),
    (0x399, "Chest (type 3)"),
    (0x3b1, "Big chest (type 3)"),
];

const DRAW_ROUTINES: &[(u16, &str)] = &[
    (0x001, "RoomDraw_Rightwards2x4_1to15or26"),
    (0x002, "RoomDraw_Rightwards2x4_1to15or26"),
    (0x003, "RoomDraw_Rightwards2x4_1to16_BothBG"),
    (0x004, "RoomDraw_Rightwards2x4_1to16_BothBG"),
    (0x033, "RoomDraw_Rightwards4x4_1to16"),
    (0x034, "RoomDraw_Rightwards1x1Solid_1to16_plus3"),
    (0x038, "RoomDraw_RightwardsStatue2x3spaced2_1to16"),
    (0x061, "RoomDraw_Downwards4x2_1to15or26"),
    (0x062, "RoomDraw_Downwards4x2_1to15or26"),
    (0x063, "RoomDraw_Downwards4x2_1to16_BothBG"),
    (0x064, "RoomDraw_Downwards4x2_1to16_BothBG"),
    (0x071, "RoomDraw_Downwards1x1Solid_1to16_plus3"),
    (0x0a4, "RoomDraw_BigHole4x4_1to16"),
    (0x0c6, "RoomDraw_Torch"),
];

fn lookup(table: &'static [(u16, &'static str)], id: u16) -> Option<&'static str> {
    table
        .binary_search_by_key(&id, |&(k, _)| k)
        .ok()
        .map(|i| table[i].1)
}

pub fn describe(id: u16) -> Cow<'static, str> {
    match lookup(OBJECT_DESCRIPTIONS, id) {
        Some(desc) => Cow::Borrowed(desc),
        None => Cow::Owned(format!("Object 0x{:03X}", id)),
    }
}

pub fn draw_routine(id: u16) -> Option<&'static str> {
    lookup(DRAW_ROUTINES, id)
}
