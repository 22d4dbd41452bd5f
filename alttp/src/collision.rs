//! Maps room objects onto the 64x64 per-room collision table at $7F2000.

use serde::Serialize;
use std::collections::HashSet;

use crate::object::ObjectEntry;
use crate::room::RoomModel;

pub const COLLISION_WIDTH: u16 = 64;
pub const COLLISION_HEIGHT: u16 = 64;
pub const ASM_OFFSETS_PER_ROW: usize = 8;

/// Index of a tile in the collision table, or `None` off the edge.
pub fn offset(x: u16, y: u16) -> Option<u16> {
    if x >= COLLISION_WIDTH || y >= COLLISION_HEIGHT {
        return None;
    }
    Some(y * COLLISION_WIDTH + x)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// How an object's size field turns into covered tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Footprint {
    /// `size + 1` tiles along `axis`, `thickness` tiles across it.
    Span { axis: Axis, thickness: u8 },
    /// `width + (size & 3)` by `height + ((size >> 2) & 3)` tiles.
    Block { width: u8, height: u8 },
    /// Just the origin tile.
    Fixed,
}

struct FootprintRule {
    first: u16,
    last: u16,
    footprint: Footprint,
}

const fn rule(first: u16, last: u16, footprint: Footprint) -> FootprintRule {
    FootprintRule {
        first: first,
        last: last,
        footprint: footprint,
    }
}

// Ranges don't overlap and are sorted.
const FOOTPRINT_RULES: &[FootprintRule] = &[
    rule(
        0x001,
        0x004,
        Footprint::Span {
            axis: Axis::Horizontal,
            thickness: 4,
        },
    ),
    rule(0x033, 0x033, Footprint::Block { width: 4, height: 4 }),
    rule(
        0x061,
        0x064,
        Footprint::Span {
            axis: Axis::Vertical,
            thickness: 4,
        },
    ),
    rule(0x070, 0x070, Footprint::Block { width: 4, height: 4 }),
    rule(
        0x0c9,
        0x0c9,
        Footprint::Span {
            axis: Axis::Horizontal,
            thickness: 1,
        },
    ),
    rule(
        0x0d9,
        0x0d9,
        Footprint::Span {
            axis: Axis::Horizontal,
            thickness: 1,
        },
    ),
    rule(0x100, 0x3ff, Footprint::Fixed),
];

/// Applies to every id no rule names.  This size-nibble guess has not been
/// checked against the game's draw routines for most objects.
pub const DEFAULT_FOOTPRINT: Footprint = Footprint::Block {
    width: 1,
    height: 1,
};

pub fn footprint(id: u16) -> Footprint {
    FOOTPRINT_RULES
        .iter()
        .find(|r| r.first <= id && id <= r.last)
        .map(|r| r.footprint)
        .unwrap_or(DEFAULT_FOOTPRINT)
}

impl Footprint {
    /// Width and height in tiles for a given size field.
    pub fn dimensions(self, size: u8) -> (u16, u16) {
        let size = size as u16;
        match self {
            Footprint::Span {
                axis: Axis::Horizontal,
                thickness,
            } => (size + 1, thickness as u16),
            Footprint::Span {
                axis: Axis::Vertical,
                thickness,
            } => (thickness as u16, size + 1),
            Footprint::Block { width, height } => {
                (width as u16 + (size & 0x3), height as u16 + ((size >> 2) & 0x3))
            }
            Footprint::Fixed => (1, 1),
        }
    }

    pub fn tiles(self, x: u16, y: u16, size: u8) -> Vec<(u16, u16)> {
        let (w, h) = self.dimensions(size);
        let mut tiles = Vec::with_capacity((w * h) as usize);
        for dy in 0..h {
            for dx in 0..w {
                tiles.push((x + dx, y + dy));
            }
        }
        tiles
    }
}

/// Every tile an object covers, origin first.  May run off the table; see
/// `offset`.
pub fn expand_area(entry: &ObjectEntry) -> Vec<(u16, u16)> {
    footprint(entry.id).tiles(entry.x as u16, entry.y as u16, entry.size)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollisionTile {
    pub x: u16,
    pub y: u16,
    pub offset: u16,
    /// The first object that covered this tile.
    pub object: ObjectEntry,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollisionReport {
    pub room_id: u16,
    pub filter_id: Option<u16>,
    pub expanded: bool,
    pub objects: Vec<ObjectEntry>,
    pub tiles: Vec<CollisionTile>,
    pub offsets: Vec<u16>,
}

/// Collects the collision offsets covered by a room's objects.  With
/// `expand` the whole footprint is used, otherwise only the origin tile.
pub fn analyze(room: &RoomModel, filter_id: Option<u16>, expand: bool) -> CollisionReport {
    let objects: Vec<ObjectEntry> = room
        .objects()
        .filter(|obj| filter_id.map_or(true, |id| obj.id == id))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let mut tiles = Vec::new();
    for obj in &objects {
        let covered = if expand {
            expand_area(obj)
        } else {
            vec![(obj.x as u16, obj.y as u16)]
        };

        for (x, y) in covered {
            if let Some(offset) = offset(x, y) {
                if seen.insert(offset) {
                    tiles.push(CollisionTile {
                        x: x,
                        y: y,
                        offset: offset,
                        object: obj.clone(),
                    });
                }
            }
        }
    }

    let mut offsets: Vec<u16> = seen.into_iter().collect();
    offsets.sort();

    CollisionReport {
        room_id: room.room_id,
        filter_id: filter_id,
        expanded: expand,
        objects: objects,
        tiles: tiles,
        offsets: offsets,
    }
}

impl CollisionReport {
    pub fn default_label(&self) -> String {
        format!("Room{:02X}_CollisionData", self.room_id)
    }

    /// Renders the offsets as a data block for an asar source file.
    pub fn to_asm(&self, label: Option<&str>) -> String {
        let label = label
            .map(|l| l.to_string())
            .unwrap_or_else(|| self.default_label());

        let mut lines = vec![
            format!("; Room 0x{:02X} - Collision Offsets", self.room_id),
            "; Generated by alttp collision mapper".to_string(),
        ];
        for obj in &self.objects {
            lines.push(format!(
                "; Object 0x{:03X} @ ({},{}) size={}",
                obj.id, obj.x, obj.y, obj.size
            ));
        }
        lines.push(format!("{}:", label));
        lines.push("{".to_string());
        lines.push(format!("  db {}  ; Tile count", self.offsets.len()));
        for row in self.offsets.chunks(ASM_OFFSETS_PER_ROW) {
            let values: Vec<String> = row.iter().map(|o| format!("${:04X}", o)).collect();
            lines.push(format!("  dw {}", values.join(", ")));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }
}
