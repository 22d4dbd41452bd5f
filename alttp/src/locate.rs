//! Turns live player coordinates into a room or overworld screen.

use num::FromPrimitive;
use num_derive::FromPrimitive;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

pub const TILE_SIZE: u16 = 16;
pub const SCREEN_SIZE: u16 = 512;
pub const SCREENS_PER_ROW: u16 = 8;
pub const SCREENS_PER_WORLD: u16 = 0x40;

#[derive(Clone, Copy, Debug, FromPrimitive, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum World {
    Light = 0,
    Dark = 1,
    Special = 2,
}

impl World {
    pub fn of_screen(screen_id: u16) -> Option<World> {
        World::from_u16(screen_id / SCREENS_PER_WORLD)
    }

    pub fn name(self) -> &'static str {
        match self {
            World::Light => "Light World",
            World::Dark => "Dark World",
            World::Special => "Special Area",
        }
    }
}

/// Column and row of a screen within its world's 8x8 grid.
pub fn screen_grid_position(screen_id: u16) -> (u16, u16) {
    let local = screen_id % SCREENS_PER_WORLD;
    (local % SCREENS_PER_ROW, local / SCREENS_PER_ROW)
}

pub fn screen_name(screen_id: u16) -> String {
    match World::of_screen(screen_id) {
        Some(World::Special) | None => format!("Special Area 0x{:02X}", screen_id),
        Some(world) => {
            let (x, y) = screen_grid_position(screen_id);
            format!("{} ({},{})", world.name(), x, y)
        }
    }
}

/// Display names for dungeon rooms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoomNames {
    names: BTreeMap<u16, String>,
}

impl RoomNames {
    pub fn new(names: BTreeMap<u16, String>) -> RoomNames {
        RoomNames { names: names }
    }

    pub fn get(&self, room_id: u16) -> Option<&str> {
        self.names.get(&room_id).map(|n| n.as_str())
    }

    pub fn name(&self, room_id: u16) -> Cow<'_, str> {
        match self.get(room_id) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("Room 0x{:02X}", room_id)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Dungeon,
    Overworld,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocalizedPosition {
    pub kind: LocationKind,
    pub room_or_screen_id: u16,
    pub tile_x: u16,
    pub tile_y: u16,
    pub raw_x: u16,
    pub raw_y: u16,
    pub name: String,
}

pub struct Localizer<'a> {
    names: &'a RoomNames,
}

impl<'a> Localizer<'a> {
    pub fn new(names: &'a RoomNames) -> Localizer<'a> {
        Localizer { names: names }
    }

    /// Position inside `room_id`.  Indoor coordinates count pixels, sixteen
    /// to a tile.
    pub fn dungeon(&self, room_id: u16, x: u16, y: u16) -> LocalizedPosition {
        LocalizedPosition {
            kind: LocationKind::Dungeon,
            room_or_screen_id: room_id,
            tile_x: x / TILE_SIZE,
            tile_y: y / TILE_SIZE,
            raw_x: x,
            raw_y: y,
            name: self.names.name(room_id).into_owned(),
        }
    }

    pub fn overworld(&self, x: u16, y: u16) -> LocalizedPosition {
        let screen_id = (y / SCREEN_SIZE) * SCREENS_PER_ROW + x / SCREEN_SIZE;
        LocalizedPosition {
            kind: LocationKind::Overworld,
            room_or_screen_id: screen_id,
            tile_x: (x % SCREEN_SIZE) / TILE_SIZE,
            tile_y: (y % SCREEN_SIZE) / TILE_SIZE,
            raw_x: x,
            raw_y: y,
            name: screen_name(screen_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> RoomNames {
        let mut names = BTreeMap::new();
        names.insert(0xc9, "Eastern Palace Entrance".to_string());
        RoomNames::new(names)
    }

    #[test]
    fn overworld_origin_screen() {
        let names = names();
        let pos = Localizer::new(&names).overworld(100, 100);
        assert_eq!(pos.kind, LocationKind::Overworld);
        assert_eq!(pos.room_or_screen_id, 0);
        assert_eq!((pos.tile_x, pos.tile_y), (6, 6));
        assert_eq!((pos.raw_x, pos.raw_y), (100, 100));
        assert_eq!(pos.name, "Light World (0,0)");
    }

    #[test]
    fn overworld_grid() {
        let names = names();
        let pos = Localizer::new(&names).overworld(3 * 512 + 40, 2 * 512 + 511);
        assert_eq!(pos.room_or_screen_id, 2 * 8 + 3);
        assert_eq!((pos.tile_x, pos.tile_y), (2, 31));
    }

    #[test]
    fn dungeon_position() {
        let names = names();
        let localizer = Localizer::new(&names);

        let pos = localizer.dungeon(0xc9, 0x78, 0x150);
        assert_eq!(pos.kind, LocationKind::Dungeon);
        assert_eq!((pos.tile_x, pos.tile_y), (7, 21));
        assert_eq!(pos.name, "Eastern Palace Entrance");

        assert_eq!(localizer.dungeon(0x1b, 0, 0).name, "Room 0x1B");
    }

    #[test]
    fn screen_names() {
        assert_eq!(screen_name(0x00), "Light World (0,0)");
        assert_eq!(screen_name(0x3f), "Light World (7,7)");
        assert_eq!(screen_name(0x43), "Dark World (3,0)");
        assert_eq!(screen_name(0x80), "Special Area 0x80");
        assert_eq!(screen_name(0x1ff), "Special Area 0x1FF");
        assert_eq!(World::of_screen(0x45), Some(World::Dark));
        assert_eq!(World::of_screen(0xc0), None);
    }
}
