//! JSON description of every loaded room, overworld screen and entrance.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::connectivity::Edge;
use crate::entrance::EntranceTable;
use crate::locate::{screen_grid_position, screen_name, RoomNames, World, SCREENS_PER_ROW};
use crate::room::{Chest, Door, RoomModel, Staircase};

/// Light and dark world screens; the special areas above them aren't on a
/// grid.
pub const OVERWORLD_SCREENS: u16 = 0x80;

pub fn hex_id(id: u16) -> String {
    format!("0x{:02X}", id)
}

#[derive(Debug, Serialize)]
pub struct DungeonNode {
    pub name: String,
    pub doors: Vec<Door>,
    pub staircases: Vec<Staircase>,
    pub chests: Vec<Chest>,
    pub neighbors: Vec<Edge>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ScreenNeighbors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub north: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub south: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub east: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub west: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OverworldNode {
    pub name: String,
    pub world: World,
    pub grid_x: u16,
    pub grid_y: u16,
    pub neighbors: ScreenNeighbors,
}

#[derive(Debug, Serialize)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Serialize)]
pub struct EntranceNode {
    pub room_id: String,
    pub dungeon_id: u8,
    pub pos: Position,
}

#[derive(Debug, Serialize)]
pub struct WorldGraph {
    pub dungeons: BTreeMap<String, DungeonNode>,
    pub overworld: BTreeMap<String, OverworldNode>,
    pub entrances: BTreeMap<String, EntranceNode>,
}

fn screen_neighbors(screen_id: u16) -> ScreenNeighbors {
    let (x, y) = screen_grid_position(screen_id);
    let last = SCREENS_PER_ROW - 1;
    ScreenNeighbors {
        north: if y > 0 {
            Some(hex_id(screen_id - SCREENS_PER_ROW))
        } else {
            None
        },
        south: if y < last {
            Some(hex_id(screen_id + SCREENS_PER_ROW))
        } else {
            None
        },
        east: if x < last {
            Some(hex_id(screen_id + 1))
        } else {
            None
        },
        west: if x > 0 { Some(hex_id(screen_id - 1)) } else { None },
    }
}

fn overworld() -> BTreeMap<String, OverworldNode> {
    let mut screens = BTreeMap::new();
    for screen_id in 0..OVERWORLD_SCREENS {
        let world = match World::of_screen(screen_id) {
            Some(world) => world,
            None => continue,
        };
        let (grid_x, grid_y) = screen_grid_position(screen_id);
        screens.insert(
            hex_id(screen_id),
            OverworldNode {
                name: screen_name(screen_id),
                world: world,
                grid_x: grid_x,
                grid_y: grid_y,
                neighbors: screen_neighbors(screen_id),
            },
        );
    }
    screens
}

impl WorldGraph {
    pub fn build(
        rooms: &BTreeMap<u16, RoomModel>,
        entrances: &EntranceTable,
        names: &RoomNames,
    ) -> WorldGraph {
        let dungeons = rooms
            .iter()
            .map(|(&id, room)| {
                (
                    hex_id(id),
                    DungeonNode {
                        name: names.name(id).into_owned(),
                        doors: room.doors.clone(),
                        staircases: room.staircases.clone(),
                        chests: room.chests.clone(),
                        neighbors: room.neighbors.clone(),
                    },
                )
            })
            .collect();

        let entrances = entrances
            .iter()
            .map(|e| {
                (
                    hex_id(e.id as u16),
                    EntranceNode {
                        room_id: hex_id(e.room_id),
                        dungeon_id: e.dungeon_id,
                        pos: Position { x: e.x, y: e.y },
                    },
                )
            })
            .collect();

        WorldGraph {
            dungeons: dungeons,
            overworld: overworld(),
            entrances: entrances,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
