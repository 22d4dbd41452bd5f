use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::LabelParseError;
use crate::room::{Direction, RoomModel};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Door,
    Stair,
    Holewarp,
}

/// A directed link from one room to another.  The target may not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(rename = "target")]
    pub target_room: u16,
    pub direction: Option<Direction>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConnectivityStats {
    pub door_edges: usize,
    pub stair_edges: usize,
    pub holewarp_edges: usize,
    pub label_failures: usize,
    pub doors_unresolved: usize,
}

static STAIR_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^To (\d+)$").unwrap());

/// Parses a staircase label of the form `To <N>`.
pub fn parse_stair_label(label: &str) -> Result<u16, LabelParseError> {
    STAIR_LABEL
        .captures(label)
        .and_then(|caps| caps[1].parse::<u16>().ok())
        .ok_or_else(|| LabelParseError {
            label: label.to_string(),
        })
}

/// Room a door leads to on the 16 wide room grid, if that room is loaded.
pub fn door_target(room_id: u16, direction: Direction, loaded: &BTreeSet<u16>) -> Option<u16> {
    let target = room_id as i32 + direction.grid_delta();
    if target < 0 || target > u16::max_value() as i32 {
        return None;
    }
    let target = target as u16;
    if loaded.contains(&target) {
        Some(target)
    } else {
        None
    }
}

/// Replaces every room's neighbor list with the edges inferred from its
/// doors, staircases and holewarp, and records resolved targets on the door
/// and staircase records.
pub fn build(rooms: &mut BTreeMap<u16, RoomModel>) -> ConnectivityStats {
    let loaded: BTreeSet<u16> = rooms.keys().cloned().collect();
    let mut stats = ConnectivityStats::default();

    for (&room_id, room) in rooms.iter_mut() {
        let mut neighbors = Vec::new();

        for door in room.doors.iter_mut() {
            door.target_room = door_target(room_id, door.direction, &loaded);
            match door.target_room {
                Some(target) => {
                    stats.door_edges += 1;
                    neighbors.push(Edge {
                        kind: EdgeKind::Door,
                        target_room: target,
                        direction: Some(door.direction),
                    });
                }
                None => stats.doors_unresolved += 1,
            }
        }

        for stair in room.staircases.iter_mut() {
            match parse_stair_label(&stair.label) {
                Ok(target) => {
                    stair.target_room = Some(target);
                    stats.stair_edges += 1;
                    neighbors.push(Edge {
                        kind: EdgeKind::Stair,
                        target_room: target,
                        direction: None,
                    });
                }
                Err(e) => {
                    debug!("room 0x{:03x}: skipping staircase: {}", room_id, e);
                    stair.target_room = None;
                    stats.label_failures += 1;
                }
            }
        }

        if let Some(header) = &room.header {
            if header.holewarp != 0 {
                stats.holewarp_edges += 1;
                neighbors.push(Edge {
                    kind: EdgeKind::Holewarp,
                    target_room: header.holewarp as u16,
                    direction: None,
                });
            }
        }

        room.neighbors = neighbors;
    }

    debug!("connectivity: {:?}", stats);
    stats
}
