//! Breadth first queries over the room graph built by `connectivity`.
//!
//! Door inference is per room, so the graph can have one-way links and
//! cycles.  Every traversal keeps a visited set, and discovery also stops
//! growing once it holds `limit` rooms.  Edges to rooms that were never
//! loaded are reported but never expanded.

use log::debug;
use serde::Serialize;
use serde_hex::{SerHex, StrictPfx};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::connectivity::{Edge, EdgeKind};
use crate::entrance::Entrance;
use crate::error::GraphError;
use crate::locate::RoomNames;
use crate::room::RoomModel;

/// A traversed edge, as listed in a discovery report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Connection {
    #[serde(with = "SerHex::<StrictPfx>")]
    pub from: u16,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub to: u16,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RoomRef(#[serde(with = "SerHex::<StrictPfx>")] pub u16);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Discovery {
    #[serde(with = "SerHex::<StrictPfx>")]
    pub entrance_id: u8,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub start_room: u16,
    #[serde(with = "SerHex::<StrictPfx>")]
    pub dungeon_id: u8,
    pub rooms_discovered: usize,
    pub discovered_rooms: Vec<RoomRef>,
    pub room_names: BTreeMap<String, String>,
    pub connections: Vec<Connection>,
}

struct Traversal {
    discovered: BTreeSet<u16>,
    connections: Vec<Connection>,
}

fn traverse(
    rooms: &BTreeMap<u16, RoomModel>,
    start: u16,
    limit: usize,
) -> Result<Traversal, GraphError> {
    if !rooms.contains_key(&start) {
        return Err(GraphError::UnknownRoom { room_id: start });
    }

    let mut traversal = Traversal {
        discovered: BTreeSet::new(),
        connections: Vec::new(),
    };
    if limit == 0 {
        return Ok(traversal);
    }

    let mut queue = VecDeque::new();
    traversal.discovered.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let room = match rooms.get(&current) {
            Some(room) => room,
            None => continue,
        };

        for edge in &room.neighbors {
            traversal.connections.push(Connection {
                from: current,
                to: edge.target_room,
                kind: edge.kind,
            });

            if traversal.discovered.contains(&edge.target_room)
                || traversal.discovered.len() >= limit
            {
                continue;
            }
            traversal.discovered.insert(edge.target_room);
            if rooms.contains_key(&edge.target_room) {
                queue.push_back(edge.target_room);
            }
        }
    }

    Ok(traversal)
}

/// Rooms reachable from `start`, holding at most `limit` rooms.  Unloaded
/// targets are included but not expanded.  An unknown start gives an empty
/// set.
pub fn discover(rooms: &BTreeMap<u16, RoomModel>, start: u16, limit: usize) -> BTreeSet<u16> {
    match traverse(rooms, start, limit) {
        Ok(traversal) => traversal.discovered,
        Err(e) => {
            debug!("discover: {}", e);
            BTreeSet::new()
        }
    }
}

/// Fewest-edge route from `start` to `end`.  The first step is always
/// `(start, None)` and each later step carries the edge taken into it.
/// Empty when either room is unknown or `end` can't be reached.
pub fn shortest_path(
    rooms: &BTreeMap<u16, RoomModel>,
    start: u16,
    end: u16,
) -> Vec<(u16, Option<Edge>)> {
    for &room_id in &[start, end] {
        if !rooms.contains_key(&room_id) {
            debug!("shortest_path: {}", GraphError::UnknownRoom { room_id: room_id });
            return Vec::new();
        }
    }

    // Each reached room maps to the room and edge it was first reached by.
    let mut came_from: BTreeMap<u16, Option<(u16, &Edge)>> = BTreeMap::new();
    let mut queue = VecDeque::new();
    came_from.insert(start, None);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == end {
            break;
        }
        let room = match rooms.get(&current) {
            Some(room) => room,
            None => continue,
        };
        for edge in &room.neighbors {
            let next = edge.target_room;
            if came_from.contains_key(&next) || !rooms.contains_key(&next) {
                continue;
            }
            came_from.insert(next, Some((current, edge)));
            queue.push_back(next);
        }
    }

    if !came_from.contains_key(&end) {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut current = end;
    loop {
        match came_from.get(&current) {
            Some(Some((prev, edge))) => {
                path.push((current, Some((*edge).clone())));
                current = *prev;
            }
            _ => {
                path.push((current, None));
                break;
            }
        }
    }
    path.reverse();
    path
}

/// Runs `discover` from an entrance's room and gathers a report of what was
/// found.
pub fn discover_from_entrance(
    rooms: &BTreeMap<u16, RoomModel>,
    entrance: &Entrance,
    limit: usize,
    names: &RoomNames,
) -> Discovery {
    let start_room = entrance.start_room();
    let traversal = match traverse(rooms, start_room, limit) {
        Ok(traversal) => traversal,
        Err(e) => {
            debug!("entrance 0x{:02x}: {}", entrance.id, e);
            Traversal {
                discovered: BTreeSet::new(),
                connections: Vec::new(),
            }
        }
    };

    let room_names = traversal
        .discovered
        .iter()
        .map(|&id| (format!("0x{:02X}", id), names.name(id).into_owned()))
        .collect();

    Discovery {
        entrance_id: entrance.id,
        start_room: start_room,
        dungeon_id: entrance.dungeon_id,
        rooms_discovered: traversal.discovered.len(),
        discovered_rooms: traversal.discovered.iter().map(|&id| RoomRef(id)).collect(),
        room_names: room_names,
        connections: traversal.connections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Direction;

    fn room(room_id: u16, targets: &[u16]) -> RoomModel {
        RoomModel {
            room_id: room_id,
            data_address: 0,
            floor1: 0,
            floor2: 0,
            layout: 0,
            objects_by_layer: Default::default(),
            doors: Vec::new(),
            header: None,
            staircases: Vec::new(),
            chests: Vec::new(),
            neighbors: targets
                .iter()
                .map(|&t| Edge {
                    kind: EdgeKind::Door,
                    target_room: t,
                    direction: Some(Direction::East),
                })
                .collect(),
        }
    }

    fn graph(rooms: &[(u16, &[u16])]) -> BTreeMap<u16, RoomModel> {
        rooms
            .iter()
            .map(|&(id, targets)| (id, room(id, targets)))
            .collect()
    }

    fn ids(path: &[(u16, Option<Edge>)]) -> Vec<u16> {
        path.iter().map(|(id, _)| *id).collect()
    }

    #[test]
    fn path_to_self() {
        let rooms = graph(&[(1, &[2]), (2, &[1])]);
        assert_eq!(shortest_path(&rooms, 1, 1), vec![(1, None)]);
    }

    #[test]
    fn path_takes_fewest_edges() {
        let rooms = graph(&[(1, &[2, 3]), (2, &[4]), (3, &[5]), (4, &[5]), (5, &[])]);
        let path = shortest_path(&rooms, 1, 5);
        assert_eq!(ids(&path), vec![1, 3, 5]);
        assert_eq!(path[0].1, None);
        assert_eq!(path[2].1.as_ref().map(|e| e.target_room), Some(5));
    }

    #[test]
    fn unreachable_and_unknown() {
        // One-way link: 2 can't get back to 1.
        let rooms = graph(&[(1, &[2]), (2, &[]), (3, &[1])]);
        assert!(shortest_path(&rooms, 2, 1).is_empty());
        assert!(shortest_path(&rooms, 1, 3).is_empty());
        assert!(shortest_path(&rooms, 9, 1).is_empty());
        assert!(shortest_path(&rooms, 1, 9).is_empty());
    }

    #[test]
    fn path_never_routes_through_unloaded_rooms() {
        let rooms = graph(&[(1, &[7]), (2, &[])]);
        assert!(shortest_path(&rooms, 1, 2).is_empty());
    }

    #[test]
    fn discover_is_bounded_on_cycles() {
        let rooms = graph(&[(1, &[2]), (2, &[3]), (3, &[4]), (4, &[1, 5]), (5, &[2])]);
        for limit in 0..8 {
            let found = discover(&rooms, 1, limit);
            assert!(found.len() <= limit);
        }
        let all: BTreeSet<u16> = [1, 2, 3, 4, 5].iter().cloned().collect();
        assert_eq!(discover(&rooms, 1, 20), all);
        assert_eq!(discover(&rooms, 1, 2).into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn discover_keeps_dangling_targets_as_leaves() {
        let rooms = graph(&[(1, &[0x80, 2]), (2, &[])]);
        let found = discover(&rooms, 1, 20);
        assert!(found.contains(&0x80));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn discover_unknown_start() {
        let rooms = graph(&[(1, &[2])]);
        assert!(discover(&rooms, 5, 20).is_empty());
        assert_eq!(
            traverse(&rooms, 5, 20).err(),
            Some(GraphError::UnknownRoom { room_id: 5 })
        );
    }

    #[test]
    fn entrance_report() {
        let rooms = graph(&[(0xc9, &[0xb9]), (0xb9, &[0xc9])]);
        let entrance = Entrance {
            id: 0x08,
            room_id: 0x01c9,
            dungeon_id: 0x04,
            x: 0,
            y: 0,
        };
        let mut names = BTreeMap::new();
        names.insert(0xc9, "Eastern Palace Entrance".to_string());
        let names = RoomNames::new(names);

        let report = discover_from_entrance(&rooms, &entrance, 20, &names);
        assert_eq!(report.start_room, 0xc9);
        assert_eq!(report.rooms_discovered, 2);
        assert_eq!(report.discovered_rooms, vec![RoomRef(0xb9), RoomRef(0xc9)]);
        assert_eq!(report.room_names["0xC9"], "Eastern Palace Entrance");
        assert_eq!(report.room_names["0xB9"], "Room 0xB9");
        assert_eq!(report.connections.len(), 2);

        let json = serde_json::to_value(&report).unwrap();
        let hex = |v: &serde_json::Value| v.as_str().unwrap().to_lowercase();
        assert_eq!(hex(&json["entrance_id"]), "0x08");
        assert_eq!(hex(&json["start_room"]), "0x00c9");
        assert_eq!(hex(&json["discovered_rooms"][0]), "0x00b9");
        assert_eq!(hex(&json["connections"][0]["from"]), "0x00c9");
        assert_eq!(json["connections"][0]["type"], "door");
    }
}
