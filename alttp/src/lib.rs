#[macro_use]
pub mod rommap;

pub mod collision;
pub mod config;
pub mod connectivity;
pub mod entrance;
pub mod error;
pub mod export;
pub mod locate;
pub mod object;
pub mod rom;
pub mod room;
pub mod search;
pub mod util;

#[cfg(test)]
mod testrom;

use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

pub use crate::connectivity::{ConnectivityStats, Edge, EdgeKind};
pub use crate::error::{FormatError, GraphError, LabelParseError, RomError};
pub use crate::rom::RomImage;
pub use crate::rommap::RomLayout;
pub use crate::room::{RoomModel, RoomParser};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadStats {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
    pub out_of_range: usize,
    pub headers_missing: usize,
    pub connectivity: ConnectivityStats,
}

#[derive(Debug)]
pub struct DungeonData {
    pub rooms: BTreeMap<u16, RoomModel>,
    // Rooms that couldn't be parsed, with the reason.
    pub failures: Vec<(u16, FormatError)>,
    pub stats: LoadStats,
}

/// Parses the requested rooms and links them together.  A room that fails
/// to parse is logged, recorded in `failures` and left out; it never stops
/// the rest of the batch.
pub fn load<I>(rom: &RomImage, layout: &RomLayout, room_ids: I) -> DungeonData
where
    I: IntoIterator<Item = u16>,
{
    let parser = RoomParser::new(rom, layout);
    let mut rooms = BTreeMap::new();
    let mut failures = Vec::new();
    let mut stats = LoadStats::default();

    for room_id in room_ids {
        stats.requested += 1;
        if room_id as usize >= layout.room_count {
            warn!("room 0x{:03x}: past the end of the room table", room_id);
            stats.out_of_range += 1;
            continue;
        }

        match parser.parse(room_id) {
            Ok(room) => {
                rooms.insert(room_id, room);
            }
            Err(e) => {
                warn!("room 0x{:03x}: {}", room_id, e);
                failures.push((room_id, e));
            }
        }
    }

    stats.loaded = rooms.len();
    stats.failed = failures.len();
    stats.headers_missing = rooms.values().filter(|r| r.header.is_none()).count();
    stats.connectivity = connectivity::build(&mut rooms);
    info!(
        "loaded {} of {} rooms ({} failed, {} out of range)",
        stats.loaded, stats.requested, stats.failed, stats.out_of_range
    );

    DungeonData {
        rooms: rooms,
        failures: failures,
        stats: stats,
    }
}

/// Every room in the layout's room table.
pub fn load_all(rom: &RomImage, layout: &RomLayout) -> DungeonData {
    load(rom, layout, 0..layout.room_count as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testrom::{stream, TestRom};

    #[test]
    fn broken_room_does_not_stop_batch() {
        let mut rom = TestRom::new();
        rom.room(6, &stream(0, 0, [&[[0x04, 0x04, 0x00]], &[], &[]], &[(0x02, 0x00)]));
        // Last room in the image, cut one byte short of its final terminator.
        let mut data = stream(0, 0, [&[[0x04, 0x04, 0x00]], &[], &[]], &[]);
        data.pop();
        rom.room(5, &data);
        let rom = rom.build_truncated();

        let data = load(&rom, &RomLayout::default(), vec![5, 6]);
        assert_eq!(
            data.failures,
            vec![(
                5,
                FormatError::UnterminatedRoom {
                    room_id: 5,
                    layer: 2
                }
            )]
        );
        assert_eq!(data.rooms.len(), 1);
        assert_eq!(data.rooms[&6].object_count(), 1);
        assert_eq!(data.stats.requested, 2);
        assert_eq!(data.stats.loaded, 1);
        assert_eq!(data.stats.failed, 1);
        assert_eq!(data.stats.headers_missing, 1);
        // Room 5 failed, so the west door from 6 has nowhere to go.
        assert_eq!(data.stats.connectivity.doors_unresolved, 1);
        assert!(data.rooms[&6].neighbors.is_empty());
    }

    #[test]
    fn out_of_range_ids_are_skipped() {
        let mut rom = TestRom::new();
        rom.room(0, &stream(0, 0, [&[], &[], &[]], &[]));
        let rom = rom.build();
        let data = load(&rom, &RomLayout::default(), vec![0, 0x128, 0xffff]);
        assert_eq!(data.rooms.len(), 1);
        assert_eq!(data.stats.out_of_range, 2);
        assert!(data.failures.is_empty());
    }

    #[test]
    fn pipeline() {
        let mut rom = TestRom::new();
        rom.room(0x1a, &stream(0, 0, [&[], &[], &[]], &[(0x03, 0x00)]));
        rom.room(
            0x1b,
            &stream(0, 0, [&[[0xfc, 0x10, 0x38]], &[], &[]], &[(0x02, 0x00)]),
        );
        rom.links(0x1b, 0, [0x2a, 0, 0, 0]);
        rom.room(0x2a, &stream(0, 0, [&[], &[], &[]], &[]));
        let rom = rom.build();
        let layout = RomLayout::default();

        let data = load(&rom, &layout, vec![0x1a, 0x1b, 0x2a]);
        assert!(data.failures.is_empty());
        assert_eq!(data.stats.headers_missing, 2);
        assert_eq!(data.stats.connectivity.door_edges, 2);
        assert_eq!(data.stats.connectivity.stair_edges, 1);

        let path = search::shortest_path(&data.rooms, 0x1a, 0x2a);
        let ids: Vec<u16> = path.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0x1a, 0x1b, 0x2a]);
        assert_eq!(path[2].1.as_ref().map(|e| e.kind), Some(EdgeKind::Stair));

        let found = search::discover(&data.rooms, 0x2a, 20);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn load_all_with_blank_table() {
        // Every pointer in an empty table is zero, which points at the start
        // of the image: two header bytes and then nothing but zero objects
        // until the image runs out.
        let rom = RomImage::from_bytes(vec![0; 0x10000]);
        let data = load_all(&rom, &RomLayout::default());
        assert_eq!(data.stats.requested, 296);
        assert_eq!(data.stats.failed, 296);
    }
}
