use serde::{Deserialize, Serialize};

/// PC offset of a LoROM `bank:offset` address.  Usable in consts.
#[macro_export]
macro_rules! rom_addr {
    ($bank:expr, $offset:expr) => {
        (((($bank) & 0x7f) << 15) + (($offset) - 0x8000)) as usize
    };
}

pub const NUMBER_OF_ROOMS: usize = 296;
pub const NUMBER_OF_ENTRANCES: usize = 0x85;

// The two room pointer tables are addressed by raw file offset.
pub const ROOM_OBJECT_POINTER: usize = 0x874c;
pub const ROOM_HEADER_POINTER: usize = 0xb5dd;
pub const ROOM_HEADER_POINTER_BANK: usize = 0xb5e7;
pub const ROOM_HEADER_SIZE: usize = 14;

pub const TYPE1_HANDLER_TABLE: usize = rom_addr!(0x01, 0x8200);
pub const TYPE1_HANDLER_COUNT: usize = 256;
pub const TYPE2_HANDLER_TABLE: usize = rom_addr!(0x01, 0x8470);
pub const TYPE2_HANDLER_COUNT: usize = 64;
pub const TYPE3_HANDLER_TABLE: usize = rom_addr!(0x01, 0x85f0);
pub const TYPE3_HANDLER_COUNT: usize = 128;

pub const ENTRANCE_ROOM: usize = 0x14813; // u16 per entrance
pub const ENTRANCE_Y_POSITION: usize = 0x14f59; // u16 per entrance
pub const ENTRANCE_X_POSITION: usize = 0x15063; // u16 per entrance
pub const ENTRANCE_DUNGEON: usize = 0x1548b; // u8 per entrance

/// Where each table lives in a particular ROM.  Defaults to the US release;
/// hacks that move tables around override this from the config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RomLayout {
    pub room_object_pointer: usize,
    pub room_header_pointer: usize,
    pub room_header_pointer_bank: usize,
    pub room_count: usize,
    pub type1_handler_table: usize,
    pub type2_handler_table: usize,
    pub type3_handler_table: usize,
    pub entrance_room: usize,
    pub entrance_y_position: usize,
    pub entrance_x_position: usize,
    pub entrance_dungeon: usize,
    pub entrance_count: usize,
}

impl Default for RomLayout {
    fn default() -> RomLayout {
        RomLayout {
            room_object_pointer: ROOM_OBJECT_POINTER,
            room_header_pointer: ROOM_HEADER_POINTER,
            room_header_pointer_bank: ROOM_HEADER_POINTER_BANK,
            room_count: NUMBER_OF_ROOMS,
            type1_handler_table: TYPE1_HANDLER_TABLE,
            type2_handler_table: TYPE2_HANDLER_TABLE,
            type3_handler_table: TYPE3_HANDLER_TABLE,
            entrance_room: ENTRANCE_ROOM,
            entrance_y_position: ENTRANCE_Y_POSITION,
            entrance_x_position: ENTRANCE_X_POSITION,
            entrance_dungeon: ENTRANCE_DUNGEON,
            entrance_count: NUMBER_OF_ENTRANCES,
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn rom_addr_macro_works() {
        assert_eq!(rom_addr!(0x01, 0x8200), 0x8200);
        assert_eq!(rom_addr!(0x81, 0x8200), 0x8200);
        assert_eq!(rom_addr!(0x02, 0x8000), 0x10000);
        assert_eq!(super::TYPE3_HANDLER_TABLE, 0x85f0);
    }
}
