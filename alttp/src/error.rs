use failure::Fail;
use std::io;

/// Failure to get the ROM into memory at all.  Nothing else can run without
/// it, so callers treat this as fatal.
#[derive(Debug, Fail)]
pub enum RomError {
    #[fail(display = "unable to read rom {}: {}", path, cause)]
    Io {
        path: String,
        #[cause]
        cause: io::Error,
    },
}

/// Errors in the ROM's data layout.  These are scoped to a single room (or
/// table record); batch loaders log them and move on.
#[derive(Debug, Fail, PartialEq)]
pub enum FormatError {
    #[fail(
        display = "read of {} bytes at 0x{:06x} runs past end of rom (0x{:06x} bytes)",
        len, offset, rom_len
    )]
    Truncated {
        offset: usize,
        len: usize,
        rom_len: usize,
    },

    #[fail(
        display = "room 0x{:03x} object stream ends before layer {} terminator",
        room_id, layer
    )]
    UnterminatedRoom { room_id: u16, layer: usize },
}

#[derive(Debug, Fail, PartialEq)]
pub enum GraphError {
    #[fail(display = "room 0x{:03x} is not loaded", room_id)]
    UnknownRoom { room_id: u16 },
}

#[derive(Debug, Fail, PartialEq)]
#[fail(display = "staircase label {:?} is not of the form \"To <N>\"", label)]
pub struct LabelParseError {
    pub label: String,
}
