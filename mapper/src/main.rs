use dot;
use failure::{format_err, Error};
use log::debug;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::env;
use std::fs::{self, File};
use std::path::PathBuf;
use structopt::StructOpt;

use alttp::collision;
use alttp::config::Config;
use alttp::entrance::EntranceTable;
use alttp::export::WorldGraph;
use alttp::locate::{Localizer, RoomNames};
use alttp::object::ObjectEntry;
use alttp::rom::snes_display;
use alttp::room::{Compositing, RoomModel, RoomSummary, LAYER_NAMES};
use alttp::search;
use alttp::{DungeonData, EdgeKind, RomImage, RomLayout};

#[derive(Debug, StructOpt)]
#[structopt(name = "mapper", about = "Dungeon room decoder and room graph tools")]
struct Opt {
    /// Rom to read.  Defaults to the first rom found from the config's list.
    #[structopt(short, long, parse(from_os_str))]
    rom: Option<PathBuf>,

    /// JSON config file.
    #[structopt(short, long, parse(from_os_str), env = "MAPPER_CONFIG")]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Decode one room and print its objects, doors and layer summary.
    Analyze {
        #[structopt(parse(try_from_str = parse_int::parse))]
        room: u16,
    },

    /// Collision offsets covered by a room's objects.
    Collision {
        #[structopt(parse(try_from_str = parse_int::parse))]
        room: u16,

        /// Only objects with this id.
        #[structopt(long, parse(try_from_str = parse_int::parse))]
        filter: Option<u16>,

        /// Use each object's whole footprint instead of its origin tile.
        #[structopt(long)]
        expand: bool,

        /// Print an asm data block instead of JSON.
        #[structopt(long)]
        asm: bool,

        #[structopt(long)]
        label: Option<String>,
    },

    /// Export the room graph of every room.
    Graph {
        /// Write the JSON graph here instead of stdout.
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,

        /// Also render the room graph as Graphviz.
        #[structopt(long, parse(from_os_str))]
        dot: Option<PathBuf>,
    },

    /// Rooms reachable from a dungeon entrance.
    Discover {
        #[structopt(parse(try_from_str = parse_int::parse))]
        entrance: u8,

        #[structopt(long)]
        depth: Option<usize>,
    },

    /// Shortest route between two rooms.
    Path {
        #[structopt(parse(try_from_str = parse_int::parse))]
        from: u16,
        #[structopt(parse(try_from_str = parse_int::parse))]
        to: u16,
    },

    /// Where a player position is.  Overworld unless a room is given.
    Locate {
        #[structopt(long, parse(try_from_str = parse_int::parse))]
        room: Option<u16>,
        #[structopt(parse(try_from_str = parse_int::parse))]
        x: u16,
        #[structopt(parse(try_from_str = parse_int::parse))]
        y: u16,
    },

    /// Dump the entrance table, or one entrance.
    Entrance {
        #[structopt(parse(try_from_str = parse_int::parse))]
        id: Option<u8>,
    },
}

type Nd = u16;
type Ed = (u16, u16, EdgeKind);

struct RoomGraph {
    nodes: Vec<Nd>,
    edges: Vec<Ed>,
    names: RoomNames,
}

impl RoomGraph {
    fn new(data: &DungeonData, names: RoomNames) -> RoomGraph {
        let mut nodes: BTreeSet<u16> = data.rooms.keys().cloned().collect();
        let mut edges = Vec::new();
        for (&id, room) in &data.rooms {
            for edge in &room.neighbors {
                nodes.insert(edge.target_room);
                edges.push((id, edge.target_room, edge.kind));
            }
        }
        RoomGraph {
            nodes: nodes.into_iter().collect(),
            edges: edges,
            names: names,
        }
    }
}

impl<'a> dot::Labeller<'a, Nd, Ed> for RoomGraph {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("Dungeons").unwrap()
    }

    fn node_id(&'a self, n: &Nd) -> dot::Id<'a> {
        dot::Id::new(format!("room_{:03x}", *n)).unwrap()
    }

    fn node_label(&'a self, n: &Nd) -> dot::LabelText<'a> {
        dot::LabelText::label(self.names.name(*n).into_owned())
    }

    fn edge_label(&'a self, e: &Ed) -> dot::LabelText<'a> {
        let label = match e.2 {
            EdgeKind::Door => "door",
            EdgeKind::Stair => "stair",
            EdgeKind::Holewarp => "hole",
        };
        dot::LabelText::label(label)
    }
}

impl<'a> dot::GraphWalk<'a, Nd, Ed> for RoomGraph {
    fn nodes(&'a self) -> dot::Nodes<'a, Nd> {
        Cow::Borrowed(&self.nodes[..])
    }

    fn edges(&'a self) -> dot::Edges<'a, Ed> {
        Cow::Borrowed(&self.edges[..])
    }

    fn source(&self, e: &Ed) -> Nd {
        e.0
    }

    fn target(&self, e: &Ed) -> Nd {
        e.1
    }
}

#[derive(Serialize)]
struct ObjectListing<'a> {
    #[serde(flatten)]
    object: &'a ObjectEntry,
    layer_name: &'static str,
    description: Cow<'static, str>,
    draw_routine: Option<&'static str>,
    // Bank $01 address of the routine that draws the object.
    handler: Option<u16>,
}

#[derive(Serialize)]
struct RoomAnalysis<'a> {
    name: String,
    // Where `room.data_address` sits in the cartridge's own address space.
    snes_address: String,
    summary: RoomSummary,
    compositing: Compositing,
    room: &'a RoomModel,
    objects: Vec<ObjectListing<'a>>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(opt: &Opt) -> Result<Config, Error> {
    let mut config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    for var in &["Z3ED_BIN", "Z3ED_PATH"] {
        if let Ok(path) = env::var(var) {
            config.companion_tool = PathBuf::from(path);
            break;
        }
    }
    debug!("companion tool: {}", config.companion_tool.display());
    Ok(config)
}

fn analyze(
    rom: &RomImage,
    layout: &RomLayout,
    data: &DungeonData,
    names: &RoomNames,
    room_id: u16,
) -> Result<(), Error> {
    let room = room_or_error(data, room_id)?;
    let objects = room
        .objects()
        .map(|obj| ObjectListing {
            object: obj,
            layer_name: LAYER_NAMES[obj.layer as usize],
            description: obj.description(),
            draw_routine: obj.draw_routine(),
            handler: obj.handler(rom, layout).ok(),
        })
        .collect();
    print_json(&RoomAnalysis {
        name: names.name(room_id).into_owned(),
        snes_address: snes_display(room.data_address),
        summary: room.summary(),
        compositing: room.compositing(),
        room: room,
        objects: objects,
    })
}

fn room_or_error(data: &DungeonData, room_id: u16) -> Result<&RoomModel, Error> {
    if let Some(room) = data.rooms.get(&room_id) {
        return Ok(room);
    }
    match data.failures.iter().find(|(id, _)| *id == room_id) {
        Some((_, e)) => Err(format_err!("room 0x{:02X}: {}", room_id, e)),
        None => Err(format_err!("room 0x{:02X} not found", room_id)),
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opt = Opt::from_args();
    let config = load_config(&opt)?;
    let names = config.names();
    let layout = &config.layout;

    let rom_path = opt.rom.clone();
    let load_rom = || -> Result<RomImage, Error> {
        Ok(RomImage::load(config.find_rom(rom_path.as_deref())?)?)
    };

    match opt.cmd {
        Command::Analyze { room } => {
            let rom = load_rom()?;
            let data = alttp::load(&rom, layout, vec![room]);
            analyze(&rom, layout, &data, &names, room)?;
        }

        Command::Collision {
            room,
            filter,
            expand,
            asm,
            label,
        } => {
            let rom = load_rom()?;
            let data = alttp::load(&rom, layout, vec![room]);
            let report = collision::analyze(room_or_error(&data, room)?, filter, expand);
            if asm {
                println!("{}", report.to_asm(label.as_ref().map(|l| l.as_str())));
            } else {
                print_json(&report)?;
            }
        }

        Command::Graph {
            output,
            dot: dot_path,
        } => {
            let rom = load_rom()?;
            let data = alttp::load_all(&rom, layout);
            let entrances = EntranceTable::load(&rom, layout);
            let graph = WorldGraph::build(&data.rooms, &entrances, &names);
            match output {
                Some(path) => fs::write(path, graph.to_json()?)?,
                None => println!("{}", graph.to_json()?),
            }
            if let Some(path) = dot_path {
                let mut f = File::create(path)?;
                dot::render(&RoomGraph::new(&data, names.clone()), &mut f)?;
            }
        }

        Command::Discover { entrance, depth } => {
            let rom = load_rom()?;
            let entrances = EntranceTable::load(&rom, layout);
            let entrance = entrances
                .get(entrance)
                .ok_or(format_err!("unknown entrance 0x{:02X}", entrance))?;
            let data = alttp::load_all(&rom, layout);
            let depth = depth.unwrap_or(config.discovery_depth);
            print_json(&search::discover_from_entrance(
                &data.rooms,
                entrance,
                depth,
                &names,
            ))?;
        }

        Command::Path { from, to } => {
            let rom = load_rom()?;
            let data = alttp::load_all(&rom, layout);
            let path = search::shortest_path(&data.rooms, from, to);
            if path.is_empty() {
                return Err(format_err!("no path from 0x{:02X} to 0x{:02X}", from, to));
            }
            for (room_id, edge) in &path {
                match edge {
                    Some(edge) => println!(
                        "  --[{:?}]--> 0x{:02X} {}",
                        edge.kind,
                        room_id,
                        names.name(*room_id)
                    ),
                    None => println!("0x{:02X} {}", room_id, names.name(*room_id)),
                }
            }
        }

        Command::Locate { room, x, y } => {
            let localizer = Localizer::new(&names);
            let pos = match room {
                Some(room) => localizer.dungeon(room, x, y),
                None => localizer.overworld(x, y),
            };
            print_json(&pos)?;
        }

        Command::Entrance { id } => {
            let rom = load_rom()?;
            let entrances = EntranceTable::load(&rom, layout);
            match id {
                Some(id) => print_json(
                    entrances
                        .get(id)
                        .ok_or(format_err!("unknown entrance 0x{:02X}", id))?,
                )?,
                None => print_json(&entrances.iter().collect::<Vec<_>>())?,
            }
        }
    }

    Ok(())
}
