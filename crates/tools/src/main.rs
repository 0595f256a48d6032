use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use dungeon_core::{DungeonConfig, GeneratedDungeon, RoomKind, generate_dungeon};
use log::{LevelFilter, Log, Metadata, Record};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run seed, decimal or 0x-prefixed hex. Defaults to the clock.
    #[arg(short, long, value_parser = parse_seed)]
    seed: Option<u64>,
    /// TOML or JSON generation config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the summary as JSON instead of the map
    #[arg(long)]
    json: bool,
    /// -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Routes `log` records to stderr at the level picked by the `-v` count.
fn install_logger(verbose: u8) -> Result<()> {
    log::set_logger(&LOGGER).context("Failed to install logger")?;
    log::set_max_level(level_for(verbose));
    Ok(())
}

fn parse_seed(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|err| format!("invalid seed {text:?}: {err}"))
}

/// Explicit seed if given, otherwise the clock's nanoseconds folded into 64 bits.
fn resolve_seed(explicit: Option<u64>, clock_nanos: u128) -> u64 {
    explicit.unwrap_or((clock_nanos as u64) ^ ((clock_nanos >> 64) as u64))
}

#[derive(Debug, PartialEq, Serialize)]
struct SpecialRoom {
    kind: RoomKind,
    center: (i32, i32),
}

#[derive(Debug, PartialEq, Serialize)]
struct Summary {
    seed: u64,
    attempt: u32,
    fingerprint: String,
    main_rooms: usize,
    support_rooms: usize,
    corridors: usize,
    connections: usize,
    doors: usize,
    tiles: usize,
    special_rooms: Vec<SpecialRoom>,
}

impl Summary {
    fn of(dungeon: &GeneratedDungeon) -> Self {
        let special_rooms = RoomKind::SPECIAL
            .iter()
            .filter_map(|&kind| {
                let id = dungeon.special_room(kind)?;
                let center = dungeon.rooms[id].grid_center();
                Some(SpecialRoom { kind, center: (center.x, center.y) })
            })
            .collect();
        Self {
            seed: dungeon.seed,
            attempt: dungeon.attempt,
            fingerprint: format!("{:016x}", dungeon.fingerprint()),
            main_rooms: dungeon.main_rooms.len(),
            support_rooms: dungeon.support_rooms.len(),
            corridors: dungeon.corridors.len(),
            connections: dungeon.graph.edge_count(),
            doors: dungeon.doors.len(),
            tiles: dungeon.tiles.len(),
            special_rooms,
        }
    }

    fn report(&self) -> String {
        let mut lines = vec![
            format!("Seed: {} (attempt {})", self.seed, self.attempt),
            format!("Fingerprint: {}", self.fingerprint),
            format!(
                "Rooms: {} main, {} support, {} corridors",
                self.main_rooms, self.support_rooms, self.corridors
            ),
            format!("Connections: {}", self.connections),
            format!("Door tiles: {} of {} tiles", self.doors, self.tiles),
        ];
        for special in &self.special_rooms {
            lines.push(format!("{}: ({}, {})", special.kind, special.center.0, special.center.1));
        }
        lines.join("\n")
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    install_logger(args.verbose)?;

    let config = match &args.config {
        Some(path) => DungeonConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => DungeonConfig::default(),
    };
    let clock =
        SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_nanos()).unwrap_or(0);
    let seed = resolve_seed(args.seed, clock);
    log::debug!("generating with seed {seed}");

    let dungeon = generate_dungeon(&config, seed)
        .with_context(|| format!("Generation failed for seed {seed}"))?;
    let summary = Summary::of(&dungeon);

    if args.json {
        let text = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{text}");
    } else {
        print!("{}", dungeon.render_ascii());
        println!("{}", summary.report());
    }
    Ok(())
}
