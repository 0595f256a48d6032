use std::collections::BTreeSet;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use dungeon_core::{
    DungeonConfig, GeneratedDungeon, RoomId, RoomKind, TileOwner, TileRole, generate_dungeon,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of dungeons to generate
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
}

fn check_invariants(dungeon: &GeneratedDungeon, config: &DungeonConfig) -> Result<()> {
    let retained: Vec<RoomId> =
        dungeon.main_rooms.iter().chain(&dungeon.support_rooms).copied().collect();
    if config.grid_size == 1 {
        for (index, &a) in retained.iter().enumerate() {
            for &b in &retained[index + 1..] {
                let (left, right) = (&dungeon.rooms[a], &dungeon.rooms[b]);
                ensure!(
                    !left
                        .padded_footprint(config.room_padding)
                        .intersects(&right.padded_footprint(config.room_padding)),
                    "Invariant failed: rooms {a:?} and {b:?} overlap"
                );
            }
        }
    }

    ensure!(dungeon.graph.is_connected(), "Invariant failed: main rooms are disconnected");
    ensure!(
        dungeon.graph.edge_count() + 1 >= dungeon.main_rooms.len(),
        "Invariant failed: fewer edges than a spanning tree"
    );

    let main: BTreeSet<RoomId> = dungeon.main_rooms.iter().copied().collect();
    for tile in dungeon.tiles.iter().filter(|tile| tile.role == TileRole::Door) {
        ensure!(
            matches!(tile.owner, TileOwner::Room(id) if main.contains(&id)),
            "Invariant failed: door at {} is not owned by a main room",
            tile.pos
        );
    }

    if config.grid_size == 1
        && let Some(entry) = dungeon.special_room(RoomKind::Entry)
    {
        let reached = dungeon.tiles.reachable_from(dungeon.rooms[entry].grid_center());
        for &id in &dungeon.main_rooms {
            ensure!(
                reached.contains(&dungeon.rooms[id].grid_center()),
                "Invariant failed: main room {id:?} cannot be walked to from the entry"
            );
        }
    }

    for kind in RoomKind::SPECIAL {
        let count = dungeon.main_rooms.iter().filter(|&&id| dungeon.rooms[id].kind == kind).count();
        ensure!(count == 1, "Invariant failed: {kind} placed {count} times");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} dungeons...", args.seed, args.runs);
    let config = DungeonConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let mut regenerations = 0;
    for run in 0..args.runs {
        let seed = rng.next_u64();
        let dungeon = generate_dungeon(&config, seed)
            .with_context(|| format!("Run {run}: generation failed for seed {seed}"))?;
        check_invariants(&dungeon, &config).with_context(|| format!("Run {run}: seed {seed}"))?;
        regenerations += dungeon.attempt;
    }

    println!("Fuzzing completed successfully ({regenerations} regenerations).");
    Ok(())
}
