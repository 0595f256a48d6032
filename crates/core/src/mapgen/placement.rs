//! Special-room assignment over the final main rooms.
//!
//! Each kind first gets a bounded number of uniform random picks checked
//! against its eligibility rule. When every pick misses, the rule is relaxed
//! (except for the entry, whose two-connection rule is structural) and one of
//! the remaining eligible rooms is drawn. If nothing is eligible even then,
//! placement fails with a recoverable error.

use crate::error::GenerationError;
use crate::rng::DungeonRng;
use crate::types::{RoomId, RoomKind};

use super::model::{Room, RoomArena};

/// Connections the entry room needs so the player can leave it two ways.
pub const ENTRY_MIN_CONNECTIONS: usize = 2;

fn is_eligible(room: &Room, kind: RoomKind) -> bool {
    room.kind == RoomKind::Unassigned
        && match kind {
            RoomKind::Entry => room.connected_ids.len() >= ENTRY_MIN_CONNECTIONS,
            RoomKind::Unassigned => false,
            RoomKind::Boss | RoomKind::Shop | RoomKind::MiniBoss => room.is_enclosed,
        }
}

fn is_eligible_relaxed(room: &Room, kind: RoomKind) -> bool {
    match kind {
        RoomKind::Entry => is_eligible(room, kind),
        _ => room.kind == RoomKind::Unassigned,
    }
}

/// Picks a main room for `kind` and tags it.
pub fn place_kind(
    rooms: &mut RoomArena,
    main_rooms: &[RoomId],
    kind: RoomKind,
    max_attempts: u32,
    rng: &mut DungeonRng,
) -> Result<RoomId, GenerationError> {
    if main_rooms.is_empty() {
        return Err(GenerationError::UnterminatedPlacementSearch { kind, attempts: 0 });
    }

    for _ in 0..max_attempts {
        let candidate = main_rooms[rng.index(main_rooms.len())];
        if let Some(room) = rooms.get_mut(candidate)
            && is_eligible(room, kind)
        {
            room.kind = kind;
            return Ok(candidate);
        }
    }

    let relaxed: Vec<RoomId> = main_rooms
        .iter()
        .copied()
        .filter(|&id| rooms.get(id).is_some_and(|room| is_eligible_relaxed(room, kind)))
        .collect();
    if relaxed.is_empty() {
        return Err(GenerationError::UnterminatedPlacementSearch { kind, attempts: max_attempts });
    }
    log::debug!("{kind} placement fell back to {} relaxed candidates", relaxed.len());
    let id = relaxed[rng.index(relaxed.len())];
    rooms[id].kind = kind;
    Ok(id)
}

/// Assigns entry, boss, shop and mini-boss in that order.
pub fn place_special_rooms(
    rooms: &mut RoomArena,
    main_rooms: &[RoomId],
    max_attempts: u32,
    rng: &mut DungeonRng,
) -> Result<Vec<(RoomKind, RoomId)>, GenerationError> {
    RoomKind::SPECIAL
        .iter()
        .map(|&kind| place_kind(rooms, main_rooms, kind, max_attempts, rng).map(|id| (kind, id)))
        .collect()
}
