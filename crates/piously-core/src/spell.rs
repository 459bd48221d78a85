//! The fourteen spells and the all-or-nothing cast engine.
//!
//! Spells come in seven color pairs, one pair per normal room. The first
//! spell of each pair is empowered by a relic of the same color and only
//! works while that relic stands on the caster's aura; the second needs
//! no relic. A cast runs its whole effect on a scratch copy of the board
//! and commits only if every required choice is made, so a cancelled or
//! failed cast leaves no trace, not even the tapped flag.

use crate::board::{Board, Faction, Occupant, Op, RelicId, RoomId};
use crate::game::GameError;
use crate::hex::{Direction, HexCoord};
use crate::input::{Directive, InputProvider};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellKind {
    Priestess,
    Purify,
    Imposter,
    Imprint,
    Opportunist,
    Overwork,
    Usurper,
    Upset,
    Stonemason,
    Shovel,
    Locksmith,
    Leap,
    Yeoman,
    Yoke,
}

impl SpellKind {
    /// All fourteen spells, paired by room in room order.
    pub const ALL: [SpellKind; 14] = [
        SpellKind::Priestess,
        SpellKind::Purify,
        SpellKind::Imposter,
        SpellKind::Imprint,
        SpellKind::Opportunist,
        SpellKind::Overwork,
        SpellKind::Usurper,
        SpellKind::Upset,
        SpellKind::Stonemason,
        SpellKind::Shovel,
        SpellKind::Locksmith,
        SpellKind::Leap,
        SpellKind::Yeoman,
        SpellKind::Yoke,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SpellKind::Priestess => "Priestess",
            SpellKind::Purify => "Purify",
            SpellKind::Imposter => "Imposter",
            SpellKind::Imprint => "Imprint",
            SpellKind::Opportunist => "Opportunist",
            SpellKind::Overwork => "Overwork",
            SpellKind::Usurper => "Usurper",
            SpellKind::Upset => "Upset",
            SpellKind::Stonemason => "Stonemason",
            SpellKind::Shovel => "Shovel",
            SpellKind::Locksmith => "Locksmith",
            SpellKind::Leap => "Leap",
            SpellKind::Yeoman => "Yeoman",
            SpellKind::Yoke => "Yoke",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            SpellKind::Priestess => "Grow linked region",
            SpellKind::Purify => "Bless underneath adjacent object",
            SpellKind::Imposter => "Copy auras from Imposter's room to linked room",
            SpellKind::Imprint => "Copy auras from around enemy to self",
            SpellKind::Opportunist => "Reuse spell from linked room",
            SpellKind::Overwork => "Gain one action per adjacent object",
            SpellKind::Usurper => "Shrink region twice, then grow twice",
            SpellKind::Upset => "Rearrange auras under and around self",
            SpellKind::Stonemason => "Move linked room anywhere",
            SpellKind::Shovel => "Move the Shovel next to you, or anywhere if you stand on it",
            SpellKind::Locksmith => "Move linked object anywhere",
            SpellKind::Leap => "Trade places with object in row",
            SpellKind::Yeoman => "Rearrange objects in linked rooms",
            SpellKind::Yoke => "Move self and another object one space",
        }
    }

    /// The room whose spells this one belongs to.
    pub const fn home_room(self) -> RoomId {
        match self {
            SpellKind::Priestess | SpellKind::Purify => RoomId::P,
            SpellKind::Imposter | SpellKind::Imprint => RoomId::I,
            SpellKind::Opportunist | SpellKind::Overwork => RoomId::O,
            SpellKind::Usurper | SpellKind::Upset => RoomId::U,
            SpellKind::Stonemason | SpellKind::Shovel => RoomId::S,
            SpellKind::Locksmith | SpellKind::Leap => RoomId::L,
            SpellKind::Yeoman | SpellKind::Yoke => RoomId::Y,
        }
    }

    /// The relic empowering this spell, if it is the artwork-bearing half
    /// of its pair.
    pub const fn relic(self) -> Option<RelicId> {
        match self {
            SpellKind::Priestess => Some(RelicId::Pink),
            SpellKind::Imposter => Some(RelicId::Indigo),
            SpellKind::Opportunist => Some(RelicId::Orange),
            SpellKind::Usurper => Some(RelicId::Umber),
            SpellKind::Stonemason => Some(RelicId::Sapphire),
            SpellKind::Locksmith => Some(RelicId::Lime),
            SpellKind::Yeoman => Some(RelicId::Yellow),
            _ => None,
        }
    }

    /// The (relic-bearing, plain) spell pair of a normal room.
    pub const fn pair_for(room: RoomId) -> Option<(SpellKind, SpellKind)> {
        match room {
            RoomId::P => Some((SpellKind::Priestess, SpellKind::Purify)),
            RoomId::I => Some((SpellKind::Imposter, SpellKind::Imprint)),
            RoomId::O => Some((SpellKind::Opportunist, SpellKind::Overwork)),
            RoomId::U => Some((SpellKind::Usurper, SpellKind::Upset)),
            RoomId::S => Some((SpellKind::Stonemason, SpellKind::Shovel)),
            RoomId::L => Some((SpellKind::Locksmith, SpellKind::Leap)),
            RoomId::Y => Some((SpellKind::Yeoman, SpellKind::Yoke)),
            RoomId::Shovel => None,
        }
    }
}

impl fmt::Display for SpellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mutable per-game state of one spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub kind: SpellKind,
    /// Owning faction, set when the spell's room is first claimed.
    pub faction: Option<Faction>,
    /// Whether the spell has been cast this turn.
    pub tapped: bool,
}

impl Spell {
    pub fn new(kind: SpellKind) -> Self {
        Self {
            kind,
            faction: None,
            tapped: false,
        }
    }
}

/// Cast a spell for the active faction.
///
/// Returns `Ok(true)` if the cast completed and was committed, `Ok(false)`
/// if the player cancelled partway (board untouched, spell untapped).
/// Errors also leave the board untouched.
pub fn cast(
    board: &mut Board,
    kind: SpellKind,
    input: &mut dyn InputProvider,
) -> Result<bool, GameError> {
    let caster = board.faction;
    let spell = board.spell(kind);
    if spell.faction != Some(caster) {
        return Err(GameError::NotOwner);
    }
    if spell.tapped {
        return Err(GameError::AlreadyCast);
    }
    if !board.spell_empowered(kind) {
        return Err(GameError::RelicNotEmpowered);
    }

    let mut scratch = board.clone();
    let done = match kind {
        SpellKind::Priestess => priestess(&mut scratch, input)?,
        SpellKind::Purify => purify(&mut scratch, input)?,
        SpellKind::Imposter => imposter(&mut scratch, input)?,
        SpellKind::Imprint => imprint(&mut scratch)?,
        SpellKind::Opportunist => opportunist(&mut scratch, input)?,
        SpellKind::Overwork => overwork(&mut scratch)?,
        SpellKind::Usurper => usurper(&mut scratch, input)?,
        SpellKind::Upset => upset(&mut scratch, input)?,
        SpellKind::Stonemason => stonemason(&mut scratch, input)?,
        SpellKind::Shovel => shovel(&mut scratch, input)?,
        SpellKind::Locksmith => locksmith(&mut scratch, input)?,
        SpellKind::Leap => leap(&mut scratch, input)?,
        SpellKind::Yeoman => yeoman(&mut scratch, input)?,
        SpellKind::Yoke => yoke(&mut scratch, input)?,
    };
    if done {
        scratch.spell_mut(kind).tapped = true;
        *board = scratch;
        tracing::debug!(spell = kind.name(), faction = %caster, "spell committed");
    } else {
        tracing::debug!(spell = kind.name(), faction = %caster, "spell cancelled");
    }
    Ok(done)
}

// ==================== Shared helpers ====================

fn relic_coord(board: &Board, kind: SpellKind) -> Result<HexCoord, GameError> {
    let id = kind
        .relic()
        .ok_or_else(|| GameError::Invariant(format!("{kind} has no relic")))?;
    board
        .relic(id)
        .coord
        .ok_or_else(|| GameError::Invariant(format!("{id} relic is not placed")))
}

fn player_coord(board: &Board, faction: Faction) -> Result<HexCoord, GameError> {
    board
        .player(faction)
        .coord
        .ok_or_else(|| GameError::Invariant(format!("{faction} player is not placed")))
}

// Provider answers are not trusted: an index past the candidate list is an
// invariant breach, not a panic.
fn checked(i: usize, len: usize) -> Result<usize, GameError> {
    if i < len {
        Ok(i)
    } else {
        Err(GameError::Invariant(format!(
            "input chose option {i} of {len}"
        )))
    }
}

fn pick_index(
    input: &mut dyn InputProvider,
    prompt: &str,
    labels: &[String],
) -> Result<Option<usize>, GameError> {
    match input.choose_one(prompt, labels) {
        None => Ok(None),
        Some(i) => checked(i, labels.len()).map(Some),
    }
}

fn pick_coord(
    input: &mut dyn InputProvider,
    prompt: &str,
    candidates: &[HexCoord],
) -> Result<Option<HexCoord>, GameError> {
    match input.choose_location(prompt, candidates) {
        None => Ok(None),
        Some(i) => checked(i, candidates.len()).map(|i| Some(candidates[i])),
    }
}

fn pick_occupant(
    input: &mut dyn InputProvider,
    prompt: &str,
    candidates: &[Occupant],
) -> Result<Option<Occupant>, GameError> {
    let labels: Vec<String> = candidates.iter().map(|o| o.to_string()).collect();
    Ok(pick_index(input, prompt, &labels)?.map(|i| candidates[i]))
}

/// Rearrange a bag of auras onto a set of cells: clear the cells, then let
/// the player assign each aura to a still-bare cell. Used by Imposter and
/// Upset.
fn place_auras(
    board: &mut Board,
    input: &mut dyn InputProvider,
    auras: Vec<Faction>,
    cells: Vec<HexCoord>,
) -> Result<bool, GameError> {
    if auras.len() > cells.len() {
        return Err(GameError::Invariant(
            "more auras than cells to put them on".to_string(),
        ));
    }
    for &coord in &cells {
        board.apply_op(Op::ClearAura { at: coord })?;
    }
    for aura in auras {
        let open: Vec<HexCoord> = cells
            .iter()
            .copied()
            .filter(|&c| board.cell(c).is_some_and(|cell| cell.aura.is_none()))
            .collect();
        let prompt = format!("Pick a hex for a {aura} aura");
        let Some(target) = pick_coord(input, &prompt, &open)? else {
            return Ok(false);
        };
        board.apply_op(Op::PlaceAura {
            at: target,
            faction: aura,
        })?;
    }
    Ok(true)
}

// ==================== Effects ====================

fn priestess(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let anchor = relic_coord(board, SpellKind::Priestess)?;
    let boundary = board.region_boundary(anchor);
    if boundary.is_empty() {
        return Err(GameError::IllegalMove(
            "there is no hex the Priestess may bless".to_string(),
        ));
    }
    let Some(target) = pick_coord(input, "Pick a hex to grow the linked region", &boundary)? else {
        return Ok(false);
    };
    board.apply_op(Op::PlaceAura {
        at: target,
        faction: board.faction,
    })?;
    Ok(true)
}

fn purify(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let caster = board.faction;
    let here = player_coord(board, caster)?;
    let candidates: Vec<HexCoord> = board
        .adjacent_cells(here)
        .into_iter()
        .filter(|&c| {
            let cell = board.cell(c).expect("adjacent cells exist");
            cell.occupant.is_some() && cell.aura != Some(caster)
        })
        .collect();
    if candidates.is_empty() {
        return Err(GameError::IllegalMove("no hex to Purify".to_string()));
    }
    let Some(target) = pick_coord(input, "Pick a hex to bless", &candidates)? else {
        return Ok(false);
    };
    board.apply_op(Op::PlaceAura {
        at: target,
        faction: caster,
    })?;
    Ok(true)
}

fn imposter(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let anchor = relic_coord(board, SpellKind::Imposter)?;
    let rooms = board.linked_rooms(anchor, true);
    let labels: Vec<String> = rooms.iter().map(|r| r.to_string()).collect();
    let Some(i) = pick_index(input, "Pick a room to copy auras into", &labels)? else {
        return Ok(false);
    };
    let target_room = rooms[i];

    // the aura bag is read from the relic's own room before anything moves
    let source_room = board
        .room_of(anchor)
        .ok_or_else(|| GameError::Invariant("relic cell has no room".to_string()))?;
    let auras: Vec<Faction> = board
        .room(source_room)
        .map(|room| room.cells.iter().filter_map(|c| c.aura).collect())
        .unwrap_or_default();

    // the single-cell Shovel cannot hold more than one aura, so it only
    // takes one, chosen if the bag is mixed
    if target_room == RoomId::Shovel {
        let shovel_cell = board
            .room(RoomId::Shovel)
            .and_then(|room| room.cells.first())
            .map(|cell| cell.coord)
            .ok_or_else(|| GameError::Invariant("Shovel room vanished".to_string()))?;
        let dark = auras.contains(&Faction::Dark);
        let light = auras.contains(&Faction::Light);
        let aura = match (dark, light) {
            (false, false) => return Ok(true),
            (true, true) => {
                let options = vec![Faction::Dark.to_string(), Faction::Light.to_string()];
                let Some(i) = pick_index(input, "Pick the aura for the Shovel", &options)? else {
                    return Ok(false);
                };
                [Faction::Dark, Faction::Light][i]
            }
            (true, false) => Faction::Dark,
            (false, true) => Faction::Light,
        };
        board.apply_op(Op::PlaceAura {
            at: shovel_cell,
            faction: aura,
        })?;
        return Ok(true);
    }

    let cells: Vec<HexCoord> = board
        .room(target_room)
        .map(|room| room.cells.iter().map(|c| c.coord).collect())
        .unwrap_or_default();
    place_auras(board, input, auras, cells)
}

fn imprint(board: &mut Board) -> Result<bool, GameError> {
    let caster = board.faction;
    let here = player_coord(board, caster)?;
    let there = player_coord(board, caster.other())?;

    if let Some(aura) = board.cell(there).and_then(|c| c.aura) {
        board.apply_op(Op::PlaceAura {
            at: here,
            faction: aura,
        })?;
    }
    for direction in Direction::ALL {
        let source = board
            .neighbor_in(there, direction)
            .and_then(|c| board.cell(c))
            .and_then(|c| c.aura);
        if let (Some(aura), Some(target)) = (source, board.neighbor_in(here, direction)) {
            board.apply_op(Op::PlaceAura {
                at: target,
                faction: aura,
            })?;
        }
    }
    Ok(true)
}

fn opportunist(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let caster = board.faction;
    let anchor = relic_coord(board, SpellKind::Opportunist)?;
    // the Shovel counts as an outpost of room S here
    let rooms: Vec<RoomId> = board
        .linked_rooms(anchor, true)
        .into_iter()
        .map(|r| if r == RoomId::Shovel { RoomId::S } else { r })
        .collect();

    let eligible: Vec<SpellKind> = board
        .spells()
        .iter()
        .filter(|s| {
            s.faction == Some(caster)
                && s.tapped
                && s.kind != SpellKind::Opportunist
                && rooms.contains(&s.kind.home_room())
        })
        .map(|s| s.kind)
        .collect();
    if eligible.is_empty() {
        return Err(GameError::IllegalMove(
            "there is no linked used spell".to_string(),
        ));
    }
    let labels: Vec<String> = eligible.iter().map(|k| k.to_string()).collect();
    let Some(i) = pick_index(input, "Pick a spell to ready again", &labels)? else {
        return Ok(false);
    };
    board.spell_mut(eligible[i]).tapped = false;
    Ok(true)
}

fn overwork(board: &mut Board) -> Result<bool, GameError> {
    let here = player_coord(board, board.faction)?;
    let gained = board
        .adjacent_cells(here)
        .into_iter()
        .filter(|&c| board.cell(c).is_some_and(|cell| cell.occupant.is_some()))
        .count() as i32;
    board.apply_op(Op::AdjustActions(gained))?;
    Ok(true)
}

fn usurper(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let caster = board.faction;
    let anchor = relic_coord(board, SpellKind::Usurper)?;

    for _ in 0..2 {
        let region = board.linked_region(anchor);
        let prompt = format!("Pick a {caster} aura to flip");
        let Some(target) = pick_coord(input, &prompt, &region)? else {
            return Ok(false);
        };
        board.apply_op(Op::PlaceAura {
            at: target,
            faction: caster.other(),
        })?;
        // flipping under the relic breaks the link and ends the cast early
        if board.cell(anchor).and_then(|c| c.aura) != Some(caster) {
            return Ok(true);
        }
    }
    for _ in 0..2 {
        let boundary = board.region_boundary(anchor);
        let Some(target) = pick_coord(input, "Pick a hex on which to grow", &boundary)? else {
            return Ok(false);
        };
        board.apply_op(Op::PlaceAura {
            at: target,
            faction: caster,
        })?;
    }
    Ok(true)
}

fn upset(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let here = player_coord(board, board.faction)?;
    let mut neighborhood = board.adjacent_cells(here);
    neighborhood.push(here);
    let auras: Vec<Faction> = neighborhood
        .iter()
        .filter_map(|&c| board.cell(c).and_then(|cell| cell.aura))
        .collect();
    place_auras(board, input, auras, neighborhood)
}

fn stonemason(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let anchor = relic_coord(board, SpellKind::Stonemason)?;
    let rooms = board.linked_rooms(anchor, true);
    let labels: Vec<String> = rooms.iter().map(|r| r.to_string()).collect();
    let Some(i) = pick_index(input, "Pick a linked room to move", &labels)? else {
        return Ok(false);
    };
    let moving = rooms[i];

    loop {
        let Some(directive) = input.directive("Step or rotate the room, confirm to settle") else {
            return Ok(false);
        };
        match directive {
            Directive::Step(direction) => board.translate_room(moving, direction.delta())?,
            Directive::RotateCw => board.rotate_room(moving, true)?,
            Directive::RotateCcw => board.rotate_room(moving, false)?,
            Directive::Confirm => {
                if board.hex_collision(moving) {
                    continue;
                }
                if board.room_connectivity_ok().is_err() {
                    continue;
                }
                return Ok(true);
            }
        }
    }
}

fn shovel(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let here = player_coord(board, board.faction)?;
    let on_shovel = board.room_of(here) == Some(RoomId::Shovel);
    let candidates = if on_shovel {
        board.open_neighbors(&board.all_coords())
    } else {
        board.open_neighbors(&[here])
    };
    if candidates.is_empty() {
        return Err(GameError::IllegalMove(
            "there is nowhere to place the Shovel".to_string(),
        ));
    }
    let Some(target) = pick_coord(input, "Pick where the Shovel will go", &candidates)? else {
        return Ok(false);
    };
    match board.room(RoomId::Shovel) {
        Some(room) => {
            let delta = target - room.root;
            board.translate_room(RoomId::Shovel, delta)?;
        }
        None => board.place_room(RoomId::Shovel, target, 0)?,
    }
    Ok(true)
}

fn locksmith(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let anchor = relic_coord(board, SpellKind::Locksmith)?;
    let movable: Vec<Occupant> = board
        .linked_region(anchor)
        .into_iter()
        .filter_map(|c| board.cell(c).and_then(|cell| cell.occupant))
        .collect();
    if movable.is_empty() {
        return Err(GameError::IllegalMove(
            "there is no linked object to move".to_string(),
        ));
    }
    let Some(target) = pick_occupant(input, "Pick an object to move", &movable)? else {
        return Ok(false);
    };
    let destinations: Vec<HexCoord> = board
        .all_cells()
        .filter(|cell| cell.occupant.is_none())
        .map(|cell| cell.coord)
        .collect();
    let prompt = format!("Pick where to move the {target}");
    let Some(to) = pick_coord(input, &prompt, &destinations)? else {
        return Ok(false);
    };
    board.apply_op(Op::MoveOccupant {
        occupant: target,
        to,
    })?;
    Ok(true)
}

fn leap(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let caster = board.faction;
    let here = player_coord(board, caster)?;
    let leapable: Vec<Occupant> = board
        .placed_non_player_objects()
        .into_iter()
        .filter(|&o| {
            board
                .occupant_coord(o)
                .is_some_and(|c| board.leap_eligible(here, c))
        })
        .collect();
    if leapable.is_empty() {
        return Err(GameError::IllegalMove(
            "there is no object to Leap with".to_string(),
        ));
    }
    let Some(target) = pick_occupant(input, "Pick an object to Leap with", &leapable)? else {
        return Ok(false);
    };
    board.swap_occupants(Occupant::Player(caster), target)?;
    Ok(true)
}

fn yeoman(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let caster = board.faction;
    let anchor = relic_coord(board, SpellKind::Yeoman)?;
    let rooms = board.linked_rooms(anchor, true);
    let choices = vec!["Move an object".to_string(), "Finish".to_string()];

    loop {
        let Some(choice) = pick_index(input, "Keep rearranging?", &choices)? else {
            return Ok(false);
        };
        if choice == 1 {
            return Ok(true);
        }

        let occupied: Vec<HexCoord> = rooms
            .iter()
            .filter_map(|&id| board.room(id))
            .flat_map(|room| room.cells.iter())
            .filter(|cell| cell.occupant.is_some())
            .map(|cell| cell.coord)
            .collect();
        let Some(from) = pick_coord(input, "Pick an object to move", &occupied)? else {
            return Ok(false);
        };
        let mover = board
            .cell(from)
            .and_then(|c| c.occupant)
            .ok_or_else(|| GameError::Invariant("picked cell lost its occupant".to_string()))?;

        let room = board
            .room_of(from)
            .ok_or_else(|| GameError::Invariant("occupied cell has no room".to_string()))?;
        let within: Vec<HexCoord> = board
            .room(room)
            .map(|r| r.cells.iter().map(|c| c.coord).collect())
            .unwrap_or_default();
        let prompt = format!("Pick where to move the {mover}");
        let Some(to) = pick_coord(input, &prompt, &within)? else {
            return Ok(false);
        };
        if to != from {
            match board.cell(to).and_then(|c| c.occupant) {
                Some(other) => board.swap_occupants(mover, other)?,
                None => board.apply_op(Op::MoveOccupant {
                    occupant: mover,
                    to,
                })?,
            }
        }

        // moving pieces may carry the relic off the caster's aura
        if board.cell(anchor).and_then(|c| c.aura) != Some(caster) {
            return Ok(true);
        }
    }
}

fn yoke(board: &mut Board, input: &mut dyn InputProvider) -> Result<bool, GameError> {
    let caster = board.faction;
    let here = player_coord(board, caster)?;
    let others = board.placed_non_player_objects();
    if others.is_empty() {
        return Err(GameError::IllegalMove(
            "there is no other object to Yoke".to_string(),
        ));
    }
    let Some(target) = pick_occupant(input, "Pick an object to Yoke with", &others)? else {
        return Ok(false);
    };
    let there = board
        .occupant_coord(target)
        .ok_or_else(|| GameError::Invariant("yoked object is not placed".to_string()))?;

    let player = Occupant::Player(caster);
    // directions in which both movers have a destination that is empty or
    // holds the other mover
    let mut moves: Vec<(HexCoord, HexCoord)> = Vec::new();
    for direction in Direction::ALL {
        let player_dest = board.neighbor_in(here, direction);
        let target_dest = board.neighbor_in(there, direction);
        let (Some(pd), Some(td)) = (player_dest, target_dest) else {
            continue;
        };
        let player_ok = board
            .cell(pd)
            .is_some_and(|c| c.occupant.is_none() || c.occupant == Some(target));
        let target_ok = board
            .cell(td)
            .is_some_and(|c| c.occupant.is_none() || c.occupant == Some(player));
        if player_ok && target_ok {
            moves.push((pd, td));
        }
    }
    if moves.is_empty() {
        return Err(GameError::IllegalMove(
            "these two objects have no common direction to move".to_string(),
        ));
    }

    let player_dests: Vec<HexCoord> = moves.iter().map(|&(pd, _)| pd).collect();
    let Some(i) = input.choose_location("Pick your destination", &player_dests) else {
        return Ok(false);
    };
    let (pd, td) = moves[checked(i, moves.len())?];

    // move whichever piece vacates the other's destination first
    if pd == there {
        board.move_occupant(target, Some(there), Some(td))?;
        board.move_occupant(player, Some(here), Some(pd))?;
    } else {
        board.move_occupant(player, Some(here), Some(pd))?;
        board.move_occupant(target, Some(there), Some(td))?;
    }
    Ok(true)
}
