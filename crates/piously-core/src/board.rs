//! Board state: rooms, cells, relics, players, and the graph queries the
//! spell engine is built on.
//!
//! The board is an irregular patch of hexes owned by rigid rooms. There is
//! no background grid; a coordinate is "on the board" exactly when some
//! room has a cell there. All lookups are keyed by coordinate equality, not
//! identity, because rooms (and their cells) move during setup and via the
//! Stonemason and Shovel spells.

use crate::hex::{Direction, HexCoord};
use crate::spell::{Spell, SpellKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::game::GameError;

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Light,
    Dark,
}

impl Faction {
    /// The opposing faction.
    pub const fn other(self) -> Faction {
        match self {
            Faction::Light => Faction::Dark,
            Faction::Dark => Faction::Light,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Faction::Light => write!(f, "Light"),
            Faction::Dark => write!(f, "Dark"),
        }
    }
}

/// Identifier for a room. The seven normal rooms spell the game's name;
/// the Shovel is the single-hex utility room, placed mid-game by its spell
/// and excluded from the win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomId {
    P,
    I,
    O,
    U,
    S,
    L,
    Y,
    Shovel,
}

impl RoomId {
    /// The seven normal rooms, in placement order.
    pub const NORMAL: [RoomId; 7] = [
        RoomId::P,
        RoomId::I,
        RoomId::O,
        RoomId::U,
        RoomId::S,
        RoomId::L,
        RoomId::Y,
    ];

    /// Whether this is one of the seven normal rooms.
    pub const fn is_normal(self) -> bool {
        !matches!(self, RoomId::Shovel)
    }

    /// The rigid cell offsets of this room, relative to its root. The root
    /// offset itself is included.
    pub const fn shape(self) -> &'static [HexCoord] {
        const P: [HexCoord; 4] = [
            HexCoord::new(0, 0, 0),
            HexCoord::new(1, 0, -1),
            HexCoord::new(0, 1, -1),
            HexCoord::new(0, -1, 1),
        ];
        const I: [HexCoord; 4] = [
            HexCoord::new(0, 0, 0),
            HexCoord::new(0, 1, -1),
            HexCoord::new(0, 2, -2),
            HexCoord::new(0, 3, -3),
        ];
        const O: [HexCoord; 4] = [
            HexCoord::new(0, 0, 0),
            HexCoord::new(0, -1, 1),
            HexCoord::new(1, -1, 0),
            HexCoord::new(1, -2, 1),
        ];
        const U: [HexCoord; 4] = [
            HexCoord::new(0, 0, 0),
            HexCoord::new(0, 1, -1),
            HexCoord::new(1, 1, -2),
            HexCoord::new(2, 0, -2),
        ];
        const S: [HexCoord; 4] = [
            HexCoord::new(0, 0, 0),
            HexCoord::new(1, 0, -1),
            HexCoord::new(1, 1, -2),
            HexCoord::new(2, 1, -3),
        ];
        const L: [HexCoord; 4] = [
            HexCoord::new(0, 0, 0),
            HexCoord::new(0, 1, -1),
            HexCoord::new(0, 2, -2),
            HexCoord::new(-1, 3, -2),
        ];
        const Y: [HexCoord; 4] = [
            HexCoord::new(0, 0, 0),
            HexCoord::new(0, 1, -1),
            HexCoord::new(1, -1, 0),
            HexCoord::new(-1, 0, 1),
        ];
        const SHOVEL: [HexCoord; 1] = [HexCoord::new(0, 0, 0)];
        match self {
            RoomId::P => &P,
            RoomId::I => &I,
            RoomId::O => &O,
            RoomId::U => &U,
            RoomId::S => &S,
            RoomId::L => &L,
            RoomId::Y => &Y,
            RoomId::Shovel => &SHOVEL,
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomId::P => "P",
            RoomId::I => "I",
            RoomId::O => "O",
            RoomId::U => "U",
            RoomId::S => "S",
            RoomId::L => "L",
            RoomId::Y => "Y",
            RoomId::Shovel => "Shovel",
        };
        write!(f, "{name}")
    }
}

/// Identifier for one of the seven relics (artworks), named by the color
/// of the spell it empowers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelicId {
    Pink,
    Indigo,
    Orange,
    Umber,
    Sapphire,
    Lime,
    Yellow,
}

impl RelicId {
    /// All seven relics.
    pub const ALL: [RelicId; 7] = [
        RelicId::Pink,
        RelicId::Indigo,
        RelicId::Orange,
        RelicId::Umber,
        RelicId::Sapphire,
        RelicId::Lime,
        RelicId::Yellow,
    ];
}

impl fmt::Display for RelicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelicId::Pink => "Pink",
            RelicId::Indigo => "Indigo",
            RelicId::Orange => "Orange",
            RelicId::Umber => "Umber",
            RelicId::Sapphire => "Sapphire",
            RelicId::Lime => "Lime",
            RelicId::Yellow => "Yellow",
        };
        write!(f, "{name}")
    }
}

/// Something standing on a cell. At most one per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Player(Faction),
    Relic(RelicId),
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Player(faction) => write!(f, "{faction} player"),
            Occupant::Relic(relic) => write!(f, "{relic} relic"),
        }
    }
}

/// One hex of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub coord: HexCoord,
    pub aura: Option<Faction>,
    pub occupant: Option<Occupant>,
}

impl Cell {
    fn new(coord: HexCoord) -> Self {
        Self {
            coord,
            aura: None,
            occupant: None,
        }
    }
}

/// A rigid cluster of cells. Normal rooms have four; the Shovel has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub root: HexCoord,
    pub cells: Vec<Cell>,
}

/// A movable token empowering one artwork-bearing spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relic {
    pub id: RelicId,
    pub faction: Option<Faction>,
    pub coord: Option<HexCoord>,
}

/// One of the two player pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPiece {
    pub faction: Faction,
    pub coord: Option<HexCoord>,
}

/// A typed micro-operation on the board. These replace the legacy
/// single-character command codes of early iterations; setup code and
/// tests use them to wire scenarios without going through the turn
/// controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    PlaceAura { at: HexCoord, faction: Faction },
    ClearAura { at: HexCoord },
    AdjustActions(i32),
    MoveOccupant { occupant: Occupant, to: HexCoord },
    RemoveOccupant(Occupant),
    ToggleTap(SpellKind),
    ClaimSpell { spell: SpellKind, faction: Faction },
}

/// The aggregate game state: whose turn it is, the remaining actions, and
/// every piece on (or off) the board. Deep copy is `Clone`; the turn
/// controller relies on it for snapshot/rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Faction whose turn it is.
    pub faction: Faction,
    /// Remaining actions for the active faction. Signed: a negative count
    /// is a detected rules violation caught at end-turn, never clamped.
    pub actions: i32,
    players: [PlayerPiece; 2],
    relics: Vec<Relic>,
    spells: Vec<Spell>,
    rooms: Vec<Room>,
}

/// Starting actions per turn.
pub const ACTIONS_PER_TURN: i32 = 3;

/// The classic layout: room roots as printed on the reference board.
pub const STANDARD_LAYOUT: [(RoomId, HexCoord); 7] = [
    (RoomId::P, HexCoord::new(1, 2, -3)),
    (RoomId::I, HexCoord::new(2, -2, 0)),
    (RoomId::O, HexCoord::new(3, -1, -2)),
    (RoomId::U, HexCoord::new(3, 0, -3)),
    (RoomId::S, HexCoord::new(6, -3, -3)),
    (RoomId::L, HexCoord::new(5, -3, -2)),
    (RoomId::Y, HexCoord::new(7, 0, -7)),
];

impl Board {
    /// Create a board with all entities wired together and no rooms placed.
    pub fn new(start_faction: Faction) -> Self {
        Self {
            faction: start_faction,
            actions: ACTIONS_PER_TURN,
            players: [
                PlayerPiece {
                    faction: Faction::Light,
                    coord: None,
                },
                PlayerPiece {
                    faction: Faction::Dark,
                    coord: None,
                },
            ],
            relics: RelicId::ALL
                .iter()
                .map(|&id| Relic {
                    id,
                    faction: None,
                    coord: None,
                })
                .collect(),
            spells: SpellKind::ALL.iter().map(|&kind| Spell::new(kind)).collect(),
            rooms: Vec::new(),
        }
    }

    /// Create a board with the classic room layout and both players placed
    /// in room P, ready for active play.
    pub fn standard(start_faction: Faction) -> Self {
        let mut board = Self::new(start_faction);
        for (id, root) in STANDARD_LAYOUT {
            board
                .place_room(id, root, 0)
                .expect("classic layout is collision-free");
        }
        let light_start = RoomId::P.shape()[0] + STANDARD_LAYOUT[0].1;
        let dark_start = RoomId::P.shape()[1] + STANDARD_LAYOUT[0].1;
        board
            .move_occupant(Occupant::Player(Faction::Light), None, Some(light_start))
            .expect("start cell is empty");
        board
            .move_occupant(Occupant::Player(Faction::Dark), None, Some(dark_start))
            .expect("start cell is empty");
        board
    }

    // ==================== Accessors ====================

    pub fn player(&self, faction: Faction) -> &PlayerPiece {
        self.players
            .iter()
            .find(|p| p.faction == faction)
            .expect("both factions always exist")
    }

    fn player_mut(&mut self, faction: Faction) -> &mut PlayerPiece {
        self.players
            .iter_mut()
            .find(|p| p.faction == faction)
            .expect("both factions always exist")
    }

    /// The active faction's player piece.
    pub fn current_player(&self) -> &PlayerPiece {
        self.player(self.faction)
    }

    pub fn relic(&self, id: RelicId) -> &Relic {
        self.relics.iter().find(|r| r.id == id).expect("all relics exist")
    }

    pub fn relic_mut(&mut self, id: RelicId) -> &mut Relic {
        self.relics.iter_mut().find(|r| r.id == id).expect("all relics exist")
    }

    pub fn relics(&self) -> &[Relic] {
        &self.relics
    }

    pub fn spell(&self, kind: SpellKind) -> &Spell {
        self.spells.iter().find(|s| s.kind == kind).expect("all spells exist")
    }

    pub fn spell_mut(&mut self, kind: SpellKind) -> &mut Spell {
        self.spells.iter_mut().find(|s| s.kind == kind).expect("all spells exist")
    }

    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == id)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// The room owning the cell at `coord`, if any.
    pub fn room_of(&self, coord: HexCoord) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|room| room.cells.iter().any(|c| c.coord == coord))
            .map(|room| room.id)
    }

    pub fn cell(&self, coord: HexCoord) -> Option<&Cell> {
        self.rooms
            .iter()
            .flat_map(|room| room.cells.iter())
            .find(|c| c.coord == coord)
    }

    pub fn cell_mut(&mut self, coord: HexCoord) -> Option<&mut Cell> {
        self.rooms
            .iter_mut()
            .flat_map(|room| room.cells.iter_mut())
            .find(|c| c.coord == coord)
    }

    /// All cells on the board, room by room.
    pub fn all_cells(&self) -> impl Iterator<Item = &Cell> {
        self.rooms.iter().flat_map(|room| room.cells.iter())
    }

    /// All coordinates currently on the board.
    pub fn all_coords(&self) -> Vec<HexCoord> {
        self.all_cells().map(|c| c.coord).collect()
    }

    /// Where an occupant currently stands, if placed.
    pub fn occupant_coord(&self, occupant: Occupant) -> Option<HexCoord> {
        match occupant {
            Occupant::Player(faction) => self.player(faction).coord,
            Occupant::Relic(id) => self.relic(id).coord,
        }
    }

    /// Every placed player and relic.
    pub fn placed_objects(&self) -> Vec<Occupant> {
        let mut objects = Vec::new();
        for relic in &self.relics {
            if relic.coord.is_some() {
                objects.push(Occupant::Relic(relic.id));
            }
        }
        for player in &self.players {
            if player.coord.is_some() {
                objects.push(Occupant::Player(player.faction));
            }
        }
        objects
    }

    /// Every placed object except the active faction's player piece.
    pub fn placed_non_player_objects(&self) -> Vec<Occupant> {
        self.placed_objects()
            .into_iter()
            .filter(|&o| o != Occupant::Player(self.faction))
            .collect()
    }

    // ==================== Graph queries ====================

    /// Coordinates of the existing neighbors of `coord`, in direction order.
    pub fn adjacent_cells(&self, coord: HexCoord) -> Vec<HexCoord> {
        Direction::ALL
            .iter()
            .filter_map(|d| {
                let n = coord.neighbor(*d);
                self.cell(n).map(|c| c.coord)
            })
            .collect()
    }

    /// The existing neighbor of `coord` in one direction, distinguishing
    /// "off board" (None) from "occupied".
    pub fn neighbor_in(&self, coord: HexCoord, direction: Direction) -> Option<HexCoord> {
        let n = coord.neighbor(direction);
        self.cell(n).map(|c| c.coord)
    }

    /// The maximal same-aura connected cell set reachable from `start`,
    /// in BFS order. Always contains `start`. A cell with no aura links
    /// only to itself.
    pub fn linked_region(&self, start: HexCoord) -> Vec<HexCoord> {
        let Some(start_cell) = self.cell(start) else {
            return Vec::new();
        };
        let Some(aura) = start_cell.aura else {
            return vec![start];
        };

        let mut region = vec![start];
        let mut visited: HashSet<HexCoord> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.adjacent_cells(current) {
                if visited.contains(&neighbor) {
                    continue;
                }
                if self.cell(neighbor).and_then(|c| c.aura) == Some(aura) {
                    visited.insert(neighbor);
                    region.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        region
    }

    /// The frontier of `linked_region(start)`: cells adjacent to the
    /// region whose aura differs (including no aura at all).
    pub fn region_boundary(&self, start: HexCoord) -> Vec<HexCoord> {
        let region = self.linked_region(start);
        let in_region: HashSet<HexCoord> = region.iter().copied().collect();
        let mut boundary = Vec::new();
        let mut seen: HashSet<HexCoord> = HashSet::new();
        for &coord in &region {
            for neighbor in self.adjacent_cells(coord) {
                if !in_region.contains(&neighbor) && seen.insert(neighbor) {
                    boundary.push(neighbor);
                }
            }
        }
        boundary
    }

    /// The distinct rooms owning any cell of `linked_region(start)`, in
    /// first-seen order. `include_utility` controls whether the Shovel
    /// counts; the win check excludes it.
    pub fn linked_rooms(&self, start: HexCoord, include_utility: bool) -> Vec<RoomId> {
        let mut rooms = Vec::new();
        for coord in self.linked_region(start) {
            if let Some(id) = self.room_of(coord) {
                if (include_utility || id.is_normal()) && !rooms.contains(&id) {
                    rooms.push(id);
                }
            }
        }
        rooms
    }

    /// Whether two cells lie on a common straight line through one of the
    /// six directions with every intermediate cell present on the board.
    /// A cell is never leap-eligible with itself.
    pub fn leap_eligible(&self, a: HexCoord, b: HexCoord) -> bool {
        let Some((step, len)) = (b - a).unit_step() else {
            return false;
        };
        (1..len).all(|i| self.cell(a + step.scaled(i)).is_some())
    }

    /// The distinct rooms sharing a board edge with `id`.
    pub fn adjacent_rooms(&self, id: RoomId) -> Vec<RoomId> {
        let Some(room) = self.room(id) else {
            return Vec::new();
        };
        let mut neighbors = Vec::new();
        for cell in &room.cells {
            for coord in self.adjacent_cells(cell.coord) {
                if let Some(other) = self.room_of(coord) {
                    if other != id && !neighbors.contains(&other) {
                        neighbors.push(other);
                    }
                }
            }
        }
        neighbors
    }

    /// Connectivity rule for room placement and relocation: every placed
    /// normal room needs at least two normal-room neighbors; the Shovel,
    /// if present, needs at least one neighbor of any kind.
    pub fn room_connectivity_ok(&self) -> Result<(), String> {
        for room in &self.rooms {
            let neighbors = self.adjacent_rooms(room.id);
            if room.id.is_normal() {
                let normal = neighbors.iter().filter(|r| r.is_normal()).count();
                if normal < 2 {
                    return Err(format!(
                        "room {} is adjacent to {normal} other rooms, needs at least 2",
                        room.id
                    ));
                }
            } else if neighbors.is_empty() {
                return Err("the Shovel must be adjacent to at least one room".to_string());
            }
        }
        Ok(())
    }

    /// Whether any cell of `id` is colocated with a cell of another room.
    pub fn hex_collision(&self, id: RoomId) -> bool {
        let Some(room) = self.room(id) else {
            return false;
        };
        room.cells.iter().any(|cell| {
            self.rooms
                .iter()
                .filter(|other| other.id != id)
                .flat_map(|other| other.cells.iter())
                .any(|other_cell| other_cell.coord == cell.coord)
        })
    }

    /// Empty locations (no cell at all) adjacent to any of the given
    /// coordinates. This is where the Shovel may go: next to the board,
    /// never on top of it, never floating free.
    pub fn open_neighbors(&self, coords: &[HexCoord]) -> Vec<HexCoord> {
        let mut open = Vec::new();
        let mut seen: HashSet<HexCoord> = HashSet::new();
        for &coord in coords {
            for neighbor in coord.neighbors() {
                if self.cell(neighbor).is_none() && seen.insert(neighbor) {
                    open.push(neighbor);
                }
            }
        }
        open
    }

    // ==================== Room placement & movement ====================

    /// Place a not-yet-placed room with its root at `root`, rotated by
    /// `rotation` sixths of a turn clockwise. Refuses overlaps.
    pub fn place_room(&mut self, id: RoomId, root: HexCoord, rotation: u8) -> Result<(), GameError> {
        if self.room(id).is_some() {
            return Err(GameError::IllegalMove(format!("room {id} is already placed")));
        }
        let cells: Vec<Cell> = id
            .shape()
            .iter()
            .map(|&offset| {
                let mut v = offset;
                for _ in 0..(rotation % 6) {
                    v = v.rotated_cw();
                }
                Cell::new(root + v)
            })
            .collect();
        if cells.iter().any(|c| self.cell(c.coord).is_some()) {
            return Err(GameError::IllegalMove(format!(
                "room {id} overlaps an existing room"
            )));
        }
        self.rooms.push(Room { id, root, cells });
        Ok(())
    }

    /// Rigidly translate a room, carrying occupants along.
    pub fn translate_room(&mut self, id: RoomId, delta: HexCoord) -> Result<(), GameError> {
        self.transform_room(id, |coord, _root| coord + delta)
    }

    /// Rotate a room 60 degrees about its root, carrying occupants along.
    pub fn rotate_room(&mut self, id: RoomId, clockwise: bool) -> Result<(), GameError> {
        self.transform_room(id, |coord, root| {
            let offset = coord - root;
            root + if clockwise {
                offset.rotated_cw()
            } else {
                offset.rotated_ccw()
            }
        })
    }

    fn transform_room(
        &mut self,
        id: RoomId,
        f: impl Fn(HexCoord, HexCoord) -> HexCoord,
    ) -> Result<(), GameError> {
        let room = self
            .room(id)
            .ok_or_else(|| GameError::Invariant(format!("room {id} is not on the board")))?;
        let root = room.root;
        // occupants ride with their cell
        let riders: Vec<(Occupant, HexCoord)> = room
            .cells
            .iter()
            .filter_map(|c| c.occupant.map(|o| (o, f(c.coord, root))))
            .collect();

        let room = self.room_mut(id).expect("checked above");
        room.root = f(root, root);
        for cell in &mut room.cells {
            cell.coord = f(cell.coord, root);
        }
        for (occupant, coord) in riders {
            self.set_piece_coord(occupant, Some(coord));
        }
        Ok(())
    }

    // ==================== Mutation primitives ====================

    fn set_piece_coord(&mut self, occupant: Occupant, coord: Option<HexCoord>) {
        match occupant {
            Occupant::Player(faction) => self.player_mut(faction).coord = coord,
            Occupant::Relic(id) => self.relic_mut(id).coord = coord,
        }
    }

    /// Move an occupant. Clears `from` first and updates the occupant's own
    /// coordinate last, so `from` may be the occupant's current cell.
    /// `to = None` lifts the occupant off the board.
    pub fn move_occupant(
        &mut self,
        occupant: Occupant,
        from: Option<HexCoord>,
        to: Option<HexCoord>,
    ) -> Result<(), GameError> {
        if let Some(from) = from {
            self.cell_mut(from)
                .ok_or_else(|| GameError::Invariant(format!("no cell at {from:?}")))?
                .occupant = None;
        }
        if let Some(to) = to {
            let cell = self
                .cell_mut(to)
                .ok_or_else(|| GameError::Invariant(format!("no cell at {to:?}")))?;
            if cell.occupant.is_some() {
                return Err(GameError::OccupiedTarget);
            }
            cell.occupant = Some(occupant);
        }
        self.set_piece_coord(occupant, to);
        Ok(())
    }

    /// Exchange two placed occupants' cells. No intermediate state is
    /// observable through the board once this returns.
    pub fn swap_occupants(&mut self, a: Occupant, b: Occupant) -> Result<(), GameError> {
        let coord_a = self
            .occupant_coord(a)
            .ok_or_else(|| GameError::Invariant(format!("{a} is not placed")))?;
        let coord_b = self
            .occupant_coord(b)
            .ok_or_else(|| GameError::Invariant(format!("{b} is not placed")))?;
        self.cell_mut(coord_a).expect("occupant cell exists").occupant = Some(b);
        self.cell_mut(coord_b).expect("occupant cell exists").occupant = Some(a);
        self.set_piece_coord(a, Some(coord_b));
        self.set_piece_coord(b, Some(coord_a));
        Ok(())
    }

    /// Clear every spell's tapped flag. Idempotent; called on turn
    /// transitions.
    pub fn untap_all(&mut self) {
        for spell in &mut self.spells {
            spell.tapped = false;
        }
    }

    /// Whether a spell's relic requirement is satisfied: no relic, or the
    /// relic sits on a cell carrying the active faction's aura.
    pub fn spell_empowered(&self, kind: SpellKind) -> bool {
        match kind.relic() {
            None => true,
            Some(id) => match self.relic(id).coord {
                None => false,
                Some(coord) => {
                    self.cell(coord).and_then(|c| c.aura) == Some(self.faction)
                }
            },
        }
    }

    /// Apply a typed micro-operation.
    pub fn apply_op(&mut self, op: Op) -> Result<(), GameError> {
        match op {
            Op::PlaceAura { at, faction } => {
                self.cell_mut(at)
                    .ok_or_else(|| GameError::Invariant(format!("no cell at {at:?}")))?
                    .aura = Some(faction);
            }
            Op::ClearAura { at } => {
                self.cell_mut(at)
                    .ok_or_else(|| GameError::Invariant(format!("no cell at {at:?}")))?
                    .aura = None;
            }
            Op::AdjustActions(delta) => {
                self.actions += delta;
            }
            Op::MoveOccupant { occupant, to } => {
                let from = self.occupant_coord(occupant);
                self.move_occupant(occupant, from, Some(to))?;
            }
            Op::RemoveOccupant(occupant) => {
                let from = self.occupant_coord(occupant);
                self.move_occupant(occupant, from, None)?;
            }
            Op::ToggleTap(kind) => {
                let spell = self.spell_mut(kind);
                spell.tapped = !spell.tapped;
            }
            Op::ClaimSpell { spell, faction } => {
                self.spell_mut(spell).faction = Some(faction);
                if let Some(relic) = spell.relic() {
                    self.relic_mut(relic).faction = Some(faction);
                }
            }
        }
        Ok(())
    }

    // ==================== Telemetry snapshot ====================

    /// Flatten the board into the per-cell / per-spell view consumed by a
    /// stateless external renderer.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            faction: self.faction,
            actions: self.actions,
            cells: self
                .all_cells()
                .map(|cell| {
                    let (q, r) = cell.coord.to_axial();
                    CellSnapshot {
                        q,
                        r,
                        room: self.room_of(cell.coord).expect("cell belongs to a room"),
                        aura: cell.aura,
                        occupant: cell.occupant,
                    }
                })
                .collect(),
            spells: self
                .spells
                .iter()
                .map(|spell| SpellSnapshot {
                    kind: spell.kind,
                    faction: spell.faction,
                    tapped: spell.tapped,
                    empowered: self.spell_empowered(spell.kind),
                })
                .collect(),
        }
    }

    /// The snapshot as a JSON value, for wire transport.
    pub fn snapshot_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).expect("snapshot serializes")
    }
}

/// Flat render/telemetry view of the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub faction: Faction,
    pub actions: i32,
    pub cells: Vec<CellSnapshot>,
    pub spells: Vec<SpellSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub q: i32,
    pub r: i32,
    pub room: RoomId,
    pub aura: Option<Faction>,
    pub occupant: Option<Occupant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellSnapshot {
    pub kind: SpellKind,
    pub faction: Option<Faction>,
    pub tapped: bool,
    pub empowered: bool,
}
