//! Typed player intents and the events they produce.

use crate::board::{Faction, RelicId, RoomId};
use crate::game::GameResult;
use crate::hex::HexCoord;
use crate::spell::SpellKind;
use serde::{Deserialize, Serialize};

/// Something a player asks the engine to do. Validated against the current
/// phase and turn by [`GameState::apply`](crate::game::GameState::apply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Place a not-yet-placed normal room during setup.
    PlaceRoom {
        room: RoomId,
        root: HexCoord,
        /// Sixths of a clockwise turn applied to the room's shape.
        rotation: u8,
    },
    /// Decide who takes the first turn. Either seat may submit this.
    ChooseFirstFaction(Faction),
    /// Place your own player piece on an empty cell during setup.
    PlacePlayer(HexCoord),
    /// Step to an adjacent empty cell. Costs one action.
    Move(HexCoord),
    /// Put your aura under your own piece. Costs one action, or two to
    /// overwrite an enemy aura.
    Bless,
    /// Put an unplaced relic you own on an adjacent empty cell. Costs one
    /// action.
    DropRelic { relic: RelicId, at: HexCoord },
    /// Lift a relic you own off an adjacent cell. Costs one action.
    PickUpRelic(RelicId),
    /// Cast a spell you own. Free, but each spell works once per turn.
    CastSpell(SpellKind),
    /// Resolve spell claiming, then pass the turn.
    EndTurn,
    /// Throw away everything since the start of the turn.
    ResetTurn,
}

/// A committed change, reported in order. One action may produce several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoomPlaced { room: RoomId, root: HexCoord },
    FirstFactionChosen(Faction),
    PlayerPlaced { faction: Faction, at: HexCoord },
    Moved { faction: Faction, to: HexCoord },
    Blessed { at: HexCoord, faction: Faction },
    RelicDropped { relic: RelicId, at: HexCoord },
    RelicPickedUp { relic: RelicId },
    SpellCast { spell: SpellKind },
    /// The caster cancelled partway; nothing changed.
    CastAborted { spell: SpellKind },
    /// The active faction kept `chosen`; its partner went to the opponent.
    SpellsClaimed { room: RoomId, chosen: SpellKind },
    TurnEnded { next: Faction },
    TurnReset,
    GameWon { result: GameResult },
}
