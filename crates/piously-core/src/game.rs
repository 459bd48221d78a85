//! Turn controller: phases, the action economy, claiming, and the win
//! check.
//!
//! `GameState` keeps two boards. `committed` is the snapshot taken at the
//! last turn boundary; `live` is where the current turn plays out. Reset
//! is a whole-board restore from the snapshot, end-turn promotes the live
//! board into the next snapshot. Everything a player can do goes through
//! [`GameState::apply`].

use crate::actions::{GameAction, GameEvent};
use crate::board::{Board, Faction, Occupant, RelicId, RoomId, ACTIONS_PER_TURN};
use crate::hex::HexCoord;
use crate::input::InputProvider;
use crate::spell::{self, SpellKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an action was refused. Refusals never leave partial mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("that action does not fit the current phase")]
    WrongPhase,
    #[error("you have no more actions")]
    NoActions,
    #[error("the target hex is occupied")]
    OccupiedTarget,
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("that spell is not owned by you")]
    NotOwner,
    #[error("that spell was already cast this turn")]
    AlreadyCast,
    #[error("the spell's relic is not on your aura")]
    RelicNotEmpowered,
    #[error("you cannot end the turn with negative actions, reset the turn instead")]
    NegativeActions,
    /// A programming-logic fault, not a player mistake. Seeing this means
    /// the engine offered an illegal choice set.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

/// Final outcome of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(Faction),
    /// Both factions completed their network at once. Needs a layout in
    /// which two disjoint regions can each reach every room; the classic
    /// layout is not one.
    Tie,
}

/// Where in the life of a game we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Factions alternate placing the seven normal rooms.
    SetupRooms,
    /// Either seat decides who goes first.
    SetupFirstPlayer,
    /// First faction, then the opponent, place their piece.
    SetupPlayers,
    Active,
    Finished { result: GameResult },
}

/// The full game: phase, the committed turn-boundary snapshot, and the
/// live board the current turn mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    phase: GamePhase,
    committed: Board,
    live: Board,
}

impl GameState {
    /// Start a fresh game in room setup, with a random faction placing
    /// first.
    pub fn new() -> Self {
        let first = if rand::thread_rng().gen_bool(0.5) {
            Faction::Light
        } else {
            Faction::Dark
        };
        let board = Board::new(first);
        Self {
            phase: GamePhase::SetupRooms,
            committed: board.clone(),
            live: board,
        }
    }

    /// Skip setup: the classic layout with both players in room P and
    /// `first` to move. Handy for scenarios and tests.
    pub fn with_standard_layout(first: Faction) -> Self {
        let board = Board::standard(first);
        Self {
            phase: GamePhase::Active,
            committed: board.clone(),
            live: board,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The live board.
    pub fn board(&self) -> &Board {
        &self.live
    }

    /// Mutable access to the live board, for wiring scenarios outside the
    /// action interface. Follow with [`sync`](Self::sync) so reset-turn
    /// does not roll the wiring back.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.live
    }

    /// Promote the live board to the committed snapshot.
    pub fn sync(&mut self) {
        self.committed = self.live.clone();
    }

    /// Perform one action for `faction`. Multi-step actions pull their
    /// choices from `input`; a cancelled choice aborts the action with no
    /// effect.
    pub fn apply(
        &mut self,
        faction: Faction,
        action: GameAction,
        input: &mut dyn InputProvider,
    ) -> Result<Vec<GameEvent>, GameError> {
        // first-faction choice is the one decision either seat may make
        let open_seat = matches!(action, GameAction::ChooseFirstFaction(_));
        if !open_seat && faction != self.live.faction {
            return Err(GameError::NotYourTurn);
        }

        let mut events = match (self.phase, action) {
            (GamePhase::SetupRooms, GameAction::PlaceRoom { room, root, rotation }) => {
                self.place_room(room, root, rotation)?
            }
            (GamePhase::SetupFirstPlayer, GameAction::ChooseFirstFaction(first)) => {
                self.live.faction = first;
                self.phase = GamePhase::SetupPlayers;
                vec![GameEvent::FirstFactionChosen(first)]
            }
            (GamePhase::SetupPlayers, GameAction::PlacePlayer(at)) => self.place_player(at)?,
            (GamePhase::Active, GameAction::Move(to)) => self.step(to)?,
            (GamePhase::Active, GameAction::Bless) => self.bless()?,
            (GamePhase::Active, GameAction::DropRelic { relic, at }) => self.drop_relic(relic, at)?,
            (GamePhase::Active, GameAction::PickUpRelic(relic)) => self.pick_up_relic(relic)?,
            (GamePhase::Active, GameAction::CastSpell(kind)) => {
                if spell::cast(&mut self.live, kind, input)? {
                    vec![GameEvent::SpellCast { spell: kind }]
                } else {
                    vec![GameEvent::CastAborted { spell: kind }]
                }
            }
            (GamePhase::Active, GameAction::EndTurn) => self.end_turn(input)?,
            (GamePhase::Active, GameAction::ResetTurn) => {
                self.live = self.committed.clone();
                vec![GameEvent::TurnReset]
            }
            _ => return Err(GameError::WrongPhase),
        };

        if self.phase == GamePhase::Active {
            if let Some(result) = winner(&self.live) {
                tracing::info!(?result, "game over");
                self.phase = GamePhase::Finished { result };
                events.push(GameEvent::GameWon { result });
            }
        }
        Ok(events)
    }

    // ==================== Setup ====================

    fn place_room(
        &mut self,
        room: RoomId,
        root: HexCoord,
        rotation: u8,
    ) -> Result<Vec<GameEvent>, GameError> {
        if !room.is_normal() {
            return Err(GameError::IllegalMove(
                "the Shovel enters play through its spell".to_string(),
            ));
        }
        let mut next = self.live.clone();
        next.place_room(room, root, rotation)?;
        if next.rooms().len() == RoomId::NORMAL.len() {
            next.room_connectivity_ok().map_err(GameError::IllegalMove)?;
            self.phase = GamePhase::SetupFirstPlayer;
        }
        next.faction = next.faction.other();
        self.live = next;
        Ok(vec![GameEvent::RoomPlaced { room, root }])
    }

    fn place_player(&mut self, at: HexCoord) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.live.faction;
        self.live
            .cell(at)
            .ok_or_else(|| GameError::IllegalMove("there is no hex there".to_string()))?;
        self.live.move_occupant(Occupant::Player(faction), None, Some(at))?;
        let both_placed = self.live.player(faction.other()).coord.is_some();
        self.live.faction = faction.other();
        if both_placed {
            // an even number of flips, so the chosen first faction moves
            self.live.actions = ACTIONS_PER_TURN;
            self.phase = GamePhase::Active;
            self.sync();
        }
        Ok(vec![GameEvent::PlayerPlaced { faction, at }])
    }

    // ==================== Turn economy ====================

    fn spend(&mut self, cost: i32) -> Result<(), GameError> {
        if self.live.actions < cost {
            return Err(GameError::NoActions);
        }
        self.live.actions -= cost;
        Ok(())
    }

    fn step(&mut self, to: HexCoord) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.live.faction;
        let here = self.player_coord(faction)?;
        if !self.live.adjacent_cells(here).contains(&to) {
            return Err(GameError::IllegalMove(
                "you can only move to an adjacent hex".to_string(),
            ));
        }
        if self.live.cell(to).is_some_and(|c| c.occupant.is_some()) {
            return Err(GameError::OccupiedTarget);
        }
        self.spend(1)?;
        self.live
            .move_occupant(Occupant::Player(faction), Some(here), Some(to))?;
        Ok(vec![GameEvent::Moved { faction, to }])
    }

    fn bless(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.live.faction;
        let here = self.player_coord(faction)?;
        let aura = self
            .live
            .cell(here)
            .ok_or_else(|| GameError::Invariant("player cell vanished".to_string()))?
            .aura;
        match aura {
            Some(a) if a == faction => {
                return Err(GameError::IllegalMove(
                    "that hex already has your aura".to_string(),
                ))
            }
            None => self.spend(1)?,
            Some(_) => self.spend(2)?,
        }
        self.live
            .cell_mut(here)
            .ok_or_else(|| GameError::Invariant("player cell vanished".to_string()))?
            .aura = Some(faction);
        Ok(vec![GameEvent::Blessed { at: here, faction }])
    }

    fn drop_relic(&mut self, relic: RelicId, at: HexCoord) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.live.faction;
        let here = self.player_coord(faction)?;
        let piece = self.live.relic(relic);
        if piece.faction != Some(faction) {
            return Err(GameError::IllegalMove(format!(
                "the {relic} relic is not yours to drop"
            )));
        }
        if piece.coord.is_some() {
            return Err(GameError::IllegalMove(format!(
                "the {relic} relic is already on the board"
            )));
        }
        if !self.live.adjacent_cells(here).contains(&at) {
            return Err(GameError::IllegalMove(
                "you can only drop on an adjacent hex".to_string(),
            ));
        }
        if self.live.cell(at).is_some_and(|c| c.occupant.is_some()) {
            return Err(GameError::OccupiedTarget);
        }
        self.spend(1)?;
        self.live.move_occupant(Occupant::Relic(relic), None, Some(at))?;
        Ok(vec![GameEvent::RelicDropped { relic, at }])
    }

    fn pick_up_relic(&mut self, relic: RelicId) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.live.faction;
        let here = self.player_coord(faction)?;
        let piece = self.live.relic(relic);
        if piece.faction != Some(faction) {
            return Err(GameError::IllegalMove(format!(
                "the {relic} relic is not yours to pick up"
            )));
        }
        let at = piece.coord.ok_or_else(|| {
            GameError::IllegalMove(format!("the {relic} relic is not on the board"))
        })?;
        if !self.live.adjacent_cells(here).contains(&at) {
            return Err(GameError::IllegalMove(
                "you can only pick up from an adjacent hex".to_string(),
            ));
        }
        self.spend(1)?;
        self.live.move_occupant(Occupant::Relic(relic), Some(at), None)?;
        Ok(vec![GameEvent::RelicPickedUp { relic }])
    }

    // ==================== End of turn ====================

    /// Resolve claiming, then pass the turn. Runs on a scratch board so a
    /// cancelled claim choice leaves the turn open and untouched.
    fn end_turn(&mut self, input: &mut dyn InputProvider) -> Result<Vec<GameEvent>, GameError> {
        let faction = self.live.faction;
        let mut next = self.live.clone();
        let mut events = Vec::new();

        let here = self.player_coord(faction)?;
        let room = next.room_of(here);
        if let Some((artwork, plain)) = room.and_then(SpellKind::pair_for) {
            if next.spell(artwork).faction.is_none() {
                let options = vec![
                    artwork.name().to_string(),
                    plain.name().to_string(),
                    "Neither".to_string(),
                ];
                let Some(choice) =
                    input.choose_one("Claim a spell? Your opponent gets the other", &options)
                else {
                    return Ok(Vec::new());
                };
                if choice < 2 {
                    let (mine, theirs) = if choice == 0 {
                        (artwork, plain)
                    } else {
                        (plain, artwork)
                    };
                    next.spell_mut(mine).faction = Some(faction);
                    next.spell_mut(theirs).faction = Some(faction.other());
                    // the relic goes wherever its spell went
                    let relic = artwork.relic().ok_or_else(|| {
                        GameError::Invariant("artwork spell has no relic".to_string())
                    })?;
                    let owner = next.spell(artwork).faction;
                    next.relic_mut(relic).faction = owner;
                    events.push(GameEvent::SpellsClaimed {
                        room: room.ok_or_else(|| {
                            GameError::Invariant("claim outside a room".to_string())
                        })?,
                        chosen: mine,
                    });
                }
            }
        }

        if next.actions < 0 {
            return Err(GameError::NegativeActions);
        }
        next.actions = ACTIONS_PER_TURN;
        next.untap_all();
        next.faction = faction.other();

        self.live = next;
        self.sync();
        tracing::debug!(next = %self.live.faction, "turn ended");
        events.push(GameEvent::TurnEnded {
            next: self.live.faction,
        });
        Ok(events)
    }

    fn player_coord(&self, faction: Faction) -> Result<HexCoord, GameError> {
        self.live
            .player(faction)
            .coord
            .ok_or_else(|| GameError::Invariant(format!("{faction} player is not placed")))
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// A faction wins when some cell carrying its aura links all seven normal
/// rooms through a single same-aura region. The Shovel never counts.
pub fn winner(board: &Board) -> Option<GameResult> {
    let mut light = false;
    let mut dark = false;
    for cell in board.all_cells() {
        let Some(aura) = cell.aura else { continue };
        if board.linked_rooms(cell.coord, false).len() == RoomId::NORMAL.len() {
            match aura {
                Faction::Light => light = true,
                Faction::Dark => dark = true,
            }
        }
    }
    match (light, dark) {
        (true, true) => Some(GameResult::Tie),
        (true, false) => Some(GameResult::Winner(Faction::Light)),
        (false, true) => Some(GameResult::Winner(Faction::Dark)),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Op, STANDARD_LAYOUT};
    use crate::input::{Answer, AutoInput, ScriptedInput};
    use pretty_assertions::assert_eq;

    fn active_game() -> GameState {
        GameState::with_standard_layout(Faction::Dark)
    }

    fn empty_neighbor(game: &GameState, of: HexCoord) -> HexCoord {
        game.board()
            .adjacent_cells(of)
            .into_iter()
            .find(|&c| game.board().cell(c).unwrap().occupant.is_none())
            .unwrap()
    }

    #[test]
    fn test_full_setup_flow() {
        let mut game = GameState::new();
        assert_eq!(game.phase(), GamePhase::SetupRooms);

        let mut placer = game.board().faction;
        for (room, root) in STANDARD_LAYOUT {
            let events = game
                .apply(
                    placer,
                    GameAction::PlaceRoom { room, root, rotation: 0 },
                    &mut AutoInput,
                )
                .unwrap();
            assert_eq!(events, vec![GameEvent::RoomPlaced { room, root }]);
            placer = placer.other();
        }
        assert_eq!(game.phase(), GamePhase::SetupFirstPlayer);

        game.apply(
            Faction::Light,
            GameAction::ChooseFirstFaction(Faction::Dark),
            &mut AutoInput,
        )
        .unwrap();
        assert_eq!(game.phase(), GamePhase::SetupPlayers);
        assert_eq!(game.board().faction, Faction::Dark);

        let first_spot = game.board().all_coords()[0];
        game.apply(Faction::Dark, GameAction::PlacePlayer(first_spot), &mut AutoInput)
            .unwrap();
        let second_spot = game
            .board()
            .all_coords()
            .into_iter()
            .find(|&c| game.board().cell(c).unwrap().occupant.is_none())
            .unwrap();
        game.apply(Faction::Light, GameAction::PlacePlayer(second_spot), &mut AutoInput)
            .unwrap();

        assert_eq!(game.phase(), GamePhase::Active);
        assert_eq!(game.board().faction, Faction::Dark);
        assert_eq!(game.board().actions, ACTIONS_PER_TURN);
    }

    #[test]
    fn test_setup_refuses_overlapping_room() {
        let mut game = GameState::new();
        let placer = game.board().faction;
        game.apply(
            placer,
            GameAction::PlaceRoom {
                room: RoomId::P,
                root: HexCoord::new(0, 0, 0),
                rotation: 0,
            },
            &mut AutoInput,
        )
        .unwrap();
        let err = game.apply(
            placer.other(),
            GameAction::PlaceRoom {
                room: RoomId::I,
                root: HexCoord::new(0, 0, 0),
                rotation: 0,
            },
            &mut AutoInput,
        );
        assert!(matches!(err, Err(GameError::IllegalMove(_))));
        // the refused placement changed nothing, same faction tries again
        assert!(game.board().room(RoomId::I).is_none());
        assert_eq!(game.board().faction, placer.other());
    }

    #[test]
    fn test_setup_refuses_disconnected_final_room() {
        let mut game = GameState::new();
        let mut placer = game.board().faction;
        for (room, root) in &STANDARD_LAYOUT[..6] {
            game.apply(
                placer,
                GameAction::PlaceRoom { room: *room, root: *root, rotation: 0 },
                &mut AutoInput,
            )
            .unwrap();
            placer = placer.other();
        }
        let err = game.apply(
            placer,
            GameAction::PlaceRoom {
                room: RoomId::Y,
                root: HexCoord::new(50, -50, 0),
                rotation: 0,
            },
            &mut AutoInput,
        );
        assert!(matches!(err, Err(GameError::IllegalMove(_))));
        assert_eq!(game.phase(), GamePhase::SetupRooms);

        game.apply(
            placer,
            GameAction::PlaceRoom {
                room: RoomId::Y,
                root: STANDARD_LAYOUT[6].1,
                rotation: 0,
            },
            &mut AutoInput,
        )
        .unwrap();
        assert_eq!(game.phase(), GamePhase::SetupFirstPlayer);
    }

    #[test]
    fn test_move_spends_one_action_and_vacates_origin() {
        let mut game = active_game();
        let origin = game.board().player(Faction::Dark).coord.unwrap();
        let to = empty_neighbor(&game, origin);

        let events = game
            .apply(Faction::Dark, GameAction::Move(to), &mut AutoInput)
            .unwrap();
        assert_eq!(events, vec![GameEvent::Moved { faction: Faction::Dark, to }]);
        assert_eq!(game.board().actions, 2);
        assert_eq!(game.board().player(Faction::Dark).coord, Some(to));
        assert_eq!(game.board().cell(origin).unwrap().occupant, None);
    }

    #[test]
    fn test_move_rejects_wrong_turn_and_occupied_cell() {
        let mut game = active_game();
        let dark = game.board().player(Faction::Dark).coord.unwrap();
        let light = game.board().player(Faction::Light).coord.unwrap();

        let to = empty_neighbor(&game, light);
        let err = game.apply(Faction::Light, GameAction::Move(to), &mut AutoInput);
        assert_eq!(err, Err(GameError::NotYourTurn));

        let err = game.apply(Faction::Dark, GameAction::Move(light), &mut AutoInput);
        assert_eq!(err, Err(GameError::OccupiedTarget));

        let far = game
            .board()
            .all_coords()
            .into_iter()
            .find(|&c| c.distance_to(dark) > 1 && game.board().cell(c).unwrap().occupant.is_none())
            .unwrap();
        let err = game.apply(Faction::Dark, GameAction::Move(far), &mut AutoInput);
        assert!(matches!(err, Err(GameError::IllegalMove(_))));
        assert_eq!(game.board().actions, 3);
    }

    #[test]
    fn test_bless_cost_depends_on_existing_aura() {
        let mut game = active_game();
        let here = game.board().player(Faction::Dark).coord.unwrap();

        // bare cell costs one
        game.apply(Faction::Dark, GameAction::Bless, &mut AutoInput).unwrap();
        assert_eq!(game.board().actions, 2);
        assert_eq!(game.board().cell(here).unwrap().aura, Some(Faction::Dark));

        // own aura cannot be blessed again
        let err = game.apply(Faction::Dark, GameAction::Bless, &mut AutoInput);
        assert!(matches!(err, Err(GameError::IllegalMove(_))));
        assert_eq!(game.board().actions, 2);

        // enemy aura costs two
        game.board_mut()
            .apply_op(Op::PlaceAura { at: here, faction: Faction::Light })
            .unwrap();
        game.apply(Faction::Dark, GameAction::Bless, &mut AutoInput).unwrap();
        assert_eq!(game.board().actions, 0);

        // and with no actions left even a bare cell is out of reach
        game.board_mut().apply_op(Op::ClearAura { at: here }).unwrap();
        let err = game.apply(Faction::Dark, GameAction::Bless, &mut AutoInput);
        assert_eq!(err, Err(GameError::NoActions));
    }

    #[test]
    fn test_drop_and_pick_up_relic() {
        let mut game = active_game();
        game.board_mut().relic_mut(RelicId::Pink).faction = Some(Faction::Dark);
        let here = game.board().player(Faction::Dark).coord.unwrap();
        let at = empty_neighbor(&game, here);

        game.apply(
            Faction::Dark,
            GameAction::DropRelic { relic: RelicId::Pink, at },
            &mut AutoInput,
        )
        .unwrap();
        assert_eq!(game.board().relic(RelicId::Pink).coord, Some(at));
        assert_eq!(game.board().actions, 2);

        game.apply(Faction::Dark, GameAction::PickUpRelic(RelicId::Pink), &mut AutoInput)
            .unwrap();
        assert_eq!(game.board().relic(RelicId::Pink).coord, None);
        assert_eq!(game.board().cell(at).unwrap().occupant, None);
        assert_eq!(game.board().actions, 1);
    }

    #[test]
    fn test_drop_requires_ownership() {
        let mut game = active_game();
        let here = game.board().player(Faction::Dark).coord.unwrap();
        let at = empty_neighbor(&game, here);
        let err = game.apply(
            Faction::Dark,
            GameAction::DropRelic { relic: RelicId::Pink, at },
            &mut AutoInput,
        );
        assert!(matches!(err, Err(GameError::IllegalMove(_))));
    }

    #[test]
    fn test_reset_turn_restores_committed_snapshot() {
        let mut game = active_game();
        let before = game.board().clone();

        let origin = game.board().player(Faction::Dark).coord.unwrap();
        let to = empty_neighbor(&game, origin);
        game.apply(Faction::Dark, GameAction::Move(to), &mut AutoInput).unwrap();
        game.apply(Faction::Dark, GameAction::Bless, &mut AutoInput).unwrap();
        assert_ne!(*game.board(), before);

        game.apply(Faction::Dark, GameAction::ResetTurn, &mut AutoInput).unwrap();
        assert_eq!(*game.board(), before);
    }

    #[test]
    fn test_end_turn_flips_faction_and_restores_actions() {
        let mut game = active_game();
        game.board_mut().actions = 1;

        // Dark stands in room P, whose spells are unclaimed: keep Purify
        let mut input = ScriptedInput::new([Answer::Index(1)]);
        let events = game.apply(Faction::Dark, GameAction::EndTurn, &mut input).unwrap();
        assert_eq!(
            events,
            vec![
                GameEvent::SpellsClaimed { room: RoomId::P, chosen: SpellKind::Purify },
                GameEvent::TurnEnded { next: Faction::Light },
            ]
        );
        assert_eq!(game.board().faction, Faction::Light);
        assert_eq!(game.board().actions, ACTIONS_PER_TURN);
        assert_eq!(game.board().spell(SpellKind::Purify).faction, Some(Faction::Dark));
        assert_eq!(game.board().spell(SpellKind::Priestess).faction, Some(Faction::Light));
        // the Pink relic follows the Priestess
        assert_eq!(game.board().relic(RelicId::Pink).faction, Some(Faction::Light));

        // a reset now keeps the new turn boundary
        game.apply(Faction::Light, GameAction::ResetTurn, &mut AutoInput).unwrap();
        assert_eq!(game.board().faction, Faction::Light);
    }

    #[test]
    fn test_end_turn_claim_cancel_keeps_turn_open() {
        let mut game = active_game();
        let mut input = ScriptedInput::new([Answer::Cancel]);
        let events = game.apply(Faction::Dark, GameAction::EndTurn, &mut input).unwrap();
        assert_eq!(events, Vec::new());
        assert_eq!(game.board().faction, Faction::Dark);
    }

    #[test]
    fn test_end_turn_declining_claims_nothing() {
        let mut game = active_game();
        let mut input = ScriptedInput::new([Answer::Index(2)]);
        let events = game.apply(Faction::Dark, GameAction::EndTurn, &mut input).unwrap();
        assert_eq!(events, vec![GameEvent::TurnEnded { next: Faction::Light }]);
        assert_eq!(game.board().spell(SpellKind::Priestess).faction, None);
        assert_eq!(game.board().spell(SpellKind::Purify).faction, None);
    }

    #[test]
    fn test_end_turn_with_negative_actions_fails() {
        let mut game = active_game();
        game.board_mut().actions = -1;
        let before = game.board().clone();
        let err = game.apply(Faction::Dark, GameAction::EndTurn, &mut AutoInput);
        assert_eq!(err, Err(GameError::NegativeActions));
        assert_eq!(*game.board(), before);
    }

    #[test]
    fn test_end_turn_untaps_spells() {
        let mut game = active_game();
        game.board_mut()
            .apply_op(Op::ClaimSpell { spell: SpellKind::Overwork, faction: Faction::Dark })
            .unwrap();
        game.apply(Faction::Dark, GameAction::CastSpell(SpellKind::Overwork), &mut AutoInput)
            .unwrap();
        assert!(game.board().spell(SpellKind::Overwork).tapped);

        let mut input = ScriptedInput::new([Answer::Index(2)]);
        game.apply(Faction::Dark, GameAction::EndTurn, &mut input).unwrap();
        assert!(!game.board().spell(SpellKind::Overwork).tapped);
    }

    #[test]
    fn test_light_wins_with_all_seven_rooms_linked() {
        let mut game = GameState::with_standard_layout(Faction::Light);
        let here = game.board().player(Faction::Light).coord.unwrap();
        let coords = game.board().all_coords();
        for coord in coords {
            if coord != here {
                game.board_mut()
                    .apply_op(Op::PlaceAura { at: coord, faction: Faction::Light })
                    .unwrap();
            }
        }
        game.sync();
        assert_eq!(game.phase(), GamePhase::Active);

        // the final bless closes the network across all seven rooms
        let events = game
            .apply(Faction::Light, GameAction::Bless, &mut AutoInput)
            .unwrap();
        assert!(events.contains(&GameEvent::GameWon {
            result: GameResult::Winner(Faction::Light)
        }));
        assert_eq!(
            game.phase(),
            GamePhase::Finished { result: GameResult::Winner(Faction::Light) }
        );

        // the game is over, nothing further is accepted
        let err = game.apply(Faction::Light, GameAction::Bless, &mut AutoInput);
        assert_eq!(err, Err(GameError::WrongPhase));
    }

    #[test]
    fn test_winner_ignores_partial_networks() {
        let game = active_game();
        assert_eq!(winner(game.board()), None);

        let mut board = game.board().clone();
        // a full room of auras is far from a full network
        let cells: Vec<HexCoord> = board
            .room(RoomId::P)
            .unwrap()
            .cells
            .iter()
            .map(|c| c.coord)
            .collect();
        for at in cells {
            board.apply_op(Op::PlaceAura { at, faction: Faction::Dark }).unwrap();
        }
        assert_eq!(winner(&board), None);
    }

    #[test]
    fn test_both_networks_complete_at_once_is_a_tie() {
        // The classic layout cannot tie: room Y hangs off the rest of the
        // board by a single edge, so two disjoint networks cannot both
        // reach it. This denser arrangement leaves space for one Light and
        // one Dark region to each thread through all seven rooms.
        let mut board = Board::new(Faction::Light);
        let layout = [
            (RoomId::P, HexCoord::new(2, -2, 0), 5),
            (RoomId::I, HexCoord::new(0, -3, 3), 0),
            (RoomId::O, HexCoord::new(5, -5, 0), 3),
            (RoomId::U, HexCoord::new(1, -2, 1), 2),
            (RoomId::S, HexCoord::new(-2, 3, -1), 2),
            (RoomId::L, HexCoord::new(1, 0, -1), 1),
            (RoomId::Y, HexCoord::new(4, -2, -2), 0),
        ];
        for (id, root, rotation) in layout {
            board.place_room(id, root, rotation).unwrap();
        }

        let light = [
            HexCoord::new(-1, 1, 0),
            HexCoord::new(0, 0, 0),
            HexCoord::new(1, -2, 1),
            HexCoord::new(1, -1, 0),
            HexCoord::new(1, 0, -1),
            HexCoord::new(2, -1, -1),
            HexCoord::new(3, -2, -1),
            HexCoord::new(4, -3, -1),
        ];
        let dark = [
            HexCoord::new(-1, 0, 1),
            HexCoord::new(0, -3, 3),
            HexCoord::new(0, -2, 2),
            HexCoord::new(0, -1, 1),
            HexCoord::new(1, -4, 3),
            HexCoord::new(2, -4, 2),
            HexCoord::new(2, -3, 1),
            HexCoord::new(3, -3, 0),
            HexCoord::new(3, 0, -3),
            HexCoord::new(4, -4, 0),
            HexCoord::new(4, -2, -2),
            HexCoord::new(4, -1, -3),
            HexCoord::new(5, -4, -1),
            HexCoord::new(5, -3, -2),
        ];
        for at in light {
            board.apply_op(Op::PlaceAura { at, faction: Faction::Light }).unwrap();
        }
        for at in dark {
            board.apply_op(Op::PlaceAura { at, faction: Faction::Dark }).unwrap();
        }

        assert_eq!(winner(&board), Some(GameResult::Tie));
    }

    #[test]
    fn test_game_state_serde_round_trip() {
        let game = active_game();
        let json = serde_json::to_string(&game).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, game);
    }
}
