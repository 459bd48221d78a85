//! Decision providers for multi-step actions.
//!
//! Spell casts and room relocation need a sequence of choices from the
//! acting player. The engine never blocks on a UI; instead it pulls each
//! choice through an [`InputProvider`], and any `None` answer cancels the
//! whole cast cleanly. Tests script providers ahead of time.

use crate::hex::{Direction, HexCoord};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One step of an interactive room-relocation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Translate the room one hex in a direction.
    Step(Direction),
    /// Rotate the room 60 degrees clockwise about its root.
    RotateCw,
    /// Rotate the room 60 degrees counterclockwise about its root.
    RotateCcw,
    /// Accept the current position.
    Confirm,
}

/// Source of player decisions during a multi-step action.
///
/// Every method returns `None` to cancel. Cancellation is a normal
/// outcome, not an error: the engine rolls back the in-progress cast and
/// refunds everything.
pub trait InputProvider {
    /// Pick one of the labelled options. Returns an index into `options`.
    fn choose_one(&mut self, prompt: &str, options: &[String]) -> Option<usize>;

    /// Pick one of the candidate locations. Returns an index into
    /// `candidates`.
    fn choose_location(&mut self, prompt: &str, candidates: &[HexCoord]) -> Option<usize>;

    /// Ask for the next step of a room-relocation loop.
    fn directive(&mut self, prompt: &str) -> Option<Directive>;
}

/// A single pre-recorded answer for [`ScriptedInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Answer a `choose_one` or `choose_location` by index.
    Index(usize),
    /// Answer a `choose_location` by coordinate. Panics if the coordinate
    /// is not among the candidates, which in a scripted test is a bug.
    Coord(HexCoord),
    /// Answer a `directive`.
    Directive(Directive),
    /// Cancel whatever is being asked.
    Cancel,
}

/// Provider that replays a fixed script of answers. Running out of
/// answers cancels, so a scripted cast can never hang.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<Answer>,
}

impl ScriptedInput {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }

    /// Answers left unconsumed. Tests assert this is zero.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl InputProvider for ScriptedInput {
    fn choose_one(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        match self.answers.pop_front()? {
            Answer::Index(i) if i < options.len() => Some(i),
            Answer::Index(i) => {
                panic!("scripted index {i} out of range for {prompt:?} ({} options)", options.len())
            }
            Answer::Cancel => None,
            other => panic!("scripted answer {other:?} does not fit {prompt:?}"),
        }
    }

    fn choose_location(&mut self, prompt: &str, candidates: &[HexCoord]) -> Option<usize> {
        match self.answers.pop_front()? {
            Answer::Index(i) if i < candidates.len() => Some(i),
            Answer::Index(i) => {
                panic!(
                    "scripted index {i} out of range for {prompt:?} ({} candidates)",
                    candidates.len()
                )
            }
            Answer::Coord(coord) => Some(
                candidates
                    .iter()
                    .position(|&c| c == coord)
                    .unwrap_or_else(|| {
                        panic!("scripted coord {coord:?} not a candidate for {prompt:?}")
                    }),
            ),
            Answer::Cancel => None,
            other => panic!("scripted answer {other:?} does not fit {prompt:?}"),
        }
    }

    fn directive(&mut self, prompt: &str) -> Option<Directive> {
        match self.answers.pop_front()? {
            Answer::Directive(d) => Some(d),
            Answer::Cancel => None,
            other => panic!("scripted answer {other:?} does not fit {prompt:?}"),
        }
    }
}

/// Provider that always takes the first option and confirms directives.
/// Useful for smoke tests and very dumb bots.
#[derive(Debug, Default)]
pub struct AutoInput;

impl InputProvider for AutoInput {
    fn choose_one(&mut self, _prompt: &str, options: &[String]) -> Option<usize> {
        if options.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn choose_location(&mut self, _prompt: &str, candidates: &[HexCoord]) -> Option<usize> {
        if candidates.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn directive(&mut self, _prompt: &str) -> Option<Directive> {
        Some(Directive::Confirm)
    }
}
