//! Matching format: three prompt/answer pairs laid out as six tiles.
//!
//! The learner clicks two tiles to pair them. Every tile takes part in at most
//! one attempted pair; the board passes when at least two of the three pairs
//! were matched correctly.

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::{AnswerOutcome, QuestionId};

/// Pairs on a matching board.
pub const MATCHING_PAIR_COUNT: usize = 3;

/// Correct pairs needed for the board to count as answered correctly.
pub const MATCHING_PASS_THRESHOLD: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchingError {
    #[error("matching needs exactly {expected} pairs, got {got}")]
    WrongPairCount { expected: usize, got: usize },

    #[error("tile {0} does not exist")]
    NoSuchTile(usize),

    #[error("tile {0} is already paired")]
    TileLocked(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSide {
    Prompt,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub question_id: QuestionId,
    pub side: TileSide,
    pub text: String,
    locked: bool,
}

impl Tile {
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// A prompt/answer pair fed into the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingPair {
    pub question_id: QuestionId,
    pub prompt: String,
    pub answer: String,
}

/// Result of clicking a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSelection {
    /// First tile of a pair is now armed.
    Armed(usize),
    /// The armed tile was clicked again and released.
    Disarmed(usize),
    /// Two tiles were paired.
    Paired { first: usize, second: usize, correct: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingBoard {
    tiles: Vec<Tile>,
    armed: Option<usize>,
    correct_pairs: usize,
    attempted_pairs: usize,
}

impl MatchingBoard {
    /// Lays out prompts then answers, in input order.
    ///
    /// # Errors
    ///
    /// Returns `MatchingError::WrongPairCount` unless exactly
    /// `MATCHING_PAIR_COUNT` pairs are given.
    pub fn new(pairs: Vec<MatchingPair>) -> Result<Self, MatchingError> {
        if pairs.len() != MATCHING_PAIR_COUNT {
            return Err(MatchingError::WrongPairCount {
                expected: MATCHING_PAIR_COUNT,
                got: pairs.len(),
            });
        }

        let mut tiles = Vec::with_capacity(pairs.len() * 2);
        for pair in &pairs {
            tiles.push(Tile {
                question_id: pair.question_id,
                side: TileSide::Prompt,
                text: pair.prompt.clone(),
                locked: false,
            });
        }
        for pair in pairs {
            tiles.push(Tile {
                question_id: pair.question_id,
                side: TileSide::Answer,
                text: pair.answer,
                locked: false,
            });
        }

        Ok(Self {
            tiles,
            armed: None,
            correct_pairs: 0,
            attempted_pairs: 0,
        })
    }

    /// Like `new`, with the tiles shuffled.
    ///
    /// # Errors
    ///
    /// Same as `new`.
    pub fn shuffled<R: Rng + ?Sized>(
        pairs: Vec<MatchingPair>,
        rng: &mut R,
    ) -> Result<Self, MatchingError> {
        let mut board = Self::new(pairs)?;
        board.tiles.shuffle(rng);
        Ok(board)
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn armed(&self) -> Option<usize> {
        self.armed
    }

    /// Click a tile.
    ///
    /// # Errors
    ///
    /// Returns `MatchingError::NoSuchTile` for an out-of-range index and
    /// `MatchingError::TileLocked` for a tile that already took part in a pair.
    pub fn select(&mut self, index: usize) -> Result<TileSelection, MatchingError> {
        let tile = self.tiles.get(index).ok_or(MatchingError::NoSuchTile(index))?;
        if tile.locked {
            return Err(MatchingError::TileLocked(index));
        }

        let Some(first) = self.armed.take() else {
            self.armed = Some(index);
            return Ok(TileSelection::Armed(index));
        };
        if first == index {
            return Ok(TileSelection::Disarmed(index));
        }

        let a = &self.tiles[first];
        let b = &self.tiles[index];
        let correct = a.question_id == b.question_id && a.side != b.side;

        self.tiles[first].locked = true;
        self.tiles[index].locked = true;
        self.attempted_pairs += 1;
        if correct {
            self.correct_pairs += 1;
        }

        Ok(TileSelection::Paired {
            first,
            second: index,
            correct,
        })
    }

    #[must_use]
    pub fn correct_pairs(&self) -> usize {
        self.correct_pairs
    }

    #[must_use]
    pub fn attempted_pairs(&self) -> usize {
        self.attempted_pairs
    }

    /// Every tile has been used in a pair.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.tiles.iter().all(|t| t.locked)
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct_pairs >= MATCHING_PASS_THRESHOLD
    }

    #[must_use]
    pub fn outcome(&self) -> AnswerOutcome {
        matching_outcome(self.correct_pairs)
    }
}

/// Outcome of a matching board given how many pairs were correct.
#[must_use]
pub fn matching_outcome(correct_pairs: usize) -> AnswerOutcome {
    AnswerOutcome::from_correct(correct_pairs >= MATCHING_PASS_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pairs() -> Vec<MatchingPair> {
        [("DNA", "Genetic code"), ("ATP", "Energy carrier"), ("RNA", "Messenger")]
            .into_iter()
            .enumerate()
            .map(|(i, (p, a))| MatchingPair {
                question_id: QuestionId::new(i as u64 + 1),
                prompt: p.into(),
                answer: a.into(),
            })
            .collect()
    }

    #[test]
    fn board_requires_three_pairs() {
        let mut two = pairs();
        two.pop();
        assert_eq!(
            MatchingBoard::new(two).unwrap_err(),
            MatchingError::WrongPairCount { expected: 3, got: 2 }
        );
    }

    #[test]
    fn pairing_prompt_with_its_answer_is_correct() {
        let mut board = MatchingBoard::new(pairs()).unwrap();
        assert_eq!(board.select(0).unwrap(), TileSelection::Armed(0));
        assert_eq!(
            board.select(3).unwrap(),
            TileSelection::Paired { first: 0, second: 3, correct: true }
        );
        assert_eq!(board.select(0).unwrap_err(), MatchingError::TileLocked(0));
        assert_eq!(board.correct_pairs(), 1);
    }

    #[test]
    fn two_of_three_passes() {
        let mut board = MatchingBoard::new(pairs()).unwrap();
        board.select(0).unwrap();
        board.select(3).unwrap(); // DNA - Genetic code
        board.select(1).unwrap();
        board.select(5).unwrap(); // ATP - Messenger (wrong)
        board.select(2).unwrap();
        board.select(4).unwrap(); // RNA - Energy carrier (wrong)
        assert!(board.is_finished());
        assert_eq!(board.correct_pairs(), 1);
        assert!(!board.is_correct());

        let mut board = MatchingBoard::new(pairs()).unwrap();
        for (a, b) in [(0, 3), (1, 4), (2, 5)] {
            board.select(a).unwrap();
            board.select(b).unwrap();
        }
        assert_eq!(board.correct_pairs(), 3);
        assert_eq!(board.outcome(), AnswerOutcome::Correct);
    }

    #[test]
    fn two_prompts_never_match() {
        let mut board = MatchingBoard::new(pairs()).unwrap();
        board.select(0).unwrap();
        let sel = board.select(1).unwrap();
        assert_eq!(sel, TileSelection::Paired { first: 0, second: 1, correct: false });
    }

    #[test]
    fn reclicking_armed_tile_disarms() {
        let mut board = MatchingBoard::new(pairs()).unwrap();
        board.select(2).unwrap();
        assert_eq!(board.select(2).unwrap(), TileSelection::Disarmed(2));
        assert_eq!(board.armed(), None);
        assert_eq!(board.select(9).unwrap_err(), MatchingError::NoSuchTile(9));
    }

    #[test]
    fn threshold_is_two_of_three() {
        for correct in 0..=MATCHING_PAIR_COUNT {
            assert_eq!(matching_outcome(correct).is_correct(), correct >= 2);
        }
    }

    #[test]
    fn shuffle_keeps_all_tiles() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = MatchingBoard::shuffled(pairs(), &mut rng).unwrap();
        assert_eq!(board.tiles().len(), 6);
        let prompts = board.tiles().iter().filter(|t| t.side == TileSide::Prompt).count();
        assert_eq!(prompts, 3);
    }
}
