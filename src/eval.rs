/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::board::{Board, Piece, PieceKind, Square};

/// Static, stateless position scoring. Positive scores favor White,
/// negative scores favor Black.
///
/// The score is the sum of up to three independent contributions, selected
/// by a bit filter: raw material, a bonus for pieces standing near the
/// center, and the difference in mobility between the two sides.
pub struct Evaluator;

impl Evaluator {
    /// Include the material balance.
    pub const MATERIAL: u32 = 0b001;

    /// Include the center-proximity bonus.
    pub const CENTER: u32 = 0b010;

    /// Include the mobility difference.
    pub const MOBILITY: u32 = 0b100;

    /// All three contributions.
    pub const FULL: u32 = Self::MATERIAL | Self::CENTER | Self::MOBILITY;

    /// Weight applied to each step of center proximity.
    const CENTER_BONUS: i32 = 5;

    /// Weight applied to each move of mobility advantage.
    const MOBILITY_BONUS: i32 = 3;

    /// Scores `board` with the contributions selected by `filter`.
    ///
    /// The mobility term reads the board's cached move lists, so it reflects
    /// the position as of the last turn advance.
    pub fn evaluate(board: &Board, filter: u32) -> i32 {
        let mut score = 0;

        for sq in Square::iter() {
            let piece = board.piece_at(sq);
            if piece.is_empty() {
                continue;
            }

            if filter & Self::MATERIAL != 0 {
                score += Self::material(piece);
            }
            if filter & Self::CENTER != 0 {
                score += Self::center(sq, piece) * Self::CENTER_BONUS;
            }
        }

        if filter & Self::MOBILITY != 0 {
            let ours = board.moves_side_to_move.len() as i32;
            let theirs = board.moves_other.len() as i32;
            score += (ours - theirs) * Self::MOBILITY_BONUS;
        }

        score
    }

    /// Material contribution of one piece, white-positive.
    #[inline(always)]
    fn material(piece: Piece) -> i32 {
        piece.value() * piece.color.sign()
    }

    /// Center-proximity contribution of one piece: its Manhattan progress
    /// toward the middle, scaled by its kind tag. Kings score nothing; they
    /// have no business wandering to the center.
    #[inline(always)]
    fn center(sq: Square, piece: Piece) -> i32 {
        if piece.kind == PieceKind::King {
            return 0;
        }

        let file = sq.file() as i32;
        let rank = sq.rank() as i32;
        let toward_middle = file.min(7 - file) + rank.min(7 - rank);

        toward_middle * piece.kind.index() as i32 * piece.color.sign()
    }
}
