/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Color, Move, MoveList, Piece, PieceKind, PieceMoves, Square};

/// Knight jump offsets, nearest rank first.
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-1, -2),
    (1, -2),
    (-2, -1),
    (2, -1),
    (-2, 1),
    (2, 1),
    (-1, 2),
    (1, 2),
];

/// Rook rays.
const ORTHOGONALS: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Bishop rays.
const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

impl Board {
    /// Regenerates both cached move lists for the current position: the
    /// mover's list sorted best first, the opponent's filtered but unsorted.
    pub fn generate_move_lists(&mut self) {
        self.moves_side_to_move = self.generate_moves_sorted(self.turn);
        self.moves_other = self.generate_moves(self.turn.opponent(), true);
    }

    /// Every move `side` can make. With `filter_suicidal` set, moves that
    /// would leave the mover's own king attacked are removed, which is what
    /// makes the result legal rather than pseudo-legal.
    pub fn generate_moves(&self, side: Color, filter_suicidal: bool) -> MoveList {
        let mut moves = MoveList::new();

        for sq in Square::iter() {
            let piece = self.piece_at(sq);
            if piece.is_empty() || piece.color != side {
                continue;
            }
            moves.extend(self.moves_for_square(sq));
        }

        if filter_suicidal {
            moves.retain(|mv| !self.leaves_king_attacked(side, mv));
        }
        moves
    }

    /// Filtered moves for `side`, sorted descending by heuristic value so
    /// captures come first. The sort is stable: ties keep generation order.
    pub fn generate_moves_sorted(&self, side: Color) -> MoveList {
        let mut moves = self.generate_moves(side, true);
        moves.sort_by(|a, b| b.value().cmp(&a.value()));
        moves
    }

    /// Moves available to the single piece on `sq`, pseudo-legal.
    pub fn moves_for_square(&self, sq: Square) -> PieceMoves {
        let mut moves = PieceMoves::new();
        let (file, rank) = (sq.file(), sq.rank());

        match self.kind_at(sq) {
            PieceKind::Empty => {}
            PieceKind::Pawn => self.pawn_moves(&mut moves, file, rank),
            PieceKind::Knight => self.knight_moves(&mut moves, file, rank),
            PieceKind::Bishop => self.ray_moves(&mut moves, sq, &DIAGONALS),
            PieceKind::Rook => self.ray_moves(&mut moves, sq, &ORTHOGONALS),
            PieceKind::Queen => {
                self.ray_moves(&mut moves, sq, &ORTHOGONALS);
                self.ray_moves(&mut moves, sq, &DIAGONALS);
            }
            PieceKind::King => self.king_moves(&mut moves, file, rank),
        }

        moves
    }

    /// Single admission point for generated moves.
    ///
    /// Rejects off-board targets, empty sources, and own-color destinations,
    /// enforces the pawn rules (pushes may not capture; diagonals must
    /// capture, possibly en passant), and assigns the heuristic value: the
    /// material of whatever the move takes.
    fn add_move_if_valid(&self, moves: &mut PieceMoves, from: Square, to_file: i32, to_rank: i32) {
        let Some(to) = Square::try_new(to_file, to_rank) else {
            return;
        };

        let piece = self.piece_at(from);
        if piece.is_empty() {
            return;
        }

        let target = self.piece_at(to);
        if !target.is_empty() && target.color == piece.color {
            return;
        }

        let mut value = target.value();
        if piece.kind == PieceKind::Pawn {
            if from.file() == to.file() {
                if !target.is_empty() {
                    return;
                }
            } else if target.is_empty() {
                let Some(victim) = self.en_passant_victim(piece.color, from, to) else {
                    return;
                };
                value = victim.value();
            }
        }

        moves.push(Move::new(from, to, value));
    }

    /// The pawn a diagonal move onto an empty square would capture en
    /// passant, if the previous move was the matching double push.
    fn en_passant_victim(&self, mover: Color, from: Square, to: Square) -> Option<Piece> {
        let victim_sq = Square::new(to.file(), from.rank());
        let victim = self.piece_at(victim_sq);
        if victim.is_empty() || victim.kind != PieceKind::Pawn || victim.color == mover {
            return None;
        }

        // Only valid on the very next move after the double push.
        let last = self.last_move();
        if !last.is_valid() || last.to() != victim_sq {
            return None;
        }
        if last.from().file() != victim_sq.file()
            || last.from().rank().abs_diff(victim_sq.rank()) != 2
        {
            return None;
        }

        Some(victim)
    }

    /// Pushes first (single before double), then the diagonal captures with
    /// the lower file first.
    fn pawn_moves(&self, moves: &mut PieceMoves, file: u8, rank: u8) {
        let from = Square::new(file, rank);
        let piece = self.piece_at(from);
        let ahead = rank as i32 + piece.color.forward();

        if let Some(step) = Square::try_new(file as i32, ahead) {
            if self.is_empty(step) {
                self.add_move_if_valid(moves, from, file as i32, ahead);

                let two_ahead = ahead + piece.color.forward();
                if !piece.moved {
                    if let Some(jump) = Square::try_new(file as i32, two_ahead) {
                        if self.is_empty(jump) {
                            self.add_move_if_valid(moves, from, file as i32, two_ahead);
                        }
                    }
                }
            }
        }

        for file_step in [-1, 1] {
            self.add_move_if_valid(moves, from, file as i32 + file_step, ahead);
        }
    }

    fn knight_moves(&self, moves: &mut PieceMoves, file: u8, rank: u8) {
        let from = Square::new(file, rank);
        for (file_step, rank_step) in KNIGHT_OFFSETS {
            self.add_move_if_valid(moves, from, file as i32 + file_step, rank as i32 + rank_step);
        }
    }

    /// Walks each ray until it leaves the board, hits an own piece (stop
    /// short), or hits an opponent piece (include the capture, then stop).
    fn ray_moves(&self, moves: &mut PieceMoves, from: Square, rays: &[(i32, i32)]) {
        for &(file_step, rank_step) in rays {
            let mut file = from.file() as i32 + file_step;
            let mut rank = from.rank() as i32 + rank_step;

            while let Some(to) = Square::try_new(file, rank) {
                let target = self.piece_at(to);
                if !target.is_empty() && target.color == self.color_at(from) {
                    break;
                }
                self.add_move_if_valid(moves, from, file, rank);
                if !target.is_empty() {
                    break;
                }
                file += file_step;
                rank += rank_step;
            }
        }
    }

    /// The eight single steps in row-major order, then the king-side castle,
    /// then the queen-side castle.
    ///
    /// Castling requires an unmoved king, an unmoved rook, and empty squares
    /// between them. Castling through an attacked square is not rejected
    /// here; the suicidal-move filter only removes castling into check.
    fn king_moves(&self, moves: &mut PieceMoves, file: u8, rank: u8) {
        let from = Square::new(file, rank);

        for rank_step in -1..=1 {
            for file_step in -1..=1 {
                if file_step == 0 && rank_step == 0 {
                    continue;
                }
                self.add_move_if_valid(
                    moves,
                    from,
                    file as i32 + file_step,
                    rank as i32 + rank_step,
                );
            }
        }

        let king = self.piece_at(from);
        if king.moved {
            return;
        }

        if self.castle_rook_ready(Square::new(7, rank), king.color)
            && self.is_empty(Square::new(5, rank))
            && self.is_empty(Square::new(6, rank))
        {
            moves.push(Move::new(from, Square::new(6, rank), 0));
        }

        if self.castle_rook_ready(Square::new(0, rank), king.color)
            && self.is_empty(Square::new(1, rank))
            && self.is_empty(Square::new(2, rank))
            && self.is_empty(Square::new(3, rank))
        {
            moves.push(Move::new(from, Square::new(2, rank), 0));
        }
    }

    #[inline(always)]
    fn castle_rook_ready(&self, sq: Square, color: Color) -> bool {
        let rook = self.piece_at(sq);
        rook.kind == PieceKind::Rook && rook.color == color && !rook.moved
    }

    /// Whether executing `mv` would leave `side`'s own king attacked.
    ///
    /// Tries the move on a copy of the board and regenerates the opponent's
    /// pseudo-legal replies. Quadratic in the number of moves, but it is the
    /// behaviour the rest of the engine is built on.
    fn leaves_king_attacked(&self, side: Color, mv: &Move) -> bool {
        let mut trial = self.clone();
        let mut mv = *mv;
        trial.execute(&mut mv);
        trial.king_in_check(side)
    }
}
