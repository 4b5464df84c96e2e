/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod movegen;
mod moves;
mod piece;
mod square;

pub use moves::*;
pub use piece::*;
pub use square::*;

/// A complete game state: the 8x8 grid plus everything needed to continue
/// play from it.
///
/// Boards are plain values. The search clones one before every trial move,
/// so nothing here may hold shared or borrowed state.
#[derive(Clone, Debug)]
pub struct Board {
    squares: [Piece; Square::COUNT],

    /// Side to move next.
    pub turn: Color,

    /// Half-moves played so far.
    pub turns: u32,

    /// Legal moves for the side to move, best first.
    pub moves_side_to_move: MoveList,

    /// Legal moves the opponent would have if it were their turn.
    pub moves_other: MoveList,

    /// Pieces White has captured, in capture order.
    pub captured_by_white: Vec<Piece>,

    /// Pieces Black has captured, in capture order.
    pub captured_by_black: Vec<Piece>,

    /// Every executed move, oldest first.
    pub history: Vec<Move>,

    /// Times a move may recur in recent history before the game is a draw.
    pub max_repetitions: u32,
}

impl Board {
    /// A board in the standard opening position, White to move, with both
    /// move lists generated.
    pub fn new() -> Self {
        let mut board = Self::empty();

        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            let file = file as u8;
            board.put(Square::new(file, 0), Piece::new(kind, Color::Black));
            board.put(Square::new(file, 1), Piece::new(PieceKind::Pawn, Color::Black));
            board.put(Square::new(file, 6), Piece::new(PieceKind::Pawn, Color::White));
            board.put(Square::new(file, 7), Piece::new(kind, Color::White));
        }

        board.generate_move_lists();
        board
    }

    /// A board with no pieces at all. Useful for setting up custom positions;
    /// callers are expected to place pieces and then call
    /// [`Board::generate_move_lists`].
    pub fn empty() -> Self {
        Self {
            squares: [Piece::EMPTY; Square::COUNT],
            turn: Color::White,
            turns: 0,
            moves_side_to_move: MoveList::new(),
            moves_other: MoveList::new(),
            captured_by_white: Vec::new(),
            captured_by_black: Vec::new(),
            history: Vec::new(),
            max_repetitions: 3,
        }
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.squares[sq.index()]
    }

    /// Places `piece` on `sq`, replacing whatever was there.
    #[inline(always)]
    pub fn put(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index()] = piece;
    }

    #[inline(always)]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_empty()
    }

    #[inline(always)]
    pub fn kind_at(&self, sq: Square) -> PieceKind {
        self.piece_at(sq).kind
    }

    #[inline(always)]
    pub fn color_at(&self, sq: Square) -> Color {
        self.piece_at(sq).color
    }

    #[inline(always)]
    pub fn moved_at(&self, sq: Square) -> bool {
        self.piece_at(sq).moved
    }

    #[inline(always)]
    pub fn check_at(&self, sq: Square) -> bool {
        self.piece_at(sq).check
    }

    #[inline(always)]
    pub fn promoted_at(&self, sq: Square) -> bool {
        self.piece_at(sq).promoted
    }

    /// Material value of the piece on `sq`.
    #[inline(always)]
    pub fn value_at(&self, sq: Square) -> i32 {
        self.piece_at(sq).value()
    }

    /// Changes the kind of the piece on `sq`. Writing the empty kind clears
    /// the whole square.
    #[inline(always)]
    pub fn set_kind(&mut self, sq: Square, kind: PieceKind) {
        if kind == PieceKind::Empty {
            self.squares[sq.index()] = Piece::EMPTY;
        } else {
            self.squares[sq.index()].kind = kind;
        }
    }

    #[inline(always)]
    pub fn set_color(&mut self, sq: Square, color: Color) {
        self.squares[sq.index()].color = color;
    }

    #[inline(always)]
    pub fn set_moved(&mut self, sq: Square, moved: bool) {
        self.squares[sq.index()].moved = moved;
    }

    #[inline(always)]
    pub fn set_check(&mut self, sq: Square, check: bool) {
        self.squares[sq.index()].check = check;
    }

    #[inline(always)]
    pub fn set_promoted(&mut self, sq: Square, promoted: bool) {
        self.squares[sq.index()].promoted = promoted;
    }

    /// The most recently executed move, or the invalid sentinel on a fresh
    /// board.
    #[inline(always)]
    pub fn last_move(&self) -> Move {
        self.history.last().copied().unwrap_or_default()
    }

    /// Applies `mv` to the board, recording any capture both on the move and
    /// in the mover's capture log, and appends the move to the history.
    ///
    /// No rule checking happens here; a move whose source square is empty is
    /// a caller bug and is skipped outright.
    pub fn execute(&mut self, mv: &mut Move) {
        let from = mv.from();
        let to = mv.to();
        let piece = self.piece_at(from);

        // An empty source is a caller bug; skip rather than smear the board.
        if piece.is_empty() || from == to {
            return;
        }

        if piece.kind == PieceKind::Pawn && from.file() != to.file() && self.is_empty(to) {
            // A pawn landing diagonally on an empty square is en passant:
            // the captured pawn sits beside the mover, not on `to`.
            let victim_sq = Square::new(to.file(), from.rank());
            let victim = self.piece_at(victim_sq);
            self.capture_log_mut(piece.color).push(victim);
            mv.set_captured(victim);
            self.put(victim_sq, Piece::EMPTY);
        } else if !self.is_empty(to) {
            let victim = self.piece_at(to);
            self.capture_log_mut(piece.color).push(victim);
            mv.set_captured(victim);
        }

        let mut landed = piece;
        landed.moved = true;
        self.put(to, landed);
        self.put(from, Piece::EMPTY);

        // A two-file king step is a castle; the rook comes along.
        if piece.kind == PieceKind::King && from.file().abs_diff(to.file()) == 2 {
            let rank = from.rank();
            let (rook_from, rook_to) = if to.file() == 2 {
                (Square::new(0, rank), Square::new(3, rank))
            } else {
                (Square::new(7, rank), Square::new(5, rank))
            };
            let mut rook = self.piece_at(rook_from);
            rook.moved = true;
            self.put(rook_to, rook);
            self.put(rook_from, Piece::EMPTY);
        }

        // Only queen promotion is supported.
        if piece.kind == PieceKind::Pawn && to.rank() == piece.color.promotion_rank() {
            let spot = &mut self.squares[to.index()];
            spot.kind = PieceKind::Queen;
            spot.promoted = true;
        }

        self.history.push(*mv);
    }

    /// Hands the turn to the other side: bumps the half-move counter, flips
    /// `turn`, regenerates both move lists, and refreshes the check flag on
    /// each king.
    pub fn advance_turn(&mut self) {
        self.turns += 1;
        self.turn = self.turn.opponent();
        self.generate_move_lists();

        for side in [Color::White, Color::Black] {
            if let Some(king) = self.king_square(side) {
                let checked = self.king_in_check(side);
                self.set_check(king, checked);
            }
        }
    }

    /// Where `side`'s king stands, if it is on the board at all.
    pub fn king_square(&self, side: Color) -> Option<Square> {
        Square::iter().find(|&sq| {
            let piece = self.piece_at(sq);
            piece.kind == PieceKind::King && piece.color == side
        })
    }

    /// Whether `side`'s king is attacked, judged against the opponent's
    /// unfiltered move list. A board without that king is never in check.
    pub fn king_in_check(&self, side: Color) -> bool {
        let Some(king) = self.king_square(side) else {
            return false;
        };

        self.generate_moves(side.opponent(), false)
            .iter()
            .any(|mv| mv.to() == king)
    }

    /// Whether playing `mv` would trigger the repetition rule under this
    /// board's configured limit.
    #[inline(always)]
    pub fn draws_by_repetition(&self, mv: &Move) -> bool {
        self.draws_by_repetition_within(mv, self.max_repetitions)
    }

    /// Count-in-window repetition rule: the candidate draws when it already
    /// appears `limit` or more times among the last `2^(limit + 1)` history
    /// entries. Move equality is by squares, so the rule catches shuffles
    /// regardless of what the rest of the board was doing.
    pub fn draws_by_repetition_within(&self, mv: &Move, limit: u32) -> bool {
        let window = 1usize
            .checked_shl(limit.saturating_add(1))
            .unwrap_or(usize::MAX);
        let start = self.history.len().saturating_sub(window);
        let seen = self.history[start..]
            .iter()
            .filter(|past| **past == *mv)
            .count();

        seen as u32 >= limit
    }

    /// Renders the position as nine display lines: eight ranks from Black's
    /// side down, then the file legend. Equal positions render to
    /// byte-identical output.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(9);

        for rank in 0..8u8 {
            let mut line = format!("{} ", 8 - rank);
            for file in 0..8u8 {
                let piece = self.piece_at(Square::new(file, rank));
                let symbol = if piece.is_empty() {
                    // Checker the empty squares.
                    if (rank + file) % 2 == 1 {
                        ' '
                    } else {
                        '.'
                    }
                } else {
                    piece.kind.symbol(piece.color)
                };
                line.push(' ');
                line.push(symbol);
                line.push(' ');
            }
            lines.push(line);
        }

        lines.push(String::from("   a  b  c  d  e  f  g  h"));
        lines
    }

    #[inline(always)]
    fn capture_log_mut(&mut self, side: Color) -> &mut Vec<Piece> {
        match side {
            Color::White => &mut self.captured_by_white,
            Color::Black => &mut self.captured_by_black,
        }
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
