/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use newt::{Board, Color, Move, Piece, PieceKind, Square, PIECE_VALUES};

#[test]
fn opening_position_has_twenty_moves_per_side() {
    let board = Board::new();

    assert_eq!(board.turn, Color::White);
    assert_eq!(board.turns, 0);
    assert!(board.history.is_empty());
    assert!(!board.last_move().is_valid());

    assert_eq!(board.moves_side_to_move.len(), 20);
    assert_eq!(board.moves_other.len(), 20);
    assert_eq!(board.generate_moves(Color::White, true).len(), 20);
    assert_eq!(board.generate_moves(Color::Black, true).len(), 20);
}

#[test]
fn opening_layout_matches_the_standard_array() {
    let board = Board::new();

    // Black's back rank occupies indexes 0..8.
    assert_eq!(board.kind_at(Square::from_index(0)), PieceKind::Rook);
    assert_eq!(board.kind_at(Square::from_index(1)), PieceKind::Knight);
    assert_eq!(board.kind_at(Square::from_index(2)), PieceKind::Bishop);
    assert_eq!(board.kind_at(Square::from_index(3)), PieceKind::Queen);
    assert_eq!(board.kind_at(Square::from_index(4)), PieceKind::King);
    assert_eq!(board.kind_at(Square::from_index(8)), PieceKind::Pawn);
    assert_eq!(board.color_at(Square::from_index(0)), Color::Black);

    assert_eq!(board.kind_at(Square::from_index(63)), PieceKind::Rook);
    assert_eq!(board.color_at(Square::from_index(63)), Color::White);

    assert!(board.is_empty(Square::from_index(17)));
    assert!(!board.moved_at(Square::from_index(0)));
    assert!(!board.check_at(Square::from_index(4)));

    assert_eq!(
        board.value_at(Square::from_index(0)),
        PIECE_VALUES[PieceKind::Rook.index()]
    );
    assert_eq!(
        board.value_at(Square::from_index(8)),
        PIECE_VALUES[PieceKind::Pawn.index()]
    );
}

#[test]
fn square_accessors_read_and_write_every_field() {
    let mut board = Board::new();
    let corner = Square::from_index(0);

    board.set_kind(corner, PieceKind::Pawn);
    assert_eq!(board.kind_at(corner), PieceKind::Pawn);
    assert_eq!(board.color_at(corner), Color::Black);

    board.set_color(corner, Color::White);
    assert_eq!(board.color_at(corner), Color::White);

    board.set_moved(corner, true);
    assert!(board.moved_at(corner));
    board.set_check(corner, true);
    assert!(board.check_at(corner));
    board.set_promoted(corner, true);
    assert!(board.promoted_at(corner));

    // Writing the empty kind clears the whole square.
    board.set_kind(corner, PieceKind::Empty);
    assert!(board.is_empty(corner));
    assert!(!board.moved_at(corner));
    assert!(!board.check_at(corner));
    assert!(!board.promoted_at(corner));
}

#[test]
fn renders_the_opening_position_exactly() {
    let board = Board::new();
    let expected = [
        "8  r  n  b  q  k  b  n  r ",
        "7  p  p  p  p  p  p  p  p ",
        "6  .     .     .     .    ",
        "5     .     .     .     . ",
        "4  .     .     .     .    ",
        "3     .     .     .     . ",
        "2  P  P  P  P  P  P  P  P ",
        "1  R  N  B  Q  K  B  N  R ",
        "   a  b  c  d  e  f  g  h",
    ];

    let lines = board.render();
    assert_eq!(lines.len(), expected.len());
    for (line, expected) in lines.iter().zip(expected) {
        assert_eq!(line, expected);
    }

    // Equal positions must render to byte-identical output.
    assert_eq!(Board::new().render(), board.render());
}

#[test]
fn opening_pieces_generate_the_expected_move_counts() {
    let board = Board::new();

    // Every pawn has a single and a double push.
    for file in 0..8 {
        assert_eq!(board.moves_for_square(Square::new(file, 1)).len(), 2);
        assert_eq!(board.moves_for_square(Square::new(file, 6)).len(), 2);
    }

    // Knights can hop over the pawns; nothing else can move at all.
    for rank in [0, 7] {
        assert_eq!(board.moves_for_square(Square::new(1, rank)).len(), 2);
        assert_eq!(board.moves_for_square(Square::new(6, rank)).len(), 2);
        assert_eq!(board.moves_for_square(Square::new(0, rank)).len(), 0);
        assert_eq!(board.moves_for_square(Square::new(2, rank)).len(), 0);
        assert_eq!(board.moves_for_square(Square::new(3, rank)).len(), 0);
        assert_eq!(board.moves_for_square(Square::new(4, rank)).len(), 0);
    }
}

#[test]
fn castling_appears_once_the_squares_clear() {
    for (side, rank) in [(Color::White, 7u8), (Color::Black, 0u8)] {
        let mut board = Board::new();
        let king = Square::new(4, rank);

        // Boxed in at the start.
        assert_eq!(board.moves_for_square(king).len(), 0);

        // Clear between the king and the a-file rook.
        for file in 1..4 {
            board.set_kind(Square::new(file, rank), PieceKind::Empty);
        }
        let moves = board.moves_for_square(king);
        assert_eq!(moves.len(), 2, "step to d plus the queen-side castle");
        assert_eq!(moves[1].to(), Square::new(2, rank));

        // Clear between the king and the h-file rook as well.
        for file in 5..7 {
            board.set_kind(Square::new(file, rank), PieceKind::Empty);
        }
        let moves = board.moves_for_square(king);
        assert_eq!(moves.len(), 4, "two steps plus both castles");
        assert_eq!(moves[2].to(), Square::new(6, rank));
        assert!(moves.iter().any(|mv| mv.to() == Square::new(2, rank)));

        // Executing the queen-side castle relocates the a-file rook.
        let mut castle = Move::new(king, Square::new(2, rank), 0);
        board.execute(&mut castle);
        assert_eq!(board.kind_at(Square::new(2, rank)), PieceKind::King);
        assert_eq!(board.kind_at(Square::new(3, rank)), PieceKind::Rook);
        assert_eq!(board.color_at(Square::new(3, rank)), side);
        assert!(board.moved_at(Square::new(2, rank)));
        assert!(board.moved_at(Square::new(3, rank)));
        assert!(board.is_empty(Square::new(0, rank)));
        assert!(board.is_empty(king));
    }
}

#[test]
fn king_side_castle_relocates_the_h_file_rook() {
    let mut board = Board::new();
    for file in 5..7 {
        board.set_kind(Square::new(file, 7), PieceKind::Empty);
    }

    let mut castle = Move::new(Square::new(4, 7), Square::new(6, 7), 0);
    board.execute(&mut castle);

    assert_eq!(board.kind_at(Square::new(6, 7)), PieceKind::King);
    assert_eq!(board.kind_at(Square::new(5, 7)), PieceKind::Rook);
    assert!(board.is_empty(Square::new(7, 7)));
    assert!(board.is_empty(Square::new(4, 7)));
}

#[test]
fn moved_pieces_do_not_offer_castling() {
    let mut board = Board::new();
    for file in 1..4 {
        board.set_kind(Square::new(file, 7), PieceKind::Empty);
    }
    board.set_moved(Square::new(0, 7), true);

    let moves = board.moves_for_square(Square::new(4, 7));
    assert_eq!(moves.len(), 1, "only the step to d1 once the rook has moved");
    assert_eq!(moves[0].to(), Square::new(3, 7));
}

#[test]
fn white_captures_en_passant() {
    let mut board = Board::new();

    // Black's e-pawn double pushed to e5 beside White's pawn on d5.
    board.put(Square::new(4, 3), Piece::new(PieceKind::Pawn, Color::Black));
    board.set_kind(Square::new(4, 1), PieceKind::Empty);
    board.set_moved(Square::new(4, 3), true);
    board.put(Square::new(3, 3), Piece::new(PieceKind::Pawn, Color::White));
    board.set_kind(Square::new(3, 6), PieceKind::Empty);
    board.set_moved(Square::new(3, 3), true);
    board
        .history
        .push(Move::new(Square::new(4, 1), Square::new(4, 3), 0));

    let moves = board.moves_for_square(Square::new(3, 3));
    assert_eq!(moves.len(), 2, "single push plus the en passant capture");

    let capture = moves[1];
    assert_eq!(capture.to(), Square::new(4, 2));
    assert_eq!(capture.value(), PieceKind::Pawn.value());

    let mut capture = capture;
    board.execute(&mut capture);
    assert!(capture.is_capture());
    assert_eq!(capture.captured().unwrap().kind, PieceKind::Pawn);
    assert!(board.is_empty(Square::new(4, 3)), "the victim pawn is gone");
    assert_eq!(board.kind_at(Square::new(4, 2)), PieceKind::Pawn);
    assert_eq!(board.captured_by_white.len(), 1);
    assert_eq!(board.captured_by_white[0].kind, PieceKind::Pawn);
    assert_eq!(board.captured_by_white[0].color, Color::Black);
}

#[test]
fn black_captures_en_passant() {
    let mut board = Board::new();

    // White's d-pawn double pushed to d4 beside Black's pawn on e4.
    board.put(Square::new(3, 4), Piece::new(PieceKind::Pawn, Color::White));
    board.set_kind(Square::new(3, 6), PieceKind::Empty);
    board.set_moved(Square::new(3, 4), true);
    board.put(Square::new(4, 4), Piece::new(PieceKind::Pawn, Color::Black));
    board.set_kind(Square::new(4, 1), PieceKind::Empty);
    board.set_moved(Square::new(4, 4), true);
    board
        .history
        .push(Move::new(Square::new(3, 6), Square::new(3, 4), 0));
    board.turn = Color::Black;

    let moves = board.moves_for_square(Square::new(4, 4));
    assert_eq!(moves.len(), 2);

    let mut capture = moves[1];
    assert_eq!(capture.to(), Square::new(3, 5));
    assert_eq!(capture.value(), PieceKind::Pawn.value());

    board.execute(&mut capture);
    assert!(board.is_empty(Square::new(3, 4)));
    assert_eq!(board.captured_by_black.len(), 1);
    assert_eq!(board.captured_by_black[0].color, Color::White);
}

#[test]
fn stale_double_pushes_do_not_allow_en_passant() {
    let mut board = Board::new();

    board.put(Square::new(4, 3), Piece::new(PieceKind::Pawn, Color::Black));
    board.set_kind(Square::new(4, 1), PieceKind::Empty);
    board.set_moved(Square::new(4, 3), true);
    board.put(Square::new(3, 3), Piece::new(PieceKind::Pawn, Color::White));
    board.set_kind(Square::new(3, 6), PieceKind::Empty);
    board.set_moved(Square::new(3, 3), true);

    // The double push happened, but something else moved since.
    board
        .history
        .push(Move::new(Square::new(4, 1), Square::new(4, 3), 0));
    board
        .history
        .push(Move::new(Square::new(6, 0), Square::new(5, 2), 0));

    let moves = board.moves_for_square(Square::new(3, 3));
    assert_eq!(moves.len(), 1, "only the single push remains");
    assert_eq!(moves[0].to(), Square::new(3, 2));
}

#[test]
fn pawns_promote_to_queens_on_the_far_rank() {
    let mut board = Board::empty();
    board.put(Square::new(4, 1), Piece::new(PieceKind::Pawn, Color::White));

    let mut push = Move::new(Square::new(4, 1), Square::new(4, 0), 0);
    board.execute(&mut push);
    assert_eq!(board.kind_at(Square::new(4, 0)), PieceKind::Queen);
    assert!(board.promoted_at(Square::new(4, 0)));

    board.put(Square::new(4, 6), Piece::new(PieceKind::Pawn, Color::Black));
    let mut push = Move::new(Square::new(4, 6), Square::new(4, 7), 0);
    board.execute(&mut push);
    assert_eq!(board.kind_at(Square::new(4, 7)), PieceKind::Queen);
    assert!(board.promoted_at(Square::new(4, 7)));
}

#[test]
fn repetition_draw_trips_on_the_fourth_recurrence() {
    let mut board = Board::empty();
    board.put(Square::new(3, 0), Piece::new(PieceKind::Queen, Color::Black));
    board.put(Square::new(3, 7), Piece::new(PieceKind::Queen, Color::White));
    board.max_repetitions = 3;
    board.generate_move_lists();

    let shuffle = [
        Move::new(Square::new(3, 7), Square::new(3, 6), 0),
        Move::new(Square::new(3, 0), Square::new(3, 1), 0),
        Move::new(Square::new(3, 6), Square::new(3, 7), 0),
        Move::new(Square::new(3, 1), Square::new(3, 0), 0),
    ];

    // Three full cycles pass without tripping the rule.
    for _ in 0..3 {
        for mv in shuffle {
            assert!(!board.draws_by_repetition(&mv));
            let mut mv = mv;
            board.execute(&mut mv);
            board.advance_turn();
        }
    }

    // Repeating the first move once more is the draw.
    assert!(board.draws_by_repetition(&shuffle[0]));
}

#[test]
fn execute_and_undo_restore_the_grid() {
    let mut board = Board::new();
    let fresh = Board::new();

    // Develop a knight, then put it back by hand.
    let from = Square::new(6, 7);
    let to = Square::new(5, 5);
    let mut mv = Move::new(from, to, 0);
    board.execute(&mut mv);
    assert!(board.is_empty(from));

    let knight = board.piece_at(to);
    board.put(from, knight);
    board.put(to, Piece::EMPTY);

    // Every square agrees with the untouched board except for flags.
    for sq in Square::iter() {
        assert_eq!(board.kind_at(sq), fresh.kind_at(sq), "square {sq}");
        if !board.is_empty(sq) {
            assert_eq!(board.color_at(sq), fresh.color_at(sq), "square {sq}");
        }
    }
}

#[test]
fn capture_undo_restores_the_victim() {
    let mut board = Board::empty();
    let from = Square::new(3, 3);
    let to = Square::new(4, 2);
    board.put(from, Piece::new(PieceKind::Rook, Color::White));
    board.put(to, Piece::new(PieceKind::Knight, Color::Black));
    let snapshot: Vec<(PieceKind, Color)> = Square::iter()
        .map(|sq| (board.kind_at(sq), board.color_at(sq)))
        .collect();

    let mut mv = Move::new(from, to, board.value_at(to));
    board.execute(&mut mv);
    assert!(mv.is_capture());

    // Reconstruct the undo from the move's own record.
    let mover = board.piece_at(to);
    board.put(from, mover);
    board.put(to, mv.captured().unwrap());

    for (sq, (kind, color)) in Square::iter().zip(snapshot) {
        assert_eq!(board.kind_at(sq), kind);
        if !board.is_empty(sq) {
            assert_eq!(board.color_at(sq), color);
        }
    }
}

#[test]
fn king_in_check_agrees_with_the_opponent_move_list() {
    let mut board = Board::new();
    assert!(!board.king_in_check(Color::White));
    assert!(!board.king_in_check(Color::Black));

    // A rook bearing down an open file on the black king.
    board.set_kind(Square::new(4, 1), PieceKind::Empty);
    board.put(Square::new(4, 4), Piece::new(PieceKind::Rook, Color::White));
    board.generate_move_lists();

    assert!(board.king_in_check(Color::Black));
    assert!(!board.king_in_check(Color::White));

    let king = board.king_square(Color::Black).unwrap();
    let threatened = board
        .generate_moves(Color::White, false)
        .iter()
        .any(|mv| mv.to() == king);
    assert!(threatened);
}

#[test]
fn history_tracks_every_half_move() {
    let mut board = Board::new();

    for _ in 0..10 {
        let mut mv = board.moves_side_to_move[0];
        board.execute(&mut mv);
        board.advance_turn();
        assert_eq!(board.last_move(), mv);
    }

    assert_eq!(board.turns, 10);
    assert_eq!(board.history.len(), 10);
}

#[test]
fn capture_logs_account_for_every_missing_piece() {
    let mut board = Board::new();

    // Play a fixed short sequence with a known capture: scholar-style
    // queen takes on f7.
    let sequence = [
        (Square::new(4, 6), Square::new(4, 4)), // e4
        (Square::new(0, 1), Square::new(0, 2)), // a6
        (Square::new(3, 7), Square::new(7, 3)), // Qh5
        (Square::new(0, 2), Square::new(0, 3)), // a5
        (Square::new(7, 3), Square::new(5, 1)), // Qxf7
    ];

    for (from, to) in sequence {
        let mut mv = Move::new(from, to, board.value_at(to));
        board.execute(&mut mv);
        board.advance_turn();
    }

    assert_eq!(board.captured_by_white.len(), 1);
    assert_eq!(board.captured_by_white[0].kind, PieceKind::Pawn);
    assert!(board.captured_by_black.is_empty());

    let remaining = Square::iter().filter(|&sq| !board.is_empty(sq)).count();
    assert_eq!(remaining, 32 - board.captured_by_white.len() - board.captured_by_black.len());
}
