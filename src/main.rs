/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use newt::{Board, Engine, Options};

fn main() -> Result<()> {
    let mut options = Options::parse();
    if let Some(path) = options.config.take() {
        options.merge_file(&path)?;
    }

    let mut board = Board::new();
    board.max_repetitions = options.maxrep;

    let mut engine = Engine::new(options.ply as i32);
    engine.set_q_max_depth(-(options.qply as i32));
    engine.set_timeout(Duration::from_secs(options.timeout));
    engine.set_use_cache(options.cache);
    engine.set_use_threads(options.threads);
    engine.set_acceptable_risk(options.risk);
    engine.set_reserved_cores(options.reserve);

    play_game(&mut board, &mut engine);

    if options.cache {
        println!();
        engine.cache().show_metrics();
    }

    Ok(())
}

/// Runs the engine against itself until the game ends, printing the board
/// after every move.
fn play_game(board: &mut Board, engine: &mut Engine) {
    show_board(board);

    loop {
        let mut mv = engine.best_move(board);
        if !mv.is_valid() {
            break;
        }

        if board.draws_by_repetition(&mv) {
            println!("\nDraw by repetition!");
            return;
        }

        board.execute(&mut mv);
        board.advance_turn();
        show_board(board);
    }

    // The side to move has no legal reply.
    if board.king_in_check(board.turn) {
        println!("\nCheckmate! {} wins!", board.turn.opponent());
    } else {
        println!("\nStalemate!");
    }
}

fn show_board(board: &Board) {
    println!();
    let last = board.last_move();
    if last.is_valid() {
        println!("Turn {}: {last}", board.turns);
    }
    for line in board.render() {
        println!("{line}");
    }
}
