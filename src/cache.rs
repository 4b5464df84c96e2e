/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::board::{Board, Color, Move, Square};

/// One remembered decision: the move chosen for a position, plus the
/// statistics that tell us how trustworthy reusing it has been.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// The stored move, carrying its search score as its value.
    pub mv: Move,

    /// How many descendants were examined when the move was produced.
    pub moves_examined: u64,

    /// Times this entry was looked up but re-evaluated anyway.
    retries: u32,

    /// Times such a re-evaluation produced a strictly better score for the
    /// storing side.
    betters: u32,
}

impl CacheEntry {
    #[inline(always)]
    fn new(mv: Move, moves_examined: u64) -> Self {
        Self {
            mv,
            moves_examined,
            retries: 0,
            betters: 0,
        }
    }

    /// Empirical fraction of reuse events that beat the stored score.
    /// An entry that has never been re-evaluated is maximally risky.
    #[inline(always)]
    pub fn risk(&self) -> f64 {
        if self.retries == 0 {
            1.0
        } else {
            f64::from(self.betters) / f64::from(self.retries)
        }
    }
}

#[derive(Default)]
struct CacheInner {
    sides: [HashMap<String, CacheEntry>; Color::COUNT],
    offered: u64,
    lookups: u64,
    found: u64,
    changed: u64,
    entries: u64,
}

/// Concurrent mapping from (side, position) to a previously chosen move.
///
/// One exclusive lock spans the maps and the counters for the duration of
/// every operation; contention is acceptable because per-call work is
/// proportional to the key length. Entries live for the lifetime of the
/// engine instance, with no eviction.
#[derive(Default)]
pub struct MoveCache {
    inner: Mutex<CacheInner>,
}

impl MoveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key for a position: one character per square in index
    /// order, upper case for White, lower case for Black, `'.'` for empty.
    ///
    /// Castling and en-passant rights are deliberately not encoded, so two
    /// positions collide iff their pieces agree exactly.
    pub fn key(board: &Board) -> String {
        Square::iter()
            .map(|sq| {
                let piece = board.piece_at(sq);
                if piece.is_empty() {
                    '.'
                } else {
                    piece.kind.symbol(piece.color)
                }
            })
            .collect()
    }

    /// Fetches the entry stored for `side` on this position, if any.
    pub fn lookup(&self, board: &Board, side: Color) -> Option<CacheEntry> {
        let key = Self::key(board);
        let mut inner = self.inner.lock().unwrap();

        inner.lookups += 1;
        let entry = inner.sides[side.index()].get(&key).cloned();
        if entry.is_some() {
            inner.found += 1;
        }
        entry
    }

    /// Proposes `mv` (scored `value`, after examining `moves_examined`
    /// descendants) as the answer for `side` on this position.
    ///
    /// Inserts when the position is new; replaces only when `value` is
    /// strictly better for `side` than the stored score. Invalid moves are
    /// counted but never stored.
    pub fn offer(&self, board: &Board, mv: Move, side: Color, value: i32, moves_examined: u64) {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;

        inner.offered += 1;
        if !mv.is_valid_for(board) {
            return;
        }

        let mut stored = mv;
        stored.set_value(value);

        match inner.sides[side.index()].entry(Self::key(board)) {
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry::new(stored, moves_examined));
                inner.entries += 1;
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get().mv.value();
                let better = if side.is_white() {
                    value > current
                } else {
                    value < current
                };

                if better {
                    // The reuse statistics describe the position, not the
                    // move, so they survive the replacement.
                    let entry = slot.get_mut();
                    entry.mv = stored;
                    entry.moves_examined = moves_examined;
                    inner.changed += 1;
                }
            }
        }
    }

    /// Records that the entry for `side` on this position was looked up but
    /// re-evaluated anyway.
    pub fn note_reuse(&self, board: &Board, side: Color) {
        let key = Self::key(board);
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.sides[side.index()].get_mut(&key) {
            entry.retries += 1;
        }
    }

    /// Records that a re-evaluation of this entry produced a strictly better
    /// score for the storing side.
    pub fn note_improved(&self, board: &Board, side: Color) {
        let key = Self::key(board);
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.sides[side.index()].get_mut(&key) {
            entry.betters += 1;
        }
    }

    /// Risk of reusing the stored move for `side` on this position.
    /// Positions without an entry are maximally risky.
    pub fn risk(&self, board: &Board, side: Color) -> f64 {
        let key = Self::key(board);
        let inner = self.inner.lock().unwrap();
        inner.sides[side.index()]
            .get(&key)
            .map_or(1.0, CacheEntry::risk)
    }

    /// Snapshot of the lifetime counters.
    pub fn metrics(&self) -> CacheMetrics {
        let inner = self.inner.lock().unwrap();
        CacheMetrics {
            offered: inner.offered,
            lookups: inner.lookups,
            found: inner.found,
            changed: inner.changed,
            entries: inner.entries,
        }
    }

    /// Prints the lifetime counters. Diagnostic surface for the driver's
    /// shutdown path.
    pub fn show_metrics(&self) {
        println!("{}", self.metrics());
    }
}

/// Lifetime counters of a [`MoveCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheMetrics {
    pub offered: u64,
    pub lookups: u64,
    pub found: u64,
    pub changed: u64,
    pub entries: u64,
}

impl fmt::Display for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Offered: {}", commas(self.offered))?;
        writeln!(f, "Lookups: {}", commas(self.lookups))?;
        writeln!(f, "Changed: {}", commas(self.changed))?;
        writeln!(f, "Entries: {}", commas(self.entries))?;
        write!(f, "Found  : {}", commas(self.found))
    }
}

/// Formats an integer with thousands separators.
fn commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}
