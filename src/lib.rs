/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board state, move representation, and move generation.
mod board;

/// The move cache and its risk bookkeeping.
mod cache;

/// Command-line options understood by the driver.
mod cli;

/// Static evaluation of positions.
mod eval;

/// Main engine logic; all search related code.
mod search;

pub use board::*;
pub use cache::*;
pub use cli::*;
pub use eval::*;
pub use search::*;
