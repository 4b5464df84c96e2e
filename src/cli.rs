/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

/// Runtime options for the engine driver.
#[derive(Debug, Clone, Parser)]
#[command(about, version)]
pub struct Options {
    /// Plies to search before quiescence takes over.
    #[arg(long, default_value_t = 3)]
    pub ply: u32,

    /// Extra plies quiescence may chase captures past the search depth.
    #[arg(long, default_value_t = 2)]
    pub qply: u32,

    /// Reuse previously chosen moves via the move cache.
    #[arg(long)]
    pub cache: bool,

    /// Search the root moves on parallel worker threads.
    #[arg(long)]
    pub threads: bool,

    /// Wall-clock budget per move, in seconds. 0 disables the limit.
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,

    /// Cores to leave idle when searching with threads.
    #[arg(long, default_value_t = 0)]
    pub reserve: usize,

    /// Times a move may recur in recent history before the game is a draw.
    #[arg(long, default_value_t = 3)]
    pub maxrep: u32,

    /// Highest cache-entry risk (0..1) that may be reused unverified.
    #[arg(long, default_value_t = 0.25)]
    pub risk: f64,

    /// Read additional options from a file of `key value` lines.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Options {
    /// Applies `key value` pairs from an options file over the parsed flags.
    ///
    /// Blank lines and `#` comments are skipped. A key with no value is
    /// treated as a switched-on flag. Unknown keys are rejected.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read options file {}", path.display()))?;

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once(char::is_whitespace)
                .unwrap_or((line, ""));

            self.apply(key, value.trim())
                .with_context(|| format!("{}:{}: {line:?}", path.display(), number + 1))?;
        }

        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "ply" => self.ply = value.parse()?,
            "qply" => self.qply = value.parse()?,
            "cache" => self.cache = parse_switch(value)?,
            "threads" => self.threads = parse_switch(value)?,
            "timeout" => self.timeout = value.parse()?,
            "reserve" => self.reserve = value.parse()?,
            "maxrep" => self.maxrep = value.parse()?,
            "risk" => self.risk = value.parse()?,
            _ => bail!("unknown option {key:?}"),
        }
        Ok(())
    }
}

/// A bare key means "on", like a unary command-line flag.
fn parse_switch(value: &str) -> Result<bool> {
    match value {
        "" | "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => bail!("expected a boolean, got {value:?}"),
    }
}
