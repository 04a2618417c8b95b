// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared plumbing for the runnable demos: logging setup, tile-set loading,
//! and a deterministic synthetic tile set for when no file is given.

use std::path::PathBuf;

use clap::Args;
use kurbo::Point;
use tracing_subscriber::EnvFilter;
use understory_blue_noise::{DecodeError, EdgeCodes, SubdivisionTable, Tile, TileId, TileSet};

/// Where a demo gets its tile set from.
#[derive(Args, Debug, Clone)]
pub struct TileSetArgs {
    /// Tile-set file to load. A synthetic set is generated when omitted.
    pub tiles: Option<PathBuf>,

    /// Number of tiles in the synthetic set.
    #[arg(long, default_value_t = 16)]
    pub synthetic_tiles: u32,

    /// Subdivision arity of the synthetic set.
    #[arg(long, default_value_t = 3)]
    pub synthetic_arity: u32,

    /// Seed for the synthetic set.
    #[arg(long, default_value_t = 0x5EED_u64)]
    pub seed: u64,
}

impl TileSetArgs {
    /// Load the file if one was named, otherwise build a synthetic set.
    pub fn load(&self) -> Result<TileSet, DecodeError> {
        let set = match &self.tiles {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading tile set");
                TileSet::load_file(path)?
            }
            None => {
                tracing::debug!(
                    tiles = self.synthetic_tiles,
                    arity = self.synthetic_arity,
                    seed = self.seed,
                    "building synthetic tile set"
                );
                synthetic_tile_set(self.synthetic_tiles, self.synthetic_arity, self.seed)
            }
        };
        tracing::info!(
            tiles = set.len(),
            arity = set.subdivision_arity(),
            base_points = set.root().map_or(0, |t| t.points().len()),
            "tile set ready"
        );
        Ok(set)
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1_u64 << 24) as f32)
    }

    fn points(&mut self, count: usize) -> Vec<Point> {
        (0..count)
            .map(|_| Point::new(f64::from(self.next_f32()), f64::from(self.next_f32())))
            .collect()
    }
}

/// A uniformly random (white-noise) tile set with the shape of a real one.
///
/// Ranks are meaningful only as density levels here; the points are not blue
/// noise, but every query invariant still holds.
pub fn synthetic_tile_set(tiles: u32, arity: u32, seed: u64) -> TileSet {
    let tiles = tiles.max(1);
    let arity = arity.max(1);
    let mut rng = Rng(seed | 1);
    let cells = arity * arity;
    let tiles = (0..tiles)
        .map(|_| {
            let entries: Vec<_> = (0..cells)
                .map(|_| TileId::new((rng.next_u64() % u64::from(tiles)) as u32))
                .collect();
            let subdivisions = SubdivisionTable::new(1, arity, entries)
                .unwrap_or_else(|| SubdivisionTable::uniform(arity, TileId::ROOT));
            let n = 64 + (rng.next_u64() % 64) as usize;
            Tile::new(
                EdgeCodes::default(),
                subdivisions,
                rng.points(n),
                rng.points(n * (cells as usize - 1).max(1)),
            )
        })
        .collect();
    TileSet::new(arity, 1, tiles)
}
