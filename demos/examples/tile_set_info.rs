// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile-set inspection.
//!
//! Load a tile set (or build a synthetic one), print its shape, and check its
//! subdivision tables.
//!
//! Run:
//! - `cargo run -p understory_demos --example tile_set_info -- path/to/tiles.dat`
//! - `cargo run -p understory_demos --example tile_set_info`

use std::process::ExitCode;

use clap::Parser;
use understory_demos::{TileSetArgs, init_tracing};

#[derive(Parser, Debug)]
#[command(about = "Print statistics about a blue-noise tile set")]
struct Cli {
    #[command(flatten)]
    source: TileSetArgs,

    /// Also list every tile.
    #[arg(long)]
    per_tile: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let set = match cli.source.load() {
        Ok(set) => set,
        Err(err) => {
            tracing::error!(%err, "failed to load tile set");
            return ExitCode::FAILURE;
        }
    };

    println!("Tile count: {}", set.len());
    println!("Subdivision: {}", set.subdivision_arity());
    println!(
        "Tile 0 base point count: {}",
        set.root().map_or(0, |t| t.points().len())
    );

    if cli.per_tile {
        for (i, tile) in set.tiles().iter().enumerate() {
            println!(
                "tile {i:>3}: edges {:?}, {} points, {} sub-points, children {:?}",
                tile.edges,
                tile.points().len(),
                tile.sub_points().len(),
                tile.subdivisions().entries(),
            );
        }
    }

    match set.validate() {
        Ok(()) => {
            tracing::info!("subdivision tables are consistent");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::warn!(%err, "tile set would fail during deep queries");
            ExitCode::FAILURE
        }
    }
}
