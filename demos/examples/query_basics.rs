// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query basics.
//!
//! Build a one-tile set by hand, round-trip it through the binary format, and
//! walk the batches a few queries produce.
//!
//! Run:
//! - `cargo run -p understory_demos --example query_basics`

use kurbo::Point;
use understory_blue_noise::{
    BoundingBox, EdgeCodes, QueryError, SubdivisionTable, Tile, TileId, TileSet,
};

fn main() -> Result<(), QueryError> {
    // One tile whose 2x2 subdivision is four copies of itself.
    let tile = Tile::new(
        EdgeCodes::default(),
        SubdivisionTable::uniform(2, TileId::ROOT),
        vec![
            Point::new(0.125, 0.125),
            Point::new(0.5, 0.5),
            Point::new(0.875, 0.125),
            Point::new(0.375, 0.875),
        ],
        vec![
            Point::new(0.25, 0.25),
            Point::new(0.75, 0.75),
            Point::new(0.25, 0.75),
            Point::new(0.75, 0.25),
        ],
    );
    let bytes = TileSet::new(2, 1, vec![tile]).encode();
    println!("encoded tile set: {} bytes", bytes.len());
    let set = TileSet::decode(&bytes).expect("freshly encoded bytes decode");

    // Below the base point count only the root batch is produced.
    let batches = set.query(BoundingBox::UNIT, 3.0).collect_batches()?;
    println!("rank 3 over the unit square: {} batch", batches.len());
    for (p, rank) in batches[0].iter() {
        println!("  ({:.3}, {:.3}) rank {rank}", p.x, p.y);
    }

    // Higher ranks descend into the subdivision; each batch is one tile.
    println!("rank 24 over the lower-left quarter:");
    let clip = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
    for batch in set.query(clip, 24.0).skip_empty(true) {
        let batch = batch?;
        let (x, y, w, h) = batch.tile_box.to_corner_size();
        println!(
            "  level {} tile ({x:.3}, {y:.3}, {w:.3}x{h:.3}): ranks {:?}",
            batch.level, batch.ranks
        );
    }

    // Nothing is emitted outside the domain, but the root batch still appears.
    let outside = set.query(BoundingBox::new(2.0, 2.0, 3.0, 3.0), 1e6);
    println!("outside the domain: {} points", outside.collect_points()?.len());
    Ok(())
}
