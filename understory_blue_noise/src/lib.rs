// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_blue_noise --heading-base-level=0

//! Understory Blue Noise: hierarchical blue-noise point sets from self-similar Wang tiles.
//!
//! Understory Blue Noise answers one question fast: "which points, up to this
//! density, lie inside this rectangle?" It is a building block for stippling,
//! scatter placement, and any renderer whose visible region and point density
//! change continuously under pan and zoom.
//!
//! - Decode a precomputed tile set with [`TileSet::decode`] (or [`TileSet::load_file`] with `std`).
//! - Query it with [`TileSet::query`], which lazily walks the tile hierarchy and yields
//!   one [`PointBatch`] per visited tile.
//! - Use [`BoundingBox`] predicates to clip and to turn tile boxes into drawable rectangles.
//!
//! Points carry a rank. Lower ranks appear at lower densities, and every prefix by
//! rank is itself well distributed, so asking for a higher `max_rank` only ever adds
//! points. Beyond the root tile's base points, the query subdivides tiles and
//! rescales sub-point ranks by the inverse area of each tile box, so densities
//! from different depths share one scale.
//!
//! Subtrees outside the clip box are never visited and no point beyond the
//! requested rank is ever materialized.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_blue_noise::{BoundingBox, EdgeCodes, SubdivisionTable, Tile, TileId, TileSet};
//!
//! // A single tile that subdivides into copies of itself.
//! let tile = Tile::new(
//!     EdgeCodes::default(),
//!     SubdivisionTable::uniform(2, TileId::ROOT),
//!     vec![Point::new(0.1, 0.1), Point::new(0.5, 0.5), Point::new(0.9, 0.1)],
//!     vec![Point::new(0.25, 0.25), Point::new(0.75, 0.75)],
//! );
//! let set = TileSet::new(2, 1, vec![tile]);
//!
//! // Round-trip through the binary format.
//! let set = TileSet::decode(&set.encode()).unwrap();
//!
//! // The two lowest-ranked points of the whole domain.
//! let batches = set.query(BoundingBox::UNIT, 2.0).collect_batches().unwrap();
//! assert_eq!(batches.len(), 1);
//! assert_eq!(batches[0].ranks, [0.0, 1.0]);
//!
//! // Higher densities descend into subdivided tiles.
//! let clip = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
//! for batch in set.query(clip, 21.0).skip_empty(true) {
//!     let batch = batch.unwrap();
//!     assert!(batch.points.iter().all(|p| clip.contains(*p)));
//! }
//! ```
//!
//! ## Errors
//!
//! Decoding fails only on truncated input ([`DecodeError::UnexpectedEndOfData`]).
//! The format has no version or checksum, so inconsistent subdivision tables
//! surface during a query as [`QueryError::TileIndexOutOfRange`] or
//! [`QueryError::MissingSubdivision`], unless checked up front with
//! [`TileSet::validate`]. Zero-area tile boxes are reported as
//! [`QueryError::DegenerateGeometry`].
//!
//! ## Concurrency
//!
//! A [`TileSet`] is immutable after decoding and holds only owned data, so it can
//! be shared across threads and queried concurrently. Each [`Query`] owns its
//! traversal stack and output; dropping it is the only cancellation needed.
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature (on by default) adds
//! reading from and writing to `std::io` streams and files.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bbox;
pub mod decode;
pub mod error;
pub mod query;
pub mod source;
pub mod tile;

pub use bbox::BoundingBox;
pub use decode::decode_from;
pub use error::{DecodeError, QueryError, Section, SourceError};
pub use query::{DEFAULT_MAX_LEVEL, PointBatch, Query, QueryOptions};
#[cfg(feature = "std")]
pub use source::ReadSource;
pub use source::{SliceSource, TileSource};
pub use tile::{EdgeCodes, SubdivisionTable, Tile, TileId, TileSet};
