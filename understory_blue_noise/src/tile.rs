// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile hierarchy: tiles, their subdivision tables, and the tile-set arena.

use alloc::vec::Vec;

use kurbo::Point;

use crate::error::QueryError;

/// Index of a tile in its [`TileSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(u32);

impl TileId {
    /// The root tile. Its points define the coarsest density level.
    pub const ROOT: Self = Self(0);

    /// Create an id from a raw index.
    pub const fn new(idx: u32) -> Self {
        Self(idx)
    }

    /// The raw index.
    pub const fn get(self) -> u32 {
        self.0
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Edge-matching codes on the four sides of a Wang tile.
///
/// Carried through from the file as metadata; child selection is already
/// resolved in the [`SubdivisionTable`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EdgeCodes {
    /// North edge.
    pub n: u32,
    /// East edge.
    pub e: u32,
    /// South edge.
    pub s: u32,
    /// West edge.
    pub w: u32,
}

/// Which tile occupies each cell of a tile's `k × k` subdivision grid, per level.
///
/// Stored flat in `[level][row][col]` order, the same order as on disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubdivisionTable {
    levels: u32,
    arity: u32,
    entries: Vec<TileId>,
}

impl SubdivisionTable {
    /// Build a table from flat `[level][row][col]` entries.
    ///
    /// Returns `None` if `entries` does not hold exactly `levels * arity * arity` ids.
    pub fn new(levels: u32, arity: u32, entries: Vec<TileId>) -> Option<Self> {
        let expected = (levels as usize)
            .checked_mul(arity as usize)?
            .checked_mul(arity as usize)?;
        (entries.len() == expected).then_some(Self {
            levels,
            arity,
            entries,
        })
    }

    /// A single-level table with the same child in every cell.
    pub fn uniform(arity: u32, child: TileId) -> Self {
        let n = arity as usize * arity as usize;
        Self {
            levels: 1,
            arity,
            entries: alloc::vec![child; n],
        }
    }

    /// Number of precomputed subdivision levels.
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Grid size `k`.
    pub fn arity(&self) -> u32 {
        self.arity
    }

    /// The tile occupying `(row, col)` at `level`, if the table has that cell.
    pub fn get(&self, level: u32, row: u32, col: u32) -> Option<TileId> {
        if level >= self.levels || row >= self.arity || col >= self.arity {
            return None;
        }
        let k = self.arity as usize;
        let i = (level as usize * k + row as usize) * k + col as usize;
        self.entries.get(i).copied()
    }

    /// All entries in `[level][row][col]` order.
    pub fn entries(&self) -> &[TileId] {
        &self.entries
    }
}

/// One node of the tile hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tile {
    /// Edge-matching codes.
    pub edges: EdgeCodes,
    pub(crate) subdivisions: SubdivisionTable,
    pub(crate) points: Vec<Point>,
    pub(crate) sub_points: Vec<Point>,
    // Columns 2..6 of each on-disk record; unused by queries, kept for re-encoding.
    pub(crate) point_payload: Vec<[f32; 4]>,
    pub(crate) sub_point_payload: Vec<[f32; 4]>,
}

impl Tile {
    /// Create a tile from rank-ordered base points and sub-points in local `[0, 1]²` space.
    pub fn new(
        edges: EdgeCodes,
        subdivisions: SubdivisionTable,
        points: Vec<Point>,
        sub_points: Vec<Point>,
    ) -> Self {
        let point_payload = alloc::vec![[0.0; 4]; points.len()];
        let sub_point_payload = alloc::vec![[0.0; 4]; sub_points.len()];
        Self {
            edges,
            subdivisions,
            points,
            sub_points,
            point_payload,
            sub_point_payload,
        }
    }

    /// Subdivision table of this tile.
    pub fn subdivisions(&self) -> &SubdivisionTable {
        &self.subdivisions
    }

    /// Base points, in ascending rank order (index `i` has rank `i`).
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Extra points available when this tile is subdivided, in ascending rank order.
    ///
    /// Their ranks are relative to subdivision and must be rescaled by the
    /// density of the tile box they are placed in.
    pub fn sub_points(&self) -> &[Point] {
        &self.sub_points
    }

    /// The base points up to (excluding) `rank`.
    ///
    /// Every such prefix is itself a well-distributed point set.
    pub fn points_below(&self, rank: usize) -> &[Point] {
        &self.points[..rank.min(self.points.len())]
    }
}

/// A decoded, immutable tile hierarchy.
///
/// Tiles live in a flat arena and reference their children by [`TileId`].
/// The set holds only owned data, so it can be shared across threads and queried concurrently.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileSet {
    pub(crate) tiles: Vec<Tile>,
    pub(crate) subdivision_arity: u32,
    pub(crate) subdivision_levels: u32,
}

impl TileSet {
    /// Assemble a tile set from tiles; `tiles[0]` is the root.
    ///
    /// Subdivision indices are not checked here; see [`TileSet::validate`].
    pub fn new(subdivision_arity: u32, subdivision_levels: u32, tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            subdivision_arity,
            subdivision_levels,
        }
    }

    /// All tiles, root first.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if the set holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Grid size `k`: each subdivision splits a tile into `k × k` cells.
    pub fn subdivision_arity(&self) -> u32 {
        self.subdivision_arity
    }

    /// Number of subdivision levels stored per tile.
    pub fn subdivision_levels(&self) -> u32 {
        self.subdivision_levels
    }

    /// The root tile, if any.
    pub fn root(&self) -> Option<&Tile> {
        self.tiles.first()
    }

    /// Look up a tile by id.
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.idx())
    }

    /// Resolve the level-0 child of `parent` at `(row, col)`.
    pub(crate) fn child(
        &self,
        parent_id: TileId,
        parent: &Tile,
        row: u32,
        col: u32,
    ) -> Result<TileId, QueryError> {
        let index =
            parent
                .subdivisions
                .get(0, row, col)
                .ok_or(QueryError::MissingSubdivision {
                    tile: parent_id,
                    row,
                    col,
                })?;
        if index.idx() >= self.tiles.len() {
            return Err(QueryError::TileIndexOutOfRange {
                tile: parent_id,
                index,
                tile_count: self.tiles.len(),
            });
        }
        Ok(index)
    }

    /// Check that every subdivision cell a query may visit resolves to a tile.
    ///
    /// Decoding does not validate; without this check a malformed table only
    /// surfaces when a query reaches the bad entry.
    pub fn validate(&self) -> Result<(), QueryError> {
        for (i, tile) in self.tiles.iter().enumerate() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Tile counts come from a u32 header field."
            )]
            let id = TileId::new(i as u32);
            for entry in tile.subdivisions.entries() {
                if entry.idx() >= self.tiles.len() {
                    return Err(QueryError::TileIndexOutOfRange {
                        tile: id,
                        index: *entry,
                        tile_count: self.tiles.len(),
                    });
                }
            }
            for row in 0..self.subdivision_arity {
                for col in 0..self.subdivision_arity {
                    self.child(id, tile, row, col)?;
                }
            }
        }
        Ok(())
    }
}
