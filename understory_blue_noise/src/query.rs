// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rank- and clip-driven point queries over a [`TileSet`].

use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use crate::bbox::BoundingBox;
use crate::error::QueryError;
use crate::tile::{Tile, TileId, TileSet};

/// Depth cap for unbounded ranks when no explicit [`QueryOptions::max_level`] is set.
pub const DEFAULT_MAX_LEVEL: u32 = 24;

/// Tuning knobs for a [`Query`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// Deepest recursion level that is visited. The root batch is level 0.
    ///
    /// `None` leaves finite ranks uncapped, so the walk descends exactly as far
    /// as the rank requires. An infinite rank is then capped at
    /// [`DEFAULT_MAX_LEVEL`]. Tiles with no points at all never satisfy the
    /// stop condition; set an explicit cap when querying such sets.
    pub max_level: Option<u32>,
    /// Omit batches with no points. The union of returned points is unchanged.
    pub skip_empty: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_level: None,
            skip_empty: false,
        }
    }
}

/// Points contributed by one visited (sub)tile.
#[derive(Clone, Debug, PartialEq)]
pub struct PointBatch {
    /// Points in query space.
    pub points: Vec<Point>,
    /// Rank of each point, on the density scale shared by the whole query.
    pub ranks: Vec<f64>,
    /// Box of the tile the points came from, in query space.
    pub tile_box: BoundingBox,
    /// Recursion depth; 0 is the root batch.
    pub level: u32,
}

impl PointBatch {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the batch holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate `(point, rank)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
        self.points.iter().copied().zip(self.ranks.iter().copied())
    }
}

#[derive(Copy, Clone, Debug)]
enum Slot<'a> {
    Root,
    Child {
        parent: TileId,
        parent_tile: &'a Tile,
        row: u32,
        col: u32,
    },
}

#[derive(Copy, Clone, Debug)]
struct Frame<'a> {
    slot: Slot<'a>,
    tile_box: BoundingBox,
    level: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Root,
    Descend,
    Done,
}

/// Lazy, depth-first walk of a tile set yielding one [`PointBatch`] per visited tile.
///
/// Created by [`TileSet::query`]. Batches come in pre-order: the root batch,
/// then each subtree fully before its next sibling. Children of a tile are
/// visited column by column, top to bottom within a column.
///
/// Dropping the iterator cancels the walk. After an error it yields nothing more.
pub struct Query<'a> {
    tile_set: &'a TileSet,
    clip: BoundingBox,
    rank_limit: f64,
    options: QueryOptions,
    phase: Phase,
    stack: Vec<Frame<'a>>,
}

impl fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("clip", &self.clip)
            .field("rank_limit", &self.rank_limit)
            .field("options", &self.options)
            .field("pending", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl TileSet {
    /// Query all points with rank below `max_rank` strictly inside `clip`.
    ///
    /// `max_rank` is rounded up first, so a fractional density includes one
    /// extra point rather than one too few. Negative or NaN ranks select nothing.
    /// Call again to restart; the tile set is never mutated.
    pub fn query(&self, clip: impl Into<BoundingBox>, max_rank: f64) -> Query<'_> {
        let rank_limit = if max_rank > 0.0 { max_rank.ceil() } else { 0.0 };
        Query {
            tile_set: self,
            clip: clip.into(),
            rank_limit,
            options: QueryOptions::default(),
            phase: Phase::Root,
            stack: Vec::new(),
        }
    }
}

impl<'a> Query<'a> {
    /// Replace all options.
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Cap the recursion depth, see [`QueryOptions::max_level`].
    pub fn max_level(mut self, max_level: u32) -> Self {
        self.options.max_level = Some(max_level);
        self
    }

    /// Set [`QueryOptions::skip_empty`].
    pub fn skip_empty(mut self, skip_empty: bool) -> Self {
        self.options.skip_empty = skip_empty;
        self
    }

    /// The clip box in query space.
    pub fn clip(&self) -> BoundingBox {
        self.clip
    }

    /// The requested rank after rounding up.
    pub fn rank_limit(&self) -> f64 {
        self.rank_limit
    }

    /// Run to completion and collect all batches.
    pub fn collect_batches(self) -> Result<Vec<PointBatch>, QueryError> {
        self.collect()
    }

    /// Run to completion and collect all `(point, rank)` pairs in batch order.
    pub fn collect_points(self) -> Result<Vec<(Point, f64)>, QueryError> {
        let mut out = Vec::new();
        for batch in self {
            out.extend(batch?.iter());
        }
        Ok(out)
    }

    /// The deepest level this query visits.
    fn level_cap(&self) -> u32 {
        match self.options.max_level {
            Some(level) => level,
            None if self.rank_limit.is_finite() => u32::MAX,
            None => DEFAULT_MAX_LEVEL,
        }
    }

    fn root_batch(&mut self) -> Option<PointBatch> {
        let root = self.tile_set.root()?;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Saturating float to usize conversion; the prefix is clamped to the point count."
        )]
        let prefix = root.points_below(self.rank_limit as usize);
        let mut points = prefix.to_vec();
        let mut ranks: Vec<f64> = (0..prefix.len()).map(|i| i as f64).collect();
        self.clip.retain_contained(&mut points, &mut ranks);

        if self.rank_limit > root.points.len() as f64 && self.level_cap() >= 1 {
            self.stack.push(Frame {
                slot: Slot::Root,
                tile_box: BoundingBox::UNIT,
                level: 1,
            });
        }
        Some(PointBatch {
            points,
            ranks,
            tile_box: BoundingBox::UNIT,
            level: 0,
        })
    }

    fn visit(&mut self, frame: Frame<'a>) -> Result<Option<PointBatch>, QueryError> {
        let tile_box = frame.tile_box;
        if !tile_box.overlaps(&self.clip) {
            return Ok(None);
        }
        let tile_set = self.tile_set;
        let id = match frame.slot {
            Slot::Root => TileId::ROOT,
            Slot::Child {
                parent,
                parent_tile,
                row,
                col,
            } => tile_set.child(parent, parent_tile, row, col)?,
        };
        let Some(tile) = tile_set.get(id) else {
            // Only an empty set lacks the root, and empty sets never descend.
            return Ok(None);
        };

        let area = tile_box.area();
        let density_scale = 1.0 / area;
        if !(area > 0.0 && density_scale.is_finite()) {
            return Err(QueryError::DegenerateGeometry {
                tile_box,
                level: frame.level,
            });
        }

        // Sub-point `i` continues the parent's ordering at rank `(i + base) * density_scale`.
        let base = tile.points.len();
        let wanted = (self.rank_limit / density_scale - base as f64).ceil();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Saturating float to usize conversion, clamped to the sub-point count."
        )]
        let count = if wanted > 0.0 {
            (wanted as usize).min(tile.sub_points.len())
        } else {
            0
        };
        let mut points: Vec<Point> = tile.sub_points[..count]
            .iter()
            .map(|p| tile_box.map_local(*p))
            .collect();
        let mut ranks: Vec<f64> = (0..count)
            .map(|i| (i + base) as f64 * density_scale)
            .collect();
        self.clip.retain_contained(&mut points, &mut ranks);

        // Even every sub-point stays at or below the requested density: go finer.
        let capacity = (base + tile.sub_points.len()) as f64 * density_scale;
        if capacity <= self.rank_limit && frame.level < self.level_cap() {
            self.push_children(id, tile, tile_box, frame.level + 1);
        }

        if points.is_empty() && self.options.skip_empty {
            return Ok(None);
        }
        Ok(Some(PointBatch {
            points,
            ranks,
            tile_box,
            level: frame.level,
        }))
    }

    fn push_children(
        &mut self,
        parent: TileId,
        parent_tile: &'a Tile,
        tile_box: BoundingBox,
        level: u32,
    ) {
        let k = self.tile_set.subdivision_arity;
        // Reverse order so the first child is popped first.
        for col in (0..k).rev() {
            for row in (0..k).rev() {
                let child_box = tile_box.cell(col, row, k);
                if child_box.overlaps(&self.clip) {
                    self.stack.push(Frame {
                        slot: Slot::Child {
                            parent,
                            parent_tile,
                            row,
                            col,
                        },
                        tile_box: child_box,
                        level,
                    });
                }
            }
        }
    }
}

impl Iterator for Query<'_> {
    type Item = Result<PointBatch, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::Root => {
                    self.phase = Phase::Descend;
                    let Some(batch) = self.root_batch() else {
                        self.phase = Phase::Done;
                        return None;
                    };
                    if batch.is_empty() && self.options.skip_empty {
                        continue;
                    }
                    return Some(Ok(batch));
                }
                Phase::Descend => {
                    let Some(frame) = self.stack.pop() else {
                        self.phase = Phase::Done;
                        return None;
                    };
                    match self.visit(frame) {
                        Ok(Some(batch)) => return Some(Ok(batch)),
                        Ok(None) => {}
                        Err(err) => {
                            self.phase = Phase::Done;
                            self.stack.clear();
                            return Some(Err(err));
                        }
                    }
                }
                Phase::Done => return None,
            }
        }
    }
}

impl core::iter::FusedIterator for Query<'_> {}
