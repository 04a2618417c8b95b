// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while decoding tile sets and while querying them.

use core::fmt;

use crate::bbox::BoundingBox;
use crate::tile::TileId;

/// The record being read when a source ran out of bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// The tile count header field.
    TileCount,
    /// The subdivision arity header field.
    SubdivisionArity,
    /// The subdivision level count header field.
    SubdivisionLevels,
    /// A tile's four edge codes.
    EdgeCodes,
    /// A tile's subdivision table.
    SubdivisionTable,
    /// A tile's base point count.
    PointCount,
    /// A tile's base point records.
    Points,
    /// A tile's sub-point count.
    SubPointCount,
    /// A tile's sub-point records.
    SubPoints,
}

impl Section {
    fn describe(self) -> &'static str {
        match self {
            Self::TileCount => "tile count",
            Self::SubdivisionArity => "subdivision arity",
            Self::SubdivisionLevels => "subdivision level count",
            Self::EdgeCodes => "edge codes",
            Self::SubdivisionTable => "subdivision table",
            Self::PointCount => "point count",
            Self::Points => "points",
            Self::SubPointCount => "sub-point count",
            Self::SubPoints => "sub-points",
        }
    }
}

/// Failure reported by a [`TileSource`](crate::TileSource).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceError {
    /// Fewer bytes remained than were requested.
    Eof,
    /// The underlying reader failed for another reason.
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

/// Error returned by the tile-set decoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The source was truncated in the middle of a record.
    UnexpectedEndOfData {
        /// The record being read.
        section: Section,
        /// Index of the tile being read, if past the header.
        tile: Option<usize>,
    },
    /// The underlying reader failed for a reason other than end of data.
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl DecodeError {
    pub(crate) fn from_source(err: SourceError, section: Section, tile: Option<usize>) -> Self {
        match err {
            SourceError::Eof => Self::UnexpectedEndOfData { section, tile },
            #[cfg(feature = "std")]
            SourceError::Io(kind) => Self::Io(kind),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEndOfData {
                section,
                tile: Some(tile),
            } => write!(
                f,
                "unexpected end of data while reading {} of tile {tile}",
                section.describe()
            ),
            Self::UnexpectedEndOfData {
                section,
                tile: None,
            } => write!(
                f,
                "unexpected end of data while reading {}",
                section.describe()
            ),
            #[cfg(feature = "std")]
            Self::Io(kind) => write!(f, "i/o error while reading tile set: {kind}"),
        }
    }
}

impl core::error::Error for DecodeError {}

/// Error returned while walking a tile set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum QueryError {
    /// A tile box with zero (or non-finite) area was reached.
    DegenerateGeometry {
        /// The offending box, in query space.
        tile_box: BoundingBox,
        /// Recursion depth at which it was reached.
        level: u32,
    },
    /// A tile has no level-0 subdivision entry for a child cell.
    MissingSubdivision {
        /// The parent tile.
        tile: TileId,
        /// Child row.
        row: u32,
        /// Child column.
        col: u32,
    },
    /// A subdivision entry points past the end of the tile set.
    TileIndexOutOfRange {
        /// The parent tile holding the entry.
        tile: TileId,
        /// The stored child index.
        index: TileId,
        /// Number of tiles in the set.
        tile_count: usize,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGeometry { tile_box, level } => write!(
                f,
                "degenerate tile box {tile_box:?} at level {level}; the tile set is malformed"
            ),
            Self::MissingSubdivision { tile, row, col } => write!(
                f,
                "tile {} has no subdivision entry for cell (row {row}, col {col})",
                tile.get()
            ),
            Self::TileIndexOutOfRange {
                tile,
                index,
                tile_count,
            } => write!(
                f,
                "tile {} subdivides into tile {}, but the set only has {tile_count} tiles",
                tile.get(),
                index.get()
            ),
        }
    }
}

impl core::error::Error for QueryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn truncation_message_names_the_record() {
        let err = DecodeError::UnexpectedEndOfData {
            section: Section::SubPoints,
            tile: Some(3),
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of data while reading sub-points of tile 3"
        );
        let err = DecodeError::from_source(SourceError::Eof, Section::TileCount, None);
        assert_eq!(
            err.to_string(),
            "unexpected end of data while reading tile count"
        );
    }

    #[test]
    fn out_of_range_message() {
        let err = QueryError::TileIndexOutOfRange {
            tile: TileId::new(0),
            index: TileId::new(9),
            tile_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "tile 0 subdivides into tile 9, but the set only has 2 tiles"
        );
    }
}
