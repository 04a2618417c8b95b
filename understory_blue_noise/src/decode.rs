// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary tile-set format: decoding and encoding.
//!
//! Layout (little-endian, `u32` unless noted):
//!
//! ```text
//! tile_count
//! subdivision_arity            k
//! subdivision_levels           L
//! tile_count × {
//!     n e s w                  edge codes
//!     L × k × k                subdivision table, [level][row][col]
//!     point_count
//!     point_count × 6 f32      columns 0..2 are (x, y), the rest is unused payload
//!     sub_point_count
//!     sub_point_count × 6 f32
//! }
//! ```
//!
//! There is no magic, version, or checksum. Bytes after the last tile are ignored.

use alloc::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};
use kurbo::Point;

use crate::error::{DecodeError, Section};
use crate::source::{SliceSource, TileSource};
use crate::tile::{EdgeCodes, SubdivisionTable, Tile, TileId, TileSet};

const RECORD_LEN: usize = 6;

// Cap on up-front allocation; counts come from untrusted data.
const MAX_PREALLOC: usize = 1 << 16;

/// Decode a tile set from any [`TileSource`].
pub fn decode_from<S: TileSource>(src: &mut S) -> Result<TileSet, DecodeError> {
    let tile_count = read_header(src, Section::TileCount)?;
    let arity = read_header(src, Section::SubdivisionArity)?;
    let levels = read_header(src, Section::SubdivisionLevels)?;

    let mut tiles = Vec::with_capacity((tile_count as usize).min(MAX_PREALLOC));
    for i in 0..tile_count as usize {
        tiles.push(decode_tile(src, i, arity, levels)?);
    }
    Ok(TileSet::new(arity, levels, tiles))
}

fn read_header<S: TileSource>(src: &mut S, section: Section) -> Result<u32, DecodeError> {
    src.read_u32()
        .map_err(|e| DecodeError::from_source(e, section, None))
}

fn decode_tile<S: TileSource>(
    src: &mut S,
    tile: usize,
    arity: u32,
    levels: u32,
) -> Result<Tile, DecodeError> {
    let at = |section| move |e| DecodeError::from_source(e, section, Some(tile));

    let mut e = [0_u32; 4];
    src.read_u32_into(&mut e).map_err(at(Section::EdgeCodes))?;
    let edges = EdgeCodes {
        n: e[0],
        e: e[1],
        s: e[2],
        w: e[3],
    };

    let cells = (levels as usize)
        .saturating_mul(arity as usize)
        .saturating_mul(arity as usize);
    let mut entries = Vec::with_capacity(cells.min(MAX_PREALLOC));
    for _ in 0..cells {
        let id = src.read_u32().map_err(at(Section::SubdivisionTable))?;
        entries.push(TileId::new(id));
    }
    let subdivisions = SubdivisionTable::new(levels, arity, entries)
        .ok_or(DecodeError::UnexpectedEndOfData {
            section: Section::SubdivisionTable,
            tile: Some(tile),
        })?;

    let count = src.read_u32().map_err(at(Section::PointCount))?;
    let (points, point_payload) = decode_records(src, count).map_err(at(Section::Points))?;

    let count = src.read_u32().map_err(at(Section::SubPointCount))?;
    let (sub_points, sub_point_payload) =
        decode_records(src, count).map_err(at(Section::SubPoints))?;

    Ok(Tile {
        edges,
        subdivisions,
        points,
        sub_points,
        point_payload,
        sub_point_payload,
    })
}

type Records = (Vec<Point>, Vec<[f32; 4]>);

fn decode_records<S: TileSource>(
    src: &mut S,
    count: u32,
) -> Result<Records, crate::error::SourceError> {
    let n = (count as usize).min(MAX_PREALLOC);
    let mut points = Vec::with_capacity(n);
    let mut payload = Vec::with_capacity(n);
    let mut rec = [0.0_f32; RECORD_LEN];
    for _ in 0..count {
        src.read_f32_into(&mut rec)?;
        points.push(Point::new(f64::from(rec[0]), f64::from(rec[1])));
        payload.push([rec[2], rec[3], rec[4], rec[5]]);
    }
    Ok((points, payload))
}

impl TileSet {
    /// Decode a tile set from an in-memory file image.
    ///
    /// The format carries no version or checksum; subdivision indices are not
    /// validated here (see [`TileSet::validate`]).
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode_from(&mut SliceSource::new(bytes))
    }

    /// Decode a tile set from a reader.
    ///
    /// Reads are small and sequential; buffer unbuffered readers.
    #[cfg(feature = "std")]
    pub fn read_from<R: std::io::Read>(reader: R) -> Result<Self, DecodeError> {
        decode_from(&mut crate::source::ReadSource::new(reader))
    }

    /// Load a tile-set file from disk.
    #[cfg(feature = "std")]
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, DecodeError> {
        let file = std::fs::File::open(path).map_err(|e| DecodeError::Io(e.kind()))?;
        Self::read_from(std::io::BufReader::new(file))
    }

    /// Serialize into the on-disk layout.
    ///
    /// Decoding a conformant file and encoding it again reproduces the same bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_u32(&mut out, self.len_u32());
        put_u32(&mut out, self.subdivision_arity);
        put_u32(&mut out, self.subdivision_levels);
        for tile in &self.tiles {
            let EdgeCodes { n, e, s, w } = tile.edges;
            for v in [n, e, s, w] {
                put_u32(&mut out, v);
            }
            for id in tile.subdivisions.entries() {
                put_u32(&mut out, id.get());
            }
            put_records(&mut out, &tile.points, &tile.point_payload);
            put_records(&mut out, &tile.sub_points, &tile.sub_point_payload);
        }
        out
    }

    /// Serialize into a writer.
    #[cfg(feature = "std")]
    pub fn write_to<W: std::io::Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.encode())
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "The format stores counts as u32."
    )]
    fn len_u32(&self) -> u32 {
        self.tiles.len() as u32
    }
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    let mut buf = [0_u8; 4];
    LittleEndian::write_u32(&mut buf, v);
    out.extend_from_slice(&buf);
}

fn put_f32(out: &mut Vec<u8>, v: f32) {
    let mut buf = [0_u8; 4];
    LittleEndian::write_f32(&mut buf, v);
    out.extend_from_slice(&buf);
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Points are stored as f32 on disk; decoded values round-trip exactly."
)]
fn put_records(out: &mut Vec<u8>, points: &[Point], payload: &[[f32; 4]]) {
    put_u32(out, points.len() as u32);
    for (i, p) in points.iter().enumerate() {
        put_f32(out, p.x as f32);
        put_f32(out, p.y as f32);
        for v in payload.get(i).copied().unwrap_or_default() {
            put_f32(out, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> TileSet {
        let t0 = Tile::new(
            EdgeCodes {
                n: 1,
                e: 2,
                s: 3,
                w: 4,
            },
            SubdivisionTable::new(1, 2, vec![TileId::new(1); 4]).unwrap(),
            vec![Point::new(0.25, 0.75), Point::new(0.5, 0.5)],
            vec![Point::new(0.125, 0.875)],
        );
        let t1 = Tile::new(
            EdgeCodes::default(),
            SubdivisionTable::new(1, 2, vec![TileId::new(0); 4]).unwrap(),
            vec![Point::new(0.5, 0.25)],
            vec![],
        );
        TileSet::new(2, 1, vec![t0, t1])
    }

    #[test]
    fn header_and_first_tile_layout() {
        let bytes = sample().encode();
        let word = |i: usize| LittleEndian::read_u32(&bytes[i * 4..i * 4 + 4]);
        assert_eq!((word(0), word(1), word(2)), (2, 2, 1));
        assert_eq!((word(3), word(4), word(5), word(6)), (1, 2, 3, 4));
        assert_eq!(word(11), 2, "point count follows the 2x2 table");
        // 3 header + 2 tiles × (4 edges + 4 table + 2 counts) + 4 records × 6
        assert_eq!(bytes.len(), (3 + 2 * 10 + 4 * 6) * 4);
    }

    #[test]
    fn decode_reads_back_points() {
        let set = TileSet::decode(&sample().encode()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.subdivision_arity(), 2);
        assert_eq!(set.subdivision_levels(), 1);
        let root = set.root().unwrap();
        assert_eq!(root.edges.w, 4);
        assert_eq!(root.points(), &[Point::new(0.25, 0.75), Point::new(0.5, 0.5)]);
        assert_eq!(root.sub_points(), &[Point::new(0.125, 0.875)]);
        assert_eq!(root.subdivisions().get(0, 1, 1), Some(TileId::new(1)));
        assert_eq!(set, sample());
    }

    #[test]
    fn payload_columns_survive_round_trip() {
        let mut bytes = sample().encode();
        // First point record of tile 0 starts after 3 header + 4 edges + 4 table + 1 count words.
        let col2 = (3 + 4 + 4 + 1 + 2) * 4;
        LittleEndian::write_f32(&mut bytes[col2..col2 + 4], 42.5);
        let set = TileSet::decode(&bytes).unwrap();
        assert_eq!(set.encode(), bytes);
    }

    #[test]
    fn empty_set_is_valid() {
        let bytes = [0_u8, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0];
        let set = TileSet::decode(&bytes).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.encode(), bytes);
    }

    #[test]
    fn truncation_reports_section_and_tile() {
        let bytes = sample().encode();
        assert_eq!(
            TileSet::decode(&bytes[..6]),
            Err(DecodeError::UnexpectedEndOfData {
                section: Section::SubdivisionArity,
                tile: None,
            })
        );
        // Tile 1 ends with: point count, one 6-float record, sub-point count.
        let cut = |words: usize| TileSet::decode(&bytes[..bytes.len() - words * 4]);
        assert_eq!(
            TileSet::decode(&bytes[..bytes.len() - 2]),
            Err(DecodeError::UnexpectedEndOfData {
                section: Section::SubPointCount,
                tile: Some(1),
            })
        );
        assert_eq!(
            cut(7),
            Err(DecodeError::UnexpectedEndOfData {
                section: Section::Points,
                tile: Some(1),
            })
        );
        assert_eq!(
            cut(8),
            Err(DecodeError::UnexpectedEndOfData {
                section: Section::PointCount,
                tile: Some(1),
            })
        );
    }

    #[test]
    fn huge_counts_fail_without_allocating() {
        let mut bytes = vec![];
        for v in [1_u32, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, u32::MAX] {
            put_u32(&mut bytes, v);
        }
        assert!(matches!(
            TileSet::decode(&bytes),
            Err(DecodeError::UnexpectedEndOfData {
                section: Section::Points,
                ..
            })
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = sample().encode();
        bytes.extend_from_slice(&[0xAB; 7]);
        assert_eq!(TileSet::decode(&bytes).unwrap(), sample());
    }

    #[cfg(feature = "std")]
    #[test]
    fn reader_and_slice_agree() {
        let bytes = sample().encode();
        let from_reader = TileSet::read_from(&bytes[..]).unwrap();
        assert_eq!(from_reader, TileSet::decode(&bytes).unwrap());
        let mut out = std::vec::Vec::new();
        from_reader.write_to(&mut out).unwrap();
        assert_eq!(out, bytes);
        assert_eq!(
            TileSet::read_from(&bytes[..bytes.len() - 1]),
            Err(DecodeError::UnexpectedEndOfData {
                section: Section::SubPointCount,
                tile: Some(1),
            })
        );
    }
}
