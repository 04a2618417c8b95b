// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte sources the tile-set decoder reads from.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::SourceError;

/// Sequential little-endian source of tile-set data.
///
/// Reads either fill the whole destination or fail; a short read reports
/// [`SourceError::Eof`].
pub trait TileSource {
    /// Fill `dst` with the next `dst.len()` little-endian `u32` values.
    fn read_u32_into(&mut self, dst: &mut [u32]) -> Result<(), SourceError>;

    /// Fill `dst` with the next `dst.len()` little-endian `f32` values.
    fn read_f32_into(&mut self, dst: &mut [f32]) -> Result<(), SourceError>;

    /// Read a single little-endian `u32`.
    fn read_u32(&mut self) -> Result<u32, SourceError> {
        let mut v = [0_u32];
        self.read_u32_into(&mut v)?;
        Ok(v[0])
    }
}

/// In-memory source over a byte slice.
#[derive(Clone, Debug)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> SliceSource<'a> {
    /// Start reading at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SourceError> {
        let rest = self.remaining();
        if rest.len() < n {
            return Err(SourceError::Eof);
        }
        self.offset += n;
        Ok(&rest[..n])
    }
}

impl TileSource for SliceSource<'_> {
    fn read_u32_into(&mut self, dst: &mut [u32]) -> Result<(), SourceError> {
        let n = dst.len().checked_mul(4).ok_or(SourceError::Eof)?;
        let src = self.take(n)?;
        LittleEndian::read_u32_into(src, dst);
        Ok(())
    }

    fn read_f32_into(&mut self, dst: &mut [f32]) -> Result<(), SourceError> {
        let n = dst.len().checked_mul(4).ok_or(SourceError::Eof)?;
        let src = self.take(n)?;
        LittleEndian::read_f32_into(src, dst);
        Ok(())
    }
}

/// Source over any [`std::io::Read`].
///
/// Reads are issued record by record, so wrap unbuffered readers such as
/// files in a [`std::io::BufReader`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> ReadSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "std")]
fn io_err(err: std::io::Error) -> SourceError {
    match err.kind() {
        std::io::ErrorKind::UnexpectedEof => SourceError::Eof,
        kind => SourceError::Io(kind),
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> TileSource for ReadSource<R> {
    fn read_u32_into(&mut self, dst: &mut [u32]) -> Result<(), SourceError> {
        use byteorder::ReadBytesExt;
        self.inner.read_u32_into::<LittleEndian>(dst).map_err(io_err)
    }

    fn read_f32_into(&mut self, dst: &mut [f32]) -> Result<(), SourceError> {
        use byteorder::ReadBytesExt;
        self.inner.read_f32_into::<LittleEndian>(dst).map_err(io_err)
    }
}
