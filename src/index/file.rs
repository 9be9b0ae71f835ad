//! Binary index layout.
//!
//! ```text
//! file          := latitude_block*
//! latitude_block  := i32 len | i16 lat | longitude_block*
//! longitude_block := i32 len | i16 lng | node*
//! node            := i32 lat | i32 lng | u32 offset      (12 bytes)
//! ```
//!
//! All integers are little-endian. Each `len` counts the bytes following the
//! length field itself, so a reader can skip a whole block with one seek.

use super::{Index, IndexNode};
use crate::error::{Result, SynvisError};
use bytes::{BufMut, BytesMut};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

const LEN_FIELD: usize = 4;
const BUCKET_FIELD: usize = 2;

impl Index {
    /// Serialize the index, one latitude block at a time.
    ///
    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64> {
        let mut scratch = BytesMut::new();
        let mut written = 0u64;

        for latitude in self.latitudes() {
            let body_len = BUCKET_FIELD
                + latitude
                    .longitudes
                    .iter()
                    .map(|l| LEN_FIELD + BUCKET_FIELD + l.nodes.len() * IndexNode::SIZE)
                    .sum::<usize>();

            scratch.clear();
            scratch.reserve(LEN_FIELD + body_len);
            scratch.put_i32_le(block_len(body_len)?);
            scratch.put_i16_le(latitude.bucket);

            for longitude in &latitude.longitudes {
                let sub_len = BUCKET_FIELD + longitude.nodes.len() * IndexNode::SIZE;
                scratch.put_i32_le(block_len(sub_len)?);
                scratch.put_i16_le(longitude.bucket);
                for node in &longitude.nodes {
                    node.encode(&mut scratch);
                }
            }

            writer.write_all(&scratch)?;
            written += scratch.len() as u64;
        }

        Ok(written)
    }
}

fn block_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| SynvisError::OffsetOverflow(len as u64))
}

/// Reads bucket ranges straight out of an index file.
///
/// The underlying handle stays open for the reader's lifetime; each query
/// rewinds and scans the latitude blocks in file order, seeking past the
/// blocks it does not need.
pub struct IndexReader<R> {
    inner: R,
}

impl IndexReader<BufReader<File>> {
    /// Open an index file. The handle is kept for every later query.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SynvisError::IndexOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> IndexReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// All nodes in the bucket nearest to `(lat, lng)`.
    ///
    /// A truncated file is not fatal: whatever was read before the damage is
    /// returned.
    pub fn find_nodes(&mut self, lat: f64, lng: f64) -> Result<Vec<IndexNode>> {
        let target_lat = lat.round() as i16;
        let target_lng = lng.round() as i16;
        self.find_bucket(target_lat, target_lng)
    }

    /// All nodes stored under exactly `(lat, lng)`.
    pub fn find_bucket(&mut self, lat: i16, lng: i16) -> Result<Vec<IndexNode>> {
        self.inner.seek(SeekFrom::Start(0))?;
        let mut found = Vec::new();
        match self.scan(lat, lng, &mut found) {
            Ok(()) => Ok(found),
            Err(SynvisError::IndexCorrupt) => {
                log::warn!(
                    "Index file ended mid-block while looking up ({}, {}); returning {} nodes",
                    lat,
                    lng,
                    found.len()
                );
                Ok(found)
            }
            Err(e) => Err(e),
        }
    }

    fn scan(&mut self, lat: i16, lng: i16, found: &mut Vec<IndexNode>) -> Result<()> {
        loop {
            let Some(block_len) = self.read_block_len()? else {
                return Ok(());
            };
            let bucket = self.read_i16()?;
            let remaining = block_len - BUCKET_FIELD as i64;

            if bucket < lat {
                self.inner.seek_relative(remaining)?;
                continue;
            }
            if bucket > lat {
                return Ok(());
            }
            return self.scan_longitudes(remaining, lng, found);
        }
    }

    fn scan_longitudes(
        &mut self,
        mut remaining: i64,
        lng: i16,
        found: &mut Vec<IndexNode>,
    ) -> Result<()> {
        while remaining > 0 {
            let sub_len = self.read_len()?;
            let bucket = self.read_i16()?;
            remaining -= LEN_FIELD as i64 + sub_len;
            let body = sub_len - BUCKET_FIELD as i64;

            if bucket < lng {
                self.inner.seek_relative(body)?;
                continue;
            }
            if bucket > lng {
                return Ok(());
            }
            return self.read_nodes(body as usize, found);
        }
        Ok(())
    }

    fn read_nodes(&mut self, len: usize, found: &mut Vec<IndexNode>) -> Result<()> {
        let mut body = Vec::with_capacity(len);
        (&mut self.inner).take(len as u64).read_to_end(&mut body)?;

        let mut cursor = body.as_slice();
        while let Some(node) = IndexNode::decode(&mut cursor) {
            found.push(node);
        }
        if body.len() < len || len % IndexNode::SIZE != 0 {
            return Err(SynvisError::IndexCorrupt);
        }
        Ok(())
    }

    /// Length prefix of the next latitude block, or `None` at a clean end of
    /// file.
    fn read_block_len(&mut self) -> Result<Option<i64>> {
        let mut buf = [0u8; LEN_FIELD];
        let mut filled = 0;
        while filled < LEN_FIELD {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => return Err(SynvisError::IndexCorrupt),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        checked_len(i32::from_le_bytes(buf)).map(Some)
    }

    fn read_len(&mut self) -> Result<i64> {
        let mut buf = [0u8; LEN_FIELD];
        self.read_exact(&mut buf)?;
        checked_len(i32::from_le_bytes(buf))
    }

    fn read_i16(&mut self) -> Result<i16> {
        let mut buf = [0u8; BUCKET_FIELD];
        self.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => SynvisError::IndexCorrupt,
            _ => SynvisError::from(e),
        })
    }
}

/// A block must at least hold its bucket id.
fn checked_len(len: i32) -> Result<i64> {
    if (len as i64) < BUCKET_FIELD as i64 {
        return Err(SynvisError::IndexCorrupt);
    }
    Ok(len as i64)
}
