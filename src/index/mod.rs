//! Two-level degree-bucket index over the navigation database.
//!
//! The index maps `(latitude degree, longitude degree)` buckets to byte
//! offsets of records in the text database. It is built once offline by
//! [`index_db`], written in a length-prefixed binary layout, and then queried
//! straight from disk by [`IndexReader::find_nodes`] without loading it.

mod build;
mod file;

pub use build::{IndexStats, index_db, location_buckets, scan_database};
pub use file::IndexReader;

use bytes::{Buf, BufMut};
use smallvec::SmallVec;

/// One indexed record: its bucket and where the record's line starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexNode {
    pub lat: i16,
    pub lng: i16,
    pub offset: u32,
}

impl IndexNode {
    /// Encoded size: `i32 lat, i32 lng, u32 offset`.
    pub const SIZE: usize = 12;

    pub fn new(lat: i16, lng: i16, offset: u32) -> Self {
        Self { lat, lng, offset }
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32_le(i32::from(self.lat));
        buf.put_i32_le(i32::from(self.lng));
        buf.put_u32_le(self.offset);
    }

    /// Decode one node. `None` if fewer than [`Self::SIZE`] bytes remain or
    /// a bucket is out of range.
    pub fn decode<B: Buf>(buf: &mut B) -> Option<Self> {
        if buf.remaining() < Self::SIZE {
            return None;
        }
        let lat = i16::try_from(buf.get_i32_le()).ok();
        let lng = i16::try_from(buf.get_i32_le()).ok();
        let offset = buf.get_u32_le();
        Some(Self {
            lat: lat?,
            lng: lng?,
            offset,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongitudeBucket {
    pub bucket: i16,
    /// Nodes in insertion order.
    pub nodes: SmallVec<[IndexNode; 4]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatitudeBucket {
    pub bucket: i16,
    /// Sorted ascending by `bucket`.
    pub longitudes: Vec<LongitudeBucket>,
}

/// In-memory form of the index, used while building.
///
/// Both levels are kept sorted by bucket on every insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    latitudes: Vec<LatitudeBucket>,
    len: usize,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: IndexNode) {
        let lat_pos = match self
            .latitudes
            .binary_search_by_key(&node.lat, |b| b.bucket)
        {
            Ok(pos) => pos,
            Err(pos) => {
                self.latitudes.insert(
                    pos,
                    LatitudeBucket {
                        bucket: node.lat,
                        longitudes: Vec::new(),
                    },
                );
                pos
            }
        };

        let longitudes = &mut self.latitudes[lat_pos].longitudes;
        let lng_pos = match longitudes.binary_search_by_key(&node.lng, |b| b.bucket) {
            Ok(pos) => pos,
            Err(pos) => {
                longitudes.insert(
                    pos,
                    LongitudeBucket {
                        bucket: node.lng,
                        nodes: SmallVec::new(),
                    },
                );
                pos
            }
        };

        longitudes[lng_pos].nodes.push(node);
        self.len += 1;
    }

    pub fn latitudes(&self) -> &[LatitudeBucket] {
        &self.latitudes
    }

    /// Nodes stored under one bucket pair, in insertion order.
    pub fn nodes(&self, lat: i16, lng: i16) -> &[IndexNode] {
        self.latitudes
            .binary_search_by_key(&lat, |b| b.bucket)
            .ok()
            .and_then(|i| {
                let longitudes = &self.latitudes[i].longitudes;
                longitudes
                    .binary_search_by_key(&lng, |b| b.bucket)
                    .ok()
                    .map(|j| longitudes[j].nodes.as_slice())
            })
            .unwrap_or(&[])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn longitude_bucket_count(&self) -> usize {
        self.latitudes.iter().map(|b| b.longitudes.len()).sum()
    }
}
