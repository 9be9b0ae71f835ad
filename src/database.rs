//! Record lookup through the index.
//!
//! [`NavDatabase`] keeps both the text database and its index open and turns
//! the offsets of one index bucket back into parsed records.

use crate::error::{Result, SynvisError};
use crate::index::{IndexNode, IndexReader};
use crate::records::{GeoObject, parse_record};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Anything that can hand out the records of one degree cell.
pub trait ObjectSource: Send {
    /// Records in the bucket nearest to `(lat, lng)`, in index order.
    fn find_objects(&mut self, lat: f64, lng: f64) -> Result<Vec<GeoObject>>;
}

pub struct NavDatabase<D = BufReader<File>, I = BufReader<File>> {
    records: D,
    index: IndexReader<I>,
    line: Vec<u8>,
}

impl NavDatabase {
    /// Open the database and its index. Either failing is fatal.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(db_path: P, index_path: Q) -> Result<Self> {
        let db_path = db_path.as_ref();
        let records = File::open(db_path).map_err(|source| SynvisError::DatabaseOpen {
            path: db_path.to_path_buf(),
            source,
        })?;
        let index = IndexReader::open(index_path)?;
        log::debug!("Opened navigation database {}", db_path.display());
        Ok(Self::new(BufReader::new(records), index))
    }
}

impl<D, I> NavDatabase<D, I>
where
    D: BufRead + Seek,
    I: std::io::Read + Seek,
{
    pub fn new(records: D, index: IndexReader<I>) -> Self {
        Self {
            records,
            index,
            line: Vec::with_capacity(256),
        }
    }

    /// Parse the record whose line starts at `offset`.
    ///
    /// `Ok(None)` for lines that carry nothing the engine uses.
    pub fn read_record(&mut self, offset: u32) -> Result<Option<GeoObject>> {
        self.records.seek(SeekFrom::Start(u64::from(offset)))?;
        self.line.clear();
        self.records.read_until(b'\n', &mut self.line)?;
        let text = String::from_utf8_lossy(&self.line);
        parse_record(&text)
    }

    fn resolve(&mut self, nodes: &[IndexNode]) -> Result<Vec<GeoObject>> {
        let mut objects = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.read_record(node.offset) {
                Ok(Some(object)) => objects.push(object),
                Ok(None) => {}
                Err(SynvisError::Parse { line, reason }) => {
                    log::warn!(
                        "Skipping record at offset {}: {} ({})",
                        node.offset,
                        reason,
                        line
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(objects)
    }
}

impl<D, I> ObjectSource for NavDatabase<D, I>
where
    D: BufRead + Seek + Send,
    I: std::io::Read + Seek + Send,
{
    fn find_objects(&mut self, lat: f64, lng: f64) -> Result<Vec<GeoObject>> {
        let nodes = self.index.find_nodes(lat, lng)?;
        let objects = self.resolve(&nodes)?;
        log::debug!(
            "Bucket ({:.0}, {:.0}): {} index nodes, {} records",
            lat,
            lng,
            nodes.len(),
            objects.len()
        );
        Ok(objects)
    }
}
