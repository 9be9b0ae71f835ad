use super::{Index, IndexNode};
use crate::error::{Result, SynvisError};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([NS])(\d{8})([EW])(\d{9})").expect("location pattern is valid")
});

/// Summary of an index build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub lines_scanned: usize,
    pub nodes_written: usize,
    pub latitude_buckets: usize,
    pub longitude_buckets: usize,
    pub bytes_written: u64,
}

/// Degree buckets of the first location on a line.
///
/// The degree digits are parsed as an integer and signed by the hemisphere
/// letter, so `S33...` lands in bucket -33 (truncation toward zero).
pub fn location_buckets(line: &[u8]) -> Option<(i16, i16)> {
    let caps = LOCATION.captures(line)?;
    let lat = degree_bucket(&caps[1], &caps[2][..2], b'S')?;
    let lng = degree_bucket(&caps[3], &caps[4][..3], b'W')?;
    Some((lat, lng))
}

fn degree_bucket(hemisphere: &[u8], digits: &[u8], negative: u8) -> Option<i16> {
    let value: i16 = std::str::from_utf8(digits).ok()?.parse().ok()?;
    Some(if hemisphere[0] == negative { -value } else { value })
}

/// Scan a whole database and index every line that carries a location.
pub fn scan_database<R: BufRead>(mut reader: R) -> Result<(Index, IndexStats)> {
    let mut index = Index::new();
    let mut stats = IndexStats::default();
    let mut line = Vec::with_capacity(256);
    let mut offset: u64 = 0;

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }
        stats.lines_scanned += 1;

        if let Some((lat, lng)) = location_buckets(&line) {
            let record_offset =
                u32::try_from(offset).map_err(|_| SynvisError::OffsetOverflow(offset))?;
            index.insert(IndexNode::new(lat, lng, record_offset));
        }
        offset += read as u64;
    }

    stats.nodes_written = index.len();
    stats.latitude_buckets = index.latitudes().len();
    stats.longitude_buckets = index.longitude_bucket_count();
    Ok((index, stats))
}

/// Build the binary index for `db_path` and write it to `index_path`.
///
/// The file is written next to its destination and renamed into place, so a
/// reader never sees a half-written index.
pub fn index_db<P: AsRef<Path>, Q: AsRef<Path>>(db_path: P, index_path: Q) -> Result<IndexStats> {
    let db_path = db_path.as_ref();
    let index_path = index_path.as_ref();

    let db = File::open(db_path).map_err(|source| SynvisError::DatabaseOpen {
        path: db_path.to_path_buf(),
        source,
    })?;
    let (index, mut stats) = scan_database(BufReader::new(db))?;

    let temp_path = temp_path(index_path);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    let mut writer = BufWriter::new(file);
    stats.bytes_written = index.write_to(&mut writer)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, index_path)?;

    log::info!(
        "Indexed {} records from {} lines into {} ({} latitude / {} longitude buckets, {} bytes)",
        stats.nodes_written,
        stats.lines_scanned,
        index_path.display(),
        stats.latitude_buckets,
        stats.longitude_buckets,
        stats.bytes_written
    );
    Ok(stats)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.to_path_buf();
    if let Some(name) = temp.file_name() {
        let mut new_name = name.to_string_lossy().into_owned();
        new_name.push_str(".tmp");
        temp.set_file_name(new_name);
    }
    temp
}
