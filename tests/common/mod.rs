//! Fixed-column line builders shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A 132-column blank line with `fields` written at their offsets.
pub fn line(fields: &[(usize, &str)]) -> String {
    let mut bytes = vec![b' '; 132];
    for (start, text) in fields {
        bytes[*start..*start + text.len()].copy_from_slice(text.as_bytes());
    }
    String::from_utf8(bytes).unwrap()
}

pub fn airport(id: &str, lat: &str, lng: &str, name: &str) -> String {
    line(&[
        (0, "SUSAP"),
        (6, id),
        (10, "K1"),
        (12, "A"),
        (21, "0"),
        (32, lat),
        (41, lng),
        (51, "E0020"),
        (56, "00050"),
        (93, name),
    ])
}

pub fn runway(airport: &str, name: &str, bearing: &str, lat: &str, lng: &str) -> String {
    line(&[
        (0, "SUSAP"),
        (6, airport),
        (10, "K1"),
        (12, "G"),
        (13, name),
        (21, "1"),
        (22, "08000"),
        (27, bearing),
        (32, lat),
        (41, lng),
        (66, "00050"),
        (77, "150"),
    ])
}

pub fn navaid(id: &str, lat: &str, lng: &str, name: &str) -> String {
    line(&[
        (0, "SUSAD "),
        (13, id),
        (21, "1"),
        (32, lat),
        (41, lng),
        (74, "E0020"),
        (93, name),
    ])
}

/// One airport with its RW03/RW21 strip, all in cell (10, 10).
pub fn single_airport_db() -> Vec<String> {
    vec![
        airport("KAAA", "N10100000", "E010100000", "ALPHA FIELD"),
        runway("KAAA", "RW03", "0300", "N10095000", "E010095000"),
        runway("KAAA", "RW21", "2100", "N10110000", "E010110000"),
    ]
}

/// Write `lines` as a database file in `dir` and index it.
pub fn build_files(dir: &Path, lines: &[String]) -> (PathBuf, PathBuf) {
    let db_path = dir.join("navdata.dat");
    let index_path = dir.join("navdata.idx");
    std::fs::write(&db_path, lines.join("\n") + "\n").unwrap();
    synvis::index_db(&db_path, &index_path).unwrap();
    (db_path, index_path)
}
