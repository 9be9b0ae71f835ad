//! Build an index for a navigation database and look around one cell.
//!
//! ```text
//! cargo run --example build_index -- navdata.dat navdata.idx 47.45 -122.31
//! ```
//!
//! Without arguments a small synthetic database is written to a temporary
//! directory first.

use std::path::PathBuf;
use synvis::prelude::*;
use synvis::{NavDatabase, ObjectSource};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see detailed logs)
    env_logger::init();

    println!("=== synvis - Build Index ===\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let scratch = tempfile::tempdir()?;
    let (db_path, index_path, lat, lng): (PathBuf, PathBuf, f64, f64) = match args.as_slice() {
        [db, idx, lat, lng] => (db.into(), idx.into(), lat.parse()?, lng.parse()?),
        [] => {
            let db = scratch.path().join("navdata.dat");
            std::fs::write(&db, sample_database())?;
            (db, scratch.path().join("navdata.idx"), 47.45, -122.31)
        }
        _ => return Err("usage: build_index [DATABASE INDEX LAT LNG]".into()),
    };

    let stats = index_db(&db_path, &index_path)?;
    println!("1. Index");
    println!("--------");
    println!("   Lines scanned:     {}", stats.lines_scanned);
    println!("   Records indexed:   {}", stats.nodes_written);
    println!(
        "   Buckets:           {} latitude / {} longitude",
        stats.latitude_buckets, stats.longitude_buckets
    );
    println!("   Index size:        {} bytes\n", stats.bytes_written);

    println!("2. Records near ({}, {})", lat, lng);
    println!("------------------------");
    let mut db = NavDatabase::open(&db_path, &index_path)?;
    for object in db.find_objects(lat, lng)? {
        match object {
            GeoObject::Airport(a) => println!("   Airport {} {}", a.id, a.name),
            GeoObject::Runway(r) => println!("   Runway  {}", r.id()),
            GeoObject::Navaid(n) => println!("   Navaid  {} {}", n.id, n.name),
            GeoObject::RouteNode(r) => println!("   Route   {} #{}", r.route_id, r.sequence),
        }
    }
    println!();

    println!("3. View");
    println!("-------");
    let mut viewpoint = ViewpointBuilder::new()
        .database_path(&db_path)
        .index_path(&index_path)
        .build()?;
    viewpoint.initialize(lat, lng, 3000.0, 160.0)?;
    println!("   Cached cells:      {}", viewpoint.cache().cell_count());
    println!("   Runway strips:     {}", viewpoint.cache().runway_pairs().count());
    println!("   Ground elevation:  {:.0} ft", viewpoint.approx_elevation_ft());
    for (primary, opposite) in viewpoint.cache().runway_pairs() {
        match viewpoint.point2d(primary.location.y(), primary.location.x()) {
            Some(p) => println!(
                "   {} -> {} at ({:.0}, {:.0}) px",
                primary.id(),
                opposite.name,
                p.x,
                p.y
            ),
            None => println!("   {} -> {} not visible", primary.id(), opposite.name),
        }
    }

    Ok(())
}

fn sample_database() -> String {
    let line = |fields: &[(usize, &str)]| {
        let mut bytes = vec![b' '; 132];
        for (start, text) in fields {
            bytes[*start..*start + text.len()].copy_from_slice(text.as_bytes());
        }
        String::from_utf8_lossy(&bytes).into_owned()
    };
    let runway = |name: &str, bearing: &str, lat: &str, lng: &str| {
        line(&[
            (0, "SUSAP"),
            (6, "KSEA"),
            (10, "K1"),
            (12, "G"),
            (13, name),
            (21, "1"),
            (22, "11900"),
            (27, bearing),
            (32, lat),
            (41, lng),
            (66, "00432"),
            (77, "150"),
        ])
    };

    [
        line(&[
            (0, "SUSAP"),
            (6, "KSEA"),
            (10, "K1"),
            (12, "A"),
            (21, "0"),
            (32, "N47265960"),
            (41, "W122184130"),
            (51, "E0160"),
            (56, "00433"),
            (93, "SEATTLE-TACOMA INTL"),
        ]),
        runway("RW16L", "1622", "N47274765", "W122183823"),
        runway("RW34R", "3422", "N47255314", "W122181861"),
        line(&[
            (0, "SUSAD "),
            (13, "SEA"),
            (21, "1"),
            (32, "N47261988"),
            (41, "W122183835"),
            (74, "E0190"),
            (93, "SEATTLE"),
        ]),
    ]
    .join("\n")
        + "\n"
}
