use crate::database::ObjectSource;
use crate::error::Result;
use crate::records::{Airport, GeoObject, Navaid, Runway, pair_runways};
use rustc_hash::FxHashMap;

/// Integer degree cell, the same bucket the index is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub lat: i16,
    pub lng: i16,
}

impl CellKey {
    pub const fn new(lat: i16, lng: i16) -> Self {
        Self { lat, lng }
    }

    /// Cell nearest to a position.
    pub fn nearest(lat: f64, lng: f64) -> Self {
        Self {
            lat: lat.round().clamp(-90.0, 90.0) as i16,
            lng: wrap_bucket(lng.round() as i32),
        }
    }

    /// The 3×3 block of cells centred on this one. Rows past a pole are left
    /// out; columns wrap across the antimeridian.
    pub fn window(&self) -> impl Iterator<Item = CellKey> + use<> {
        let center = *self;
        (-1..=1).flat_map(move |dlat| {
            let lat = center.lat as i32 + dlat;
            (-1..=1).filter_map(move |dlng| {
                if !(-90..=90).contains(&lat) {
                    return None;
                }
                Some(CellKey::new(
                    lat as i16,
                    wrap_bucket(center.lng as i32 + dlng),
                ))
            })
        })
    }

    pub fn in_window_of(&self, center: &CellKey) -> bool {
        center.window().any(|key| key == *self)
    }
}

/// Longitude bucket wrapped into `[-180, 180)`.
fn wrap_bucket(lng: i32) -> i16 {
    ((lng + 180).rem_euclid(360) - 180) as i16
}

/// Records of the cells around the viewer.
///
/// Raw records are stored per cell. Runways are additionally paired across
/// all loaded cells and kept as a separate set, rebuilt whenever cells come
/// or go.
#[derive(Debug, Default)]
pub struct ObjectCache {
    cells: FxHashMap<CellKey, Vec<GeoObject>>,
    paired: Vec<Runway>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every cell of the window around `center` that is not cached yet.
    ///
    /// Returns the number of cells loaded.
    pub fn ensure_window(&mut self, center: CellKey, source: &mut dyn ObjectSource) -> Result<usize> {
        let mut loaded = 0;
        let mut outcome = Ok(());
        for key in center.window() {
            if self.cells.contains_key(&key) {
                continue;
            }
            match source.find_objects(f64::from(key.lat), f64::from(key.lng)) {
                Ok(objects) => {
                    log::debug!(
                        "Cached cell ({}, {}) with {} records",
                        key.lat,
                        key.lng,
                        objects.len()
                    );
                    self.cells.insert(key, objects);
                    loaded += 1;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        if loaded > 0 {
            self.pair();
        }
        outcome.map(|()| loaded)
    }

    /// Drop every cell outside the window around `center`.
    ///
    /// Returns the number of cells dropped.
    pub fn collect_garbage(&mut self, center: CellKey) -> usize {
        let before = self.cells.len();
        self.cells.retain(|key, _| key.in_window_of(&center));
        let dropped = before - self.cells.len();
        if dropped > 0 {
            self.pair();
            log::debug!("Dropped {} cached cells", dropped);
        }
        dropped
    }

    pub fn contains_cell(&self, key: &CellKey) -> bool {
        self.cells.contains_key(key)
    }

    /// Loaded cells, sorted.
    pub fn cells(&self) -> Vec<CellKey> {
        let mut keys: Vec<_> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn objects(&self) -> impl Iterator<Item = &GeoObject> {
        self.cells.values().flatten()
    }

    pub fn airports(&self) -> impl Iterator<Item = &Airport> {
        self.objects().filter_map(|o| match o {
            GeoObject::Airport(a) => Some(a),
            _ => None,
        })
    }

    pub fn navaids(&self) -> impl Iterator<Item = &Navaid> {
        self.objects().filter_map(|o| match o {
            GeoObject::Navaid(n) => Some(n),
            _ => None,
        })
    }

    /// Paired runway ends. Runways without a partner are not here.
    pub fn runways(&self) -> &[Runway] {
        &self.paired
    }

    /// Each strip once, as `(primary, opposite)`.
    pub fn runway_pairs(&self) -> impl Iterator<Item = (&Runway, &Runway)> {
        self.paired.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    fn pair(&mut self) {
        // Walk cells in key order so pairing is deterministic.
        let runways: Vec<Runway> = self
            .cells()
            .into_iter()
            .flat_map(|key| self.cells[&key].iter())
            .filter_map(GeoObject::as_runway)
            .cloned()
            .collect();
        self.paired = pair_runways(runways);
    }
}
