use super::Runway;

/// Whether `b` is the far end of the strip whose near end is `a`.
///
/// Same airport, runway number rotated by 18 (wrapped into 1..=36), and a
/// compatible parallel suffix: `L`↔`R`, `C`↔`C`, none↔none.
pub fn runways_match(a: &Runway, b: &Runway) -> bool {
    if a.airport_id != b.airport_id {
        return false;
    }
    match (a.designator(), b.designator()) {
        (Some(da), Some(db)) => da.reciprocal() == db,
        _ => false,
    }
}

/// Pair runway ends into strips.
///
/// Returns only matched runways, both ends of each pair adjacent and
/// referencing each other through `opposing`. Runways with no partner are
/// dropped.
pub fn pair_runways(runways: Vec<Runway>) -> Vec<Runway> {
    let mut unmatched = runways;
    unmatched.reverse();
    let mut paired = Vec::with_capacity(unmatched.len());

    while let Some(mut near) = unmatched.pop() {
        let partner = unmatched
            .iter()
            .rposition(|candidate| runways_match(&near, candidate));
        match partner {
            Some(index) => {
                let mut far = unmatched.remove(index);
                near.opposing = Some(far.id());
                far.opposing = Some(near.id());
                paired.push(near);
                paired.push(far);
            }
            None => {
                log::debug!("Dropping unmatched runway {}", near.id());
            }
        }
    }

    paired
}
