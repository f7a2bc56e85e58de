use crate::model::bar::{finite_bounds, Bar};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub support: f64,
    pub resistance: f64,
}

/// Support is the lowest `low`, resistance the highest `high`. NaN cells are ignored.
pub fn support_resistance(bars: &[Bar]) -> Option<Levels> {
    let (support, _) = finite_bounds(bars.iter().map(|b| b.low))?;
    let (_, resistance) = finite_bounds(bars.iter().map(|b| b.high))?;
    Some(Levels {
        support,
        resistance,
    })
}
