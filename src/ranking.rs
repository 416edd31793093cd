//! Ranking - live standings order and place formatting
//!
//! Standings are recomputed on a coarse cadence rather than every tick.
//! Progress decides the order; ties are broken by straight-line distance to
//! the next gate, and the caller's stable sort keeps dead heats in their
//! previous relative order.

use std::cmp::Ordering;

/// Total order over (progress key, distance-to-next-gate) pairs.
///
/// More progress ranks first; at equal progress the closer agent ranks
/// first. Equal pairs compare `Equal` and rely on sort stability.
pub fn compare_standing(key_a: u64, dist_a: f32, key_b: u64, dist_b: f32) -> Ordering {
    match key_b.cmp(&key_a) {
        Ordering::Equal => dist_a.partial_cmp(&dist_b).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

/// English ordinal for a 1-based place; 0 (unranked) renders empty.
pub fn place_string(place: u32) -> String {
    if place == 0 {
        return String::new();
    }
    if (11..=13).contains(&(place % 100)) {
        return format!("{place}th");
    }
    match place % 10 {
        1 => format!("{place}st"),
        2 => format!("{place}nd"),
        3 => format!("{place}rd"),
        _ => format!("{place}th"),
    }
}
