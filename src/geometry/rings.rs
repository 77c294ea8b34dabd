//! Ring assembly for multipolygon relations.
//!
//! A building relation's outline is often split across several ways that
//! share end nodes. This joins the pieces back into closed rings.

use geo::{Coord, LineString, Polygon};

/// Minimum coordinates in a closed ring (3 distinct + closing)
const MIN_RING_LEN: usize = 4;

/// Join way segments end to end into closed polygons.
///
/// Segments may arrive in any order and direction. Chains that cannot be
/// closed into a valid ring are dropped.
pub fn merge_rings_to_polygons(segments: Vec<Vec<Coord<f64>>>) -> Vec<Polygon<f64>> {
    let mut polygons = Vec::new();
    let mut pending: Vec<Vec<Coord<f64>>> = segments.into_iter().filter(|s| s.len() >= 2).collect();
    pending.reverse();

    while let Some(mut chain) = pending.pop() {
        while !ends_meet(&chain) {
            let Some(idx) = pending.iter().position(|s| joins(&chain, s)) else {
                break;
            };
            let segment = pending.remove(idx);
            attach(&mut chain, segment);
        }

        if let Some(polygon) = close_ring(chain) {
            polygons.push(polygon);
        }
    }

    polygons
}

/// Growth stops here even when the ring is too short to keep
fn ends_meet(chain: &[Coord<f64>]) -> bool {
    chain.len() >= 2 && chain.first() == chain.last()
}

fn joins(chain: &[Coord<f64>], segment: &[Coord<f64>]) -> bool {
    let ends = [chain.first(), chain.last()];
    ends.contains(&segment.first()) || ends.contains(&segment.last())
}

/// Append or prepend `segment`, flipping it so the shared node lines up
fn attach(chain: &mut Vec<Coord<f64>>, mut segment: Vec<Coord<f64>>) {
    let tail = chain.last().copied();
    let head = chain.first().copied();

    if tail == segment.first().copied() {
        chain.extend(segment.into_iter().skip(1));
    } else if tail == segment.last().copied() {
        segment.reverse();
        chain.extend(segment.into_iter().skip(1));
    } else if head == segment.last().copied() {
        segment.pop();
        segment.append(chain);
        *chain = segment;
    } else if head == segment.first().copied() {
        segment.reverse();
        segment.pop();
        segment.append(chain);
        *chain = segment;
    }
}

/// Only chains whose ends already meet become rings; a gap means a missing way
fn close_ring(chain: Vec<Coord<f64>>) -> Option<Polygon<f64>> {
    if chain.len() < MIN_RING_LEN || !ends_meet(&chain) {
        return None;
    }
    Some(Polygon::new(LineString::new(chain), vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_closed_way_is_one_ring() {
        let ring = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)];

        let polygons = merge_rings_to_polygons(vec![ring]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].unsigned_area(), 1.0);
    }

    #[test]
    fn test_split_outline_is_joined() {
        let s1 = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)];
        let s2 = vec![c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)];

        let polygons = merge_rings_to_polygons(vec![s2, s1]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].exterior().0.len(), 5);
    }

    #[test]
    fn test_reversed_segment_is_flipped() {
        let s1 = vec![c(0.0, 0.0), c(2.0, 0.0), c(2.0, 2.0)];
        // Runs backwards relative to s1
        let s2 = vec![c(0.0, 0.0), c(0.0, 2.0), c(2.0, 2.0)];

        let polygons = merge_rings_to_polygons(vec![s1, s2]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].unsigned_area(), 4.0);
    }

    #[test]
    fn test_three_way_outline() {
        let s1 = vec![c(0.0, 0.0), c(1.0, 0.0)];
        let s2 = vec![c(1.0, 1.0), c(0.0, 1.0), c(0.0, 0.0)];
        let s3 = vec![c(1.0, 0.0), c(1.0, 1.0)];

        let polygons = merge_rings_to_polygons(vec![s1, s2, s3]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].unsigned_area(), 1.0);
    }

    #[test]
    fn test_two_separate_rings() {
        let a = vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)];
        let b = vec![c(5.0, 5.0), c(6.0, 5.0), c(6.0, 6.0), c(5.0, 5.0)];

        let polygons = merge_rings_to_polygons(vec![a, b]);
        assert_eq!(polygons.len(), 2);
    }

    #[test]
    fn test_collapsed_ring_does_not_absorb_neighbour() {
        // Out-and-back pair closes on itself as [a, b, a]
        let out = vec![c(0.0, 0.0), c(1.0, 0.0)];
        let back = vec![c(1.0, 0.0), c(0.0, 0.0)];
        let ring = vec![c(0.0, 0.0), c(0.0, 2.0), c(2.0, 2.0), c(0.0, 0.0)];

        let polygons = merge_rings_to_polygons(vec![out, ring, back]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].exterior().0.len(), 4);
        assert_eq!(polygons[0].unsigned_area(), 2.0);
    }

    #[test]
    fn test_gap_is_dropped() {
        let s1 = vec![c(0.0, 0.0), c(1.0, 0.0)];
        let s2 = vec![c(1.0, 1.0), c(0.0, 1.0)];

        let polygons = merge_rings_to_polygons(vec![s1, s2]);
        assert!(polygons.is_empty());
    }
}
