//! Normalized footprint returned to renderers.

use serde::{Deserialize, Serialize};

use super::Height;

/// Exterior ring of the nearest building, centred on its centroid.
///
/// `coords` are metres in the projected frame; `center` is the geocoded
/// point as `[lat, lon]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub coords: Vec<[f64; 2]>,
    pub center: [f64; 2],
    pub levels: f64,
    pub height: Option<Height>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let footprint = Footprint {
            coords: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, -1.0]],
            center: [52.4, 16.9],
            levels: 5.0,
            height: None,
        };

        let value = serde_json::to_value(&footprint).unwrap();
        assert_eq!(
            value,
            json!({
                "coords": [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, -1.0]],
                "center": [52.4, 16.9],
                "levels": 5.0,
                "height": null
            })
        );
    }
}
