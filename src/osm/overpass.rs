//! Building footprint download from the Overpass API.

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use hashbrown::HashMap;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{FootprintError, Result, Upstream};
use crate::geometry::merge_rings_to_polygons;
use crate::models::{BuildingGeometry, BuildingRecord, Height, OsmType};

/// Fetches buildings around a point from an Overpass interpreter endpoint
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    /// Set when the query failed server-side (timeout, memory) despite HTTP 200
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    member_type: String,
    #[serde(rename = "ref")]
    member_ref: i64,
    #[serde(default)]
    role: String,
}

impl OverpassClient {
    pub fn new(client: Client, url: &str, timeout: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout,
        }
    }

    /// Fetch every building way and relation within `radius_m` of a lon/lat point
    pub async fn buildings_around(&self, point: Point<f64>, radius_m: f64) -> Result<Vec<BuildingRecord>> {
        let query = building_query(point, radius_m, self.timeout);
        debug!("Overpass query: {}", query);

        let response = self
            .client
            .post(&self.url)
            .body(query)
            .send()
            .await
            .map_err(|e| FootprintError::upstream(Upstream::Overpass, e))?;

        if !response.status().is_success() {
            return Err(FootprintError::upstream(
                Upstream::Overpass,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FootprintError::upstream(Upstream::Overpass, e))?;

        let records = parse_buildings(&body)?;
        info!(
            "Fetched {} buildings within {} m of ({}, {})",
            records.len(),
            radius_m,
            point.y(),
            point.x()
        );
        Ok(records)
    }
}

/// Overpass QL for building ways and relations around a point.
///
/// `>` recurses down to member ways and nodes so geometry can be resolved
/// from a single response.
pub fn building_query(point: Point<f64>, radius_m: f64, timeout: Duration) -> String {
    let (lat, lon) = (point.y(), point.x());
    format!(
        "[out:json][timeout:{timeout}];\n\
         (\n  \
           way[\"building\"](around:{radius},{lat},{lon});\n  \
           relation[\"building\"](around:{radius},{lat},{lon});\n\
         );\n\
         out body;\n\
         >;\n\
         out skel qt;",
        timeout = timeout.as_secs(),
        radius = radius_m,
    )
}

/// Parse an Overpass JSON response into building records, in response order
pub fn parse_buildings(body: &str) -> Result<Vec<BuildingRecord>> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| FootprintError::upstream(Upstream::Overpass, e))?;

    if let Some(remark) = &response.remark {
        if remark.starts_with("runtime error") || response.elements.is_empty() {
            return Err(FootprintError::upstream(Upstream::Overpass, remark));
        }
        warn!("Overpass remark: {}", remark);
    }

    let mut nodes: HashMap<i64, Coord<f64>> = HashMap::new();
    let mut ways: HashMap<i64, &[i64]> = HashMap::new();

    for element in &response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                nodes.insert(*id, Coord { x: *lon, y: *lat });
            }
            Element::Way { id, nodes: refs, .. } => {
                // Tagged copies and skeleton copies of a way list the same nodes
                ways.entry(*id).or_insert(refs.as_slice());
            }
            Element::Relation { .. } => {}
        }
    }

    let mut records = Vec::new();

    for element in &response.elements {
        match element {
            Element::Way { id, nodes: refs, tags } if tags.contains_key("building") => {
                let geometry = way_geometry(refs, &nodes);
                records.push(with_attributes(
                    BuildingRecord::new(OsmType::Way, *id, geometry),
                    tags,
                ));
            }
            Element::Relation { id, members, tags } if tags.contains_key("building") => {
                if tags.get("type").map(String::as_str) != Some("multipolygon") {
                    debug!("Skipping building relation {} without multipolygon type", id);
                    continue;
                }
                let geometry = relation_geometry(members, &ways, &nodes);
                if !geometry.is_polygonal() {
                    warn!("Could not assemble outline of building relation {}", id);
                }
                records.push(with_attributes(
                    BuildingRecord::new(OsmType::Relation, *id, geometry),
                    tags,
                ));
            }
            _ => {}
        }
    }

    Ok(records)
}

fn resolve(refs: &[i64], nodes: &HashMap<i64, Coord<f64>>) -> Vec<Coord<f64>> {
    refs.iter().filter_map(|id| nodes.get(id).copied()).collect()
}

fn way_geometry(refs: &[i64], nodes: &HashMap<i64, Coord<f64>>) -> BuildingGeometry {
    let coords = resolve(refs, nodes);
    let closed = refs.len() >= 4 && refs.first() == refs.last();

    if closed && coords.len() >= 4 {
        BuildingGeometry::Polygon(Polygon::new(LineString::new(coords), vec![]))
    } else {
        BuildingGeometry::LineString(LineString::new(coords))
    }
}

/// Outer rings of a multipolygon relation; inner rings are not needed downstream
fn relation_geometry(
    members: &[Member],
    ways: &HashMap<i64, &[i64]>,
    nodes: &HashMap<i64, Coord<f64>>,
) -> BuildingGeometry {
    let segments: Vec<Vec<Coord<f64>>> = members
        .iter()
        .filter(|m| m.member_type == "way" && (m.role == "outer" || m.role.is_empty()))
        .filter_map(|m| ways.get(&m.member_ref))
        .map(|refs| resolve(refs, nodes))
        .collect();

    let mut polygons = merge_rings_to_polygons(segments);
    match polygons.len() {
        0 => BuildingGeometry::LineString(LineString::new(vec![])),
        1 => BuildingGeometry::Polygon(polygons.remove(0)),
        _ => BuildingGeometry::MultiPolygon(MultiPolygon::new(polygons)),
    }
}

fn with_attributes(mut record: BuildingRecord, tags: &HashMap<String, String>) -> BuildingRecord {
    record.levels = tags.get("building:levels").cloned();
    record.height = tags.get("height").map(|h| Height::from_tag(h));
    record
}
