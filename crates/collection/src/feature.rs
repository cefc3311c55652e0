//! GeoJSON-shaped wire types for the remote feature collection.
//!
//! The core consumes this shape, it does not define it: unknown response
//! fields are ignored and `properties` passes through unmodified.

use foundation::LngLat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geometry carried by a feature.
///
/// Only `Point` is accepted; any other geometry type fails deserialization,
/// which rejects the whole page rather than applying it partially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    pub fn lng_lat(&self) -> LngLat {
        match self {
            Geometry::Point { coordinates } => LngLat::from_array(*coordinates),
        }
    }
}

/// One point of interest from the remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Opaque stable identifier; never changes after creation.
    pub id: String,
    pub geometry: Geometry,
    /// Open key/value payload, opaque to the core.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Bare point feature with empty properties, mainly for fixtures.
    pub fn point(id: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            geometry: Geometry::Point {
                coordinates: [lon, lat],
            },
            properties: Map::new(),
        }
    }

    pub fn lng_lat(&self) -> LngLat {
        self.geometry.lng_lat()
    }
}

/// One page of the paginated items response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturePage {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// Collection-level metadata, fetched without pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMeta {
    pub number_matched: u64,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{CollectionMeta, Feature, FeaturePage, Geometry};

    #[test]
    fn parses_point_feature_with_properties() {
        let json = r#"{
            "id": "658c",
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [100.5, 13.7] },
            "properties": { "name": "market", "rank": 3 }
        }"#;
        let f: Feature = serde_json::from_str(json).expect("parse");
        assert_eq!(f.id, "658c");
        assert_eq!(f.geometry, Geometry::Point { coordinates: [100.5, 13.7] });
        assert_eq!(f.properties["name"], "market");
        assert_eq!(f.properties["rank"], 3);
    }

    #[test]
    fn missing_properties_default_to_empty() {
        let json = r#"{ "id": "a", "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } }"#;
        let f: Feature = serde_json::from_str(json).expect("parse");
        assert!(f.properties.is_empty());
    }

    #[test]
    fn rejects_non_point_geometry() {
        let json = r#"{
            "id": "a",
            "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }
        }"#;
        assert!(serde_json::from_str::<Feature>(json).is_err());
    }

    #[test]
    fn rejects_missing_coordinates() {
        let json = r#"{ "id": "a", "geometry": { "type": "Point" } }"#;
        assert!(serde_json::from_str::<Feature>(json).is_err());
    }

    #[test]
    fn page_ignores_unknown_fields() {
        let json = r#"{
            "type": "FeatureCollection",
            "numberReturned": 1,
            "features": [
                { "id": "a", "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } }
            ]
        }"#;
        let page: FeaturePage = serde_json::from_str(json).expect("parse");
        assert_eq!(page.features.len(), 1);
        assert_eq!(page.features[0].lng_lat().to_array(), [1.0, 2.0]);
    }

    #[test]
    fn meta_uses_camel_case_matched_count() {
        let meta: CollectionMeta =
            serde_json::from_str(r#"{ "type": "FeatureCollection", "numberMatched": 1532 }"#)
                .expect("parse");
        assert_eq!(meta.number_matched, 1532);
    }
}
