use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};

/// Geographic half of a country record. The upstream dataset nests
/// coordinates under `countryInfo` and omits them for a handful of
/// aggregate rows (cruise ships, "Diamond Princess" style entries).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
    /// Remaining `countryInfo` fields (iso codes, flag url) passed through.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// One row of the countries dataset. Only the fields the map consumes
/// are typed; everything else rides along in `extra` so the feature
/// properties keep the full original record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country: String,
    #[serde(default)]
    pub cases: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub recovered: u64,
    /// Last refresh time in epoch milliseconds. Absent or zero means unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<u64>,
    #[serde(rename = "countryInfo", default)]
    pub country_info: CountryInfo,
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl CountryRecord {
    /// Coordinates as (lon, lat), if the record carries both.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.country_info.long, self.country_info.lat) {
            (Some(lon), Some(lat)) => Some((lon, lat)),
            _ => None,
        }
    }
}

/// Build a GeoJSON feature collection from the fetched records: one Point
/// feature per country, positioned at `[long, lat]`, carrying the whole
/// source record as properties.
///
/// Records without usable coordinates are dropped here so every rendered
/// marker maps 1:1 to a positioned record.
pub fn to_feature_collection(records: &[CountryRecord]) -> FeatureCollection {
    let features = records
        .iter()
        .filter_map(|record| {
            let (lon, lat) = record.coordinates()?;
            let properties = match serde_json::to_value(record) {
                Ok(serde_json::Value::Object(map)) => Some(map),
                _ => None,
            };
            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
                id: None,
                properties,
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, lon: Option<f64>, lat: Option<f64>, cases: u64) -> CountryRecord {
        CountryRecord {
            country: country.to_string(),
            cases,
            deaths: 0,
            recovered: 0,
            updated: None,
            country_info: CountryInfo {
                lat,
                long: lon,
                extra: JsonObject::new(),
            },
            extra: JsonObject::new(),
        }
    }

    #[test]
    fn test_one_feature_per_record() {
        let records = vec![
            record("USA", Some(-95.7), Some(38.0), 100),
            record("France", Some(2.2), Some(46.2), 200),
            record("Japan", Some(138.3), Some(36.2), 300),
        ];
        let fc = to_feature_collection(&records);
        assert_eq!(fc.features.len(), 3);
    }

    #[test]
    fn test_geometry_is_lon_lat_order() {
        let records = vec![record("France", Some(2.2), Some(46.2), 1)];
        let fc = to_feature_collection(&records);
        let geometry = fc.features[0].geometry.as_ref().unwrap();
        match &geometry.value {
            Value::Point(coords) => assert_eq!(coords, &vec![2.2, 46.2]),
            other => panic!("expected point geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_records_without_coordinates_are_skipped() {
        let records = vec![
            record("USA", Some(-95.7), Some(38.0), 100),
            record("Diamond Princess", None, None, 700),
            record("MS Zaandam", Some(0.0), None, 9),
        ];
        let fc = to_feature_collection(&records);
        assert_eq!(fc.features.len(), 1);
    }

    #[test]
    fn test_properties_carry_full_record() {
        let raw = serde_json::json!({
            "country": "France",
            "cases": 200,
            "deaths": 10,
            "recovered": 50,
            "updated": 1584000000000u64,
            "countryInfo": { "lat": 46.2, "long": 2.2, "iso2": "FR" },
            "todayCases": 7
        });
        let record: CountryRecord = serde_json::from_value(raw).unwrap();
        let fc = to_feature_collection(&[record]);
        let props = fc.features[0].properties.as_ref().unwrap();

        assert_eq!(props["country"], "France");
        assert_eq!(props["deaths"], 10);
        // Untyped source fields survive the round trip.
        assert_eq!(props["todayCases"], 7);
        assert_eq!(props["countryInfo"]["iso2"], "FR");
    }

    #[test]
    fn test_empty_input_yields_empty_collection() {
        let fc = to_feature_collection(&[]);
        assert!(fc.features.is_empty());
    }
}
