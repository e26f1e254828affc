use crate::error::{HmsError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Geometry input keys, checked in this order.
pub const LATITUDE_KEY: &str = "latitude";
pub const LONGITUDE_KEY: &str = "longitude";
pub const STATION_ID_KEY: &str = "stationID";
pub const HUC_ID_KEY: &str = "hucID";

/// Body fields owned by [`Query`]; extra parameters may not shadow them.
pub const RESERVED_KEYS: [&str; 4] = ["source", "dateTimeSpan", "geometry", "temporalResolution"];

/// Raw geometry inputs keyed by `latitude`/`longitude`, `stationID` or `hucID`.
pub type GeometryInputs = BTreeMap<String, String>;

/// Time series start and end, passed through to HMS untouched.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeSpan {
    pub start_date: String,
    pub end_date: String,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

/// The spatial selector of a query. Exactly one variant is ever set, and it
/// serializes to the single matching key of the HMS geometry object.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Geometry {
    #[serde(rename = "point")]
    Point(Point),
    /// NCEI station identifier
    #[serde(rename = "stationID")]
    StationId(String),
    /// Stream/catchment identifier, supplied as `hucID`
    #[serde(rename = "comID")]
    ComId(i64),
}

impl Geometry {
    /// Pick the geometry variant from raw string inputs.
    ///
    /// `latitude` wins over `stationID`, which wins over `hucID`. Numbers are
    /// parsed from their string form; having none of the keys is an error.
    pub fn from_inputs(inputs: &GeometryInputs) -> Result<Geometry> {
        if let Some(latitude) = inputs.get(LATITUDE_KEY) {
            let longitude = inputs
                .get(LONGITUDE_KEY)
                .ok_or_else(|| HmsError::InvalidGeometry {
                    key: LONGITUDE_KEY,
                    value: String::new(),
                    expected: "number (required with latitude)",
                })?;
            return Ok(Geometry::Point(Point {
                latitude: parse_coordinate(LATITUDE_KEY, latitude)?,
                longitude: parse_coordinate(LONGITUDE_KEY, longitude)?,
            }));
        }
        if let Some(station_id) = inputs.get(STATION_ID_KEY) {
            return Ok(Geometry::StationId(station_id.clone()));
        }
        if let Some(huc_id) = inputs.get(HUC_ID_KEY) {
            return Ok(Geometry::ComId(parse_input(HUC_ID_KEY, huc_id, "integer")?));
        }
        Err(HmsError::MissingGeometry)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Point(p) => write!(f, "point ({}, {})", p.latitude, p.longitude),
            Geometry::StationId(id) => write!(f, "station {id}"),
            Geometry::ComId(id) => write!(f, "comID {id}"),
        }
    }
}

fn parse_input<T: FromStr>(key: &'static str, value: &str, expected: &'static str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| HmsError::InvalidGeometry {
            key,
            value: value.to_string(),
            expected,
        })
}

fn parse_coordinate(key: &'static str, value: &str) -> Result<f64> {
    let parsed: f64 = parse_input(key, value, "number")?;
    if !parsed.is_finite() {
        return Err(HmsError::InvalidGeometry {
            key,
            value: value.to_string(),
            expected: "finite number",
        });
    }
    Ok(parsed)
}

/// A single HMS data request.
///
/// `component` and `dataset` pick the endpoint and are left out of the
/// serialized body; everything else maps onto the documented JSON shape.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(skip)]
    pub component: String,
    #[serde(skip)]
    pub dataset: String,
    pub source: String,
    pub date_time_span: DateTimeSpan,
    pub geometry: Geometry,
    pub temporal_resolution: String,
    /// Dataset specific parameters such as `algorithm` or `albedo`
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Query {
    pub fn new(
        component: &str,
        dataset: &str,
        source: &str,
        start_date: &str,
        end_date: &str,
        geometry_inputs: &GeometryInputs,
        timestep: &str,
    ) -> Result<Query> {
        Ok(Query {
            component: component.to_string(),
            dataset: dataset.to_string(),
            source: source.to_string(),
            date_time_span: DateTimeSpan {
                start_date: start_date.to_string(),
                end_date: end_date.to_string(),
            },
            geometry: Geometry::from_inputs(geometry_inputs)?,
            temporal_resolution: timestep.to_string(),
            extra: BTreeMap::new(),
        })
    }

    /// Add a dataset specific string parameter to the body.
    pub fn with_param(mut self, key: &str, value: &str) -> Result<Query> {
        if RESERVED_KEYS.contains(&key) {
            return Err(HmsError::ReservedParameter(key.to_string()));
        }
        self.extra
            .insert(key.to_string(), Value::String(value.to_string()));
        Ok(self)
    }

    /// Build the POST body, optionally layered over a template object
    /// (the swagger example). Fields of the query always win.
    pub fn request_body(&self, template: Option<&Value>) -> Result<Value> {
        let body = serde_json::to_value(self)?;
        let Value::Object(fields) = body else {
            return Err(HmsError::InvalidFormat(
                "query did not serialize to a JSON object".to_string(),
            ));
        };
        let mut merged = match template {
            Some(Value::Object(t)) => t.clone(),
            Some(other) => {
                return Err(HmsError::InvalidFormat(format!(
                    "request template must be a JSON object, got {other}"
                )))
            }
            None => Map::new(),
        };
        for (key, value) in fields {
            merged.insert(key, value);
        }
        Ok(Value::Object(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs(pairs: &[(&str, &str)]) -> GeometryInputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample_query() -> Query {
        Query::new(
            "hydrology",
            "precipitation",
            "nldas",
            "2010-01-01",
            "2010-12-31",
            &inputs(&[("latitude", "33.325"), ("longitude", "-83.525")]),
            "daily",
        )
        .unwrap()
    }

    #[test]
    fn test_point_geometry() {
        let geometry =
            Geometry::from_inputs(&inputs(&[("latitude", "33.325"), ("longitude", "-83.525")]))
                .unwrap();
        assert_eq!(
            geometry,
            Geometry::Point(Point {
                latitude: 33.325,
                longitude: -83.525
            })
        );
    }

    #[test]
    fn test_point_wins_over_other_keys() {
        let geometry = Geometry::from_inputs(&inputs(&[
            ("hucID", "12"),
            ("stationID", "GHCND:USW00013874"),
            ("latitude", "1.5"),
            ("longitude", "2.5"),
        ]))
        .unwrap();
        assert!(matches!(geometry, Geometry::Point(_)));
    }

    #[test]
    fn test_station_wins_over_huc() {
        let geometry =
            Geometry::from_inputs(&inputs(&[("stationID", "GHCND:USW00013874"), ("hucID", "12")]))
                .unwrap();
        assert_eq!(
            geometry,
            Geometry::StationId("GHCND:USW00013874".to_string())
        );
    }

    #[test]
    fn test_huc_maps_to_com_id() {
        let geometry = Geometry::from_inputs(&inputs(&[("hucID", "6411690")])).unwrap();
        assert_eq!(geometry, Geometry::ComId(6411690));
        assert_eq!(
            serde_json::to_value(&geometry).unwrap(),
            json!({"comID": 6411690})
        );
    }

    #[test]
    fn test_missing_geometry_fails() {
        let err = Geometry::from_inputs(&inputs(&[("comID", "1")])).unwrap_err();
        assert!(matches!(err, HmsError::MissingGeometry));
    }

    #[test]
    fn test_latitude_without_longitude_fails() {
        let err = Geometry::from_inputs(&inputs(&[("latitude", "33.3")])).unwrap_err();
        assert!(matches!(
            err,
            HmsError::InvalidGeometry {
                key: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn test_unparseable_numbers_fail() {
        let err =
            Geometry::from_inputs(&inputs(&[("latitude", "north"), ("longitude", "1")])).unwrap_err();
        assert!(matches!(err, HmsError::InvalidGeometry { key: "latitude", .. }));

        let err = Geometry::from_inputs(&inputs(&[("hucID", "12.5")])).unwrap_err();
        assert!(matches!(err, HmsError::InvalidGeometry { key: "hucID", .. }));

        let err =
            Geometry::from_inputs(&inputs(&[("latitude", "NaN"), ("longitude", "1")])).unwrap_err();
        assert!(matches!(err, HmsError::InvalidGeometry { key: "latitude", .. }));
    }

    #[test]
    fn test_request_body_shape() {
        let body = sample_query().request_body(None).unwrap();
        assert_eq!(
            body,
            json!({
                "source": "nldas",
                "dateTimeSpan": {
                    "startDate": "2010-01-01",
                    "endDate": "2010-12-31"
                },
                "geometry": {
                    "point": {
                        "latitude": 33.325,
                        "longitude": -83.525
                    }
                },
                "temporalResolution": "daily"
            })
        );
    }

    #[test]
    fn test_station_body() {
        let query = Query::new(
            "meteorology",
            "precipitation",
            "ncei",
            "2015-01-01",
            "2015-01-31",
            &inputs(&[("stationID", "GHCND:USW00013874")]),
            "default",
        )
        .unwrap();
        let body = query.request_body(None).unwrap();
        assert_eq!(body["geometry"], json!({"stationID": "GHCND:USW00013874"}));
        assert!(body.get("component").is_none());
        assert!(body.get("dataset").is_none());
    }

    #[test]
    fn test_extra_params() {
        let query = sample_query()
            .with_param("algorithm", "penmandaily")
            .unwrap()
            .with_param("albedo", "0.23")
            .unwrap();
        let body = query.request_body(None).unwrap();
        assert_eq!(body["algorithm"], json!("penmandaily"));
        assert_eq!(body["albedo"], json!("0.23"));
        assert_eq!(body["source"], json!("nldas"));
    }

    #[test]
    fn test_reserved_param_rejected() {
        let err = sample_query().with_param("geometry", "x").unwrap_err();
        assert!(matches!(err, HmsError::ReservedParameter(k) if k == "geometry"));
    }

    #[test]
    fn test_template_merge() {
        let template = json!({
            "source": "daymet",
            "units": "metric",
            "geometry": {"comID": 1},
            "temporalResolution": "hourly"
        });
        let body = sample_query().request_body(Some(&template)).unwrap();
        assert_eq!(body["units"], json!("metric"));
        assert_eq!(body["source"], json!("nldas"));
        assert_eq!(body["temporalResolution"], json!("daily"));
        assert!(body["geometry"].get("comID").is_none());
    }

    #[test]
    fn test_template_must_be_object() {
        let err = sample_query()
            .request_body(Some(&json!(["not", "an", "object"])))
            .unwrap_err();
        assert!(matches!(err, HmsError::InvalidFormat(_)));
    }
}
