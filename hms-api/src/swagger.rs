//! Request examples published in the HMS swagger document.
//!
//! Every `POST /api/{component}/{dataset}` operation documents an example
//! body at `post.parameters[0].schema.example`. Seeding a request with it
//! picks up dataset specific fields the caller did not set.

use crate::error::{HmsError, Result};
use serde_json::Value;

/// JSON pointer to the example body of one component/dataset.
pub fn example_pointer(component: &str, dataset: &str) -> String {
    // '/' inside a pointer token is escaped as "~1"
    format!(
        "/paths/~1api~1{}~1{}/post/parameters/0/schema/example",
        escape_token(component),
        escape_token(dataset)
    )
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Pull the request example for `component`/`dataset` out of a swagger document.
pub fn extract_request_example(doc: &Value, component: &str, dataset: &str) -> Result<Value> {
    let pointer = example_pointer(component, dataset);
    match doc.pointer(&pointer) {
        Some(example @ Value::Object(_)) => Ok(example.clone()),
        Some(other) => Err(HmsError::InvalidFormat(format!(
            "swagger example for /api/{component}/{dataset} is not an object: {other}"
        ))),
        None => Err(HmsError::InvalidFormat(format!(
            "swagger document has no example for /api/{component}/{dataset}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn swagger_doc() -> Value {
        json!({
            "swagger": "2.0",
            "paths": {
                "/api/hydrology/precipitation": {
                    "post": {
                        "parameters": [{
                            "in": "body",
                            "schema": {
                                "example": {
                                    "source": "nldas",
                                    "dateTimeSpan": {
                                        "startDate": "2015-01-01T00:00:00",
                                        "endDate": "2015-12-31T00:00:00",
                                        "dateTimeFormat": "yyyy-MM-dd HH"
                                    },
                                    "geometry": {"point": {"latitude": 33.925, "longitude": -83.356}},
                                    "dataValueFormat": "E3",
                                    "temporalResolution": "default"
                                }
                            }
                        }]
                    }
                }
            }
        })
    }

    #[test]
    fn test_pointer_escapes_slashes() {
        assert_eq!(
            example_pointer("hydrology", "precipitation"),
            "/paths/~1api~1hydrology~1precipitation/post/parameters/0/schema/example"
        );
    }

    #[test]
    fn test_extract_request_example() {
        let example = extract_request_example(&swagger_doc(), "hydrology", "precipitation").unwrap();
        assert_eq!(example["dataValueFormat"], json!("E3"));
        assert_eq!(example["source"], json!("nldas"));
    }

    #[test]
    fn test_unknown_dataset() {
        let err = extract_request_example(&swagger_doc(), "hydrology", "soilmoisture").unwrap_err();
        assert!(matches!(err, HmsError::InvalidFormat(_)));
    }
}
