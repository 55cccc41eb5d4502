use serde::{Deserialize, Serialize};

/// One logged HTTP access.
///
/// The timestamp is supplied by the client that observed the access, so records carry
/// no ordering or uniqueness guarantee of their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: i64,
    pub domain: String,
    pub method: String,
    pub path: String,
    // Blobs written by the first deployment used `ipcountry`.
    #[serde(alias = "ipcountry")]
    pub country: String,
}

impl Record {
    pub fn new<D, M, P, C>(timestamp: i64, domain: D, method: M, path: P, country: C) -> Self
    where
        D: Into<String>,
        M: Into<String>,
        P: Into<String>,
        C: Into<String>,
    {
        Record {
            timestamp,
            domain: domain.into(),
            method: method.into(),
            path: path.into(),
            country: country.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let record = Record::new(1700000000, "example.com", "GET", "/", "DE");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "timestamp": 1700000000,
                "domain": "example.com",
                "method": "GET",
                "path": "/",
                "country": "DE",
            })
        );
    }

    #[test]
    fn test_legacy_ipcountry_field() {
        let json = r#"{"timestamp":5,"domain":"a","method":"GET","path":"/x","ipcountry":"US"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record, Record::new(5, "a", "GET", "/x", "US"));
    }
}
