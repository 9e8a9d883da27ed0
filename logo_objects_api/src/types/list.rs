use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a collection endpoint.
///
/// Fields other than `items` and `totalCount` are kept in `extra`, so the
/// body serialises back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> ListResponse<T> {
    /// `totalCount` when the server sent it, otherwise 0.
    pub fn count(&self) -> u64 {
        self.total_count.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn round_trips_unknown_fields() {
        let body = json!({
            "items": [{"CODE": "A"}],
            "totalCount": 1,
            "next": "/api/v1/items?offset=1"
        });
        let resp: ListResponse<Value> = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.count(), 1);
        assert_eq!(serde_json::to_value(&resp).unwrap(), body);
    }

    #[test]
    fn missing_total_count_counts_as_zero() {
        let resp: ListResponse<Value> = serde_json::from_value(json!({"items": []})).unwrap();
        assert_eq!(resp.total_count, None);
        assert_eq!(resp.count(), 0);
    }
}
