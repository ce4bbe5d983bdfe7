//! Response envelopes for each feed endpoint
//!
//! Every endpoint wraps its payload in a single named field. Each envelope is
//! its own type so a shape mismatch surfaces as a decode error instead of an
//! empty view.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::FeedKind;

/// A response envelope that yields one feed payload
pub trait FeedSchema: DeserializeOwned {
    type Item: std::fmt::Debug + Clone + PartialEq + Serialize + Send + 'static;

    const KIND: FeedKind;

    /// Take the payload list out of the envelope
    fn into_payload(self) -> Vec<Self::Item>;
}

/// One person record as served by the people endpoint.
///
/// The record is kept exactly as received so it serializes back unchanged;
/// the dashboard reads its display fields through the accessors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Person(Value);

impl From<Value> for Person {
    fn from(record: Value) -> Self {
        Self(record)
    }
}

impl Person {
    /// A string field, or `None` when absent, `null`, empty or not a string
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Best name to show for this record
    pub fn name(&self) -> String {
        if let Some(name) = self.field("display_name") {
            return name.to_string();
        }

        let full = [self.field("first_name"), self.field("last_name")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }

        // Records from other backends may only carry a plain "name"
        self.field("name").unwrap_or("-").to_string()
    }

    pub fn email(&self) -> &str {
        self.field("email_address").unwrap_or("-")
    }

    pub fn title(&self) -> &str {
        self.field("title").unwrap_or("-")
    }
}

/// A character and how often it occurs, kept as the raw `{key, value}` record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyVal(Value);

impl From<Value> for KeyVal {
    fn from(record: Value) -> Self {
        Self(record)
    }
}

impl KeyVal {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut record = Map::new();
        record.insert("key".to_string(), Value::String(key.into()));
        record.insert("value".to_string(), value.into());
        Self(Value::Object(record))
    }

    pub fn key(&self) -> String {
        match self.0.get("key") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Numeric value for scaling; numeric strings are parsed, anything else is 0
    pub fn value(&self) -> f64 {
        match self.0.get("value") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// The value exactly as the server wrote it
    pub fn value_text(&self) -> String {
        match self.0.get("value") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// A present but `null` list decodes as empty; a missing field is still an error
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
pub struct PeopleResponse {
    // Older backends capitalised the field
    #[serde(alias = "People", deserialize_with = "null_as_empty")]
    pub people: Vec<Person>,
}

#[derive(Debug, Deserialize)]
pub struct FrequenciesResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub frequencies: Vec<KeyVal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatesResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub possible_duplicates: Vec<Value>,
}

impl FeedSchema for PeopleResponse {
    type Item = Person;
    const KIND: FeedKind = FeedKind::People;

    fn into_payload(self) -> Vec<Person> {
        self.people
    }
}

impl FeedSchema for FrequenciesResponse {
    type Item = KeyVal;
    const KIND: FeedKind = FeedKind::Frequencies;

    fn into_payload(self) -> Vec<KeyVal> {
        self.frequencies
    }
}

impl FeedSchema for DuplicatesResponse {
    type Item = Value;
    const KIND: FeedKind = FeedKind::Duplicates;

    fn into_payload(self) -> Vec<Value> {
        self.possible_duplicates
    }
}

/// Flatten one duplicate candidate into a single display line.
///
/// Groups of email strings are joined; anything else is shown as JSON.
pub fn describe_duplicate(candidate: &Value) -> String {
    match candidate {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Error envelope the backend sends with a non-success status
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Human readable message, preferring the detailed error text
    pub fn message(&self) -> Option<String> {
        let text = match (self.status.as_deref(), self.error.as_deref()) {
            (Some(status), Some(error)) => format!("{}: {}", status, error),
            (Some(status), None) => status.to_string(),
            (None, Some(error)) => error.to_string(),
            (None, None) => return None,
        };
        match self.code {
            Some(code) => Some(format!("{} (code {})", text, code)),
            None => Some(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_people_payload_is_unchanged() {
        let body = json!({"people": [{"name": "Ann"}]});
        let resp: PeopleResponse = serde_json::from_value(body).unwrap();
        let payload = resp.into_payload();

        assert_eq!(payload.len(), 1);
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!([{"name": "Ann"}]));
        assert_eq!(payload[0].name(), "Ann");
    }

    #[test]
    fn test_people_accepts_capitalised_field() {
        let body = json!({"People": [{"id": 7, "display_name": "Bo", "email_address": "bo@x.io"}]});
        let resp: PeopleResponse = serde_json::from_value(body).unwrap();
        let payload = resp.into_payload();

        assert_eq!(payload[0].name(), "Bo");
        assert_eq!(payload[0].email(), "bo@x.io");
        assert_eq!(payload[0].title(), "-");
    }

    #[test]
    fn test_people_keep_null_fields_and_any_id() {
        let records = json!([
            {"id": 1, "display_name": "Ann", "title": null},
            {"id": "abc", "name": "Bo"}
        ]);
        let resp: PeopleResponse = serde_json::from_value(json!({"people": records.clone()})).unwrap();
        let payload = resp.into_payload();

        assert_eq!(serde_json::to_value(&payload).unwrap(), records);
        assert_eq!(payload[0].title(), "-");
        assert_eq!(payload[1].name(), "Bo");
    }

    #[test]
    fn test_person_name_falls_back_to_first_last() {
        let person = Person::from(json!({"first_name": "Dan", "last_name": "Test", "display_name": ""}));
        assert_eq!(person.name(), "Dan Test");
        assert_eq!(Person::default().name(), "-");
        assert_eq!(Person::from(json!("not a record")).email(), "-");
    }

    #[test]
    fn test_null_frequencies_is_empty() {
        let resp: FrequenciesResponse =
            serde_json::from_value(json!({"frequencies": null})).unwrap();
        assert!(resp.into_payload().is_empty());
    }

    #[test]
    fn test_frequencies_keep_response_order() {
        let body = json!({"frequencies": [{"key": "a", "value": 4}, {"key": "b", "value": 3}]});
        let resp: FrequenciesResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.into_payload(), vec![KeyVal::new("a", 4), KeyVal::new("b", 3)]);
    }

    #[test]
    fn test_frequencies_serialize_back_unchanged() {
        let records = json!([{"key": "a", "value": 4}, {"key": "b", "value": 2.5, "rank": 2}]);
        let resp: FrequenciesResponse =
            serde_json::from_value(json!({"frequencies": records.clone()})).unwrap();
        let payload = resp.into_payload();

        assert_eq!(serde_json::to_value(&payload).unwrap(), records);
        assert_eq!(payload[0].value(), 4.0);
        assert_eq!(payload[0].value_text(), "4");
        assert_eq!(payload[1].value_text(), "2.5");
    }

    #[test]
    fn test_keyval_accessors_tolerate_odd_shapes() {
        let kv = KeyVal::from(json!({"key": 7, "value": "12"}));
        assert_eq!(kv.key(), "7");
        assert_eq!(kv.value(), 12.0);
        assert_eq!(KeyVal::from(json!({"key": "x"})).value(), 0.0);
    }

    #[test]
    fn test_missing_field_fails_to_decode() {
        let result: Result<DuplicatesResponse, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_field_type_fails_to_decode() {
        let result: Result<FrequenciesResponse, _> =
            serde_json::from_value(json!({"frequencies": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_duplicate() {
        assert_eq!(
            describe_duplicate(&json!(["dan@test.com", "dann@test.com"])),
            "dan@test.com, dann@test.com"
        );
        assert_eq!(describe_duplicate(&json!("solo@test.com")), "solo@test.com");
        assert_eq!(describe_duplicate(&json!({"id": 1})), r#"{"id":1}"#);
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_value(json!({
            "status": "Error listing people from SalesLoft API.",
            "error": "connection refused"
        }))
        .unwrap();
        assert_eq!(
            body.message().as_deref(),
            Some("Error listing people from SalesLoft API.: connection refused")
        );
    }
}
