//! JSON shapes exchanged with the search server.
//!
//! The server is loose about types: flags may be missing or null, `messages`
//! is an array on progress and a plain string on errors, and `results` comes
//! either keyed by store or as a flat list. Everything here decodes
//! leniently and normalizes into the core types right away.

use compare_core::{ProductEntry, ResultSet, ServerAck, StartReply, StatusReply};
use serde::Deserialize;
use serde_json::{Map, Value};

const DEFAULT_ERROR_TEXT: &str = "Search failed";

/// Body of poll, start, stop and save responses; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ReplyBody {
    #[serde(default)]
    messages: Option<Value>,
    #[serde(default)]
    results: Option<Value>,
    #[serde(default)]
    search_finished: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl ReplyBody {
    fn is_error(&self) -> bool {
        self.error.as_ref().is_some_and(truthy)
    }

    fn error_text(&self) -> String {
        self.messages
            .as_ref()
            .and_then(message_text)
            .unwrap_or_else(|| DEFAULT_ERROR_TEXT.to_string())
    }

    pub(crate) fn into_status(self) -> StatusReply {
        let error = self.is_error().then(|| self.error_text());
        StatusReply {
            messages: message_list(self.messages.as_ref()),
            results: self.results.and_then(ResultsPayload::from_value).map(ResultsPayload::normalize),
            finished: self.search_finished.as_ref().is_some_and(truthy),
            error,
        }
    }

    pub(crate) fn into_start_reply(self) -> StartReply {
        if self.is_error() {
            StartReply::Rejected {
                message: self.error_text(),
            }
        } else {
            StartReply::Accepted {
                messages: message_list(self.messages.as_ref()),
            }
        }
    }

    pub(crate) fn into_ack(self) -> ServerAck {
        if self.is_error() {
            ServerAck::Rejected {
                message: self.error_text(),
            }
        } else {
            ServerAck::Accepted {
                message: self.messages.as_ref().and_then(message_text),
            }
        }
    }
}

/// `results` as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResultsPayload {
    /// `{store: {product_id: product}}`
    ByStore(Map<String, Value>),
    /// `[{store, id?, title, link, currency, sale_price}]`
    List(Vec<Value>),
}

impl ResultsPayload {
    /// Null and scalar values carry no results.
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    pub fn normalize(self) -> ResultSet {
        let mut results = ResultSet::new();
        match self {
            ResultsPayload::ByStore(stores) => {
                for (store, products) in stores {
                    let slot = results.insert_store(store);
                    match products {
                        Value::Object(products) => {
                            for (product_id, product) in products {
                                slot.insert(product_id, product_entry(&product));
                            }
                        }
                        Value::Array(products) => {
                            for (index, product) in products.iter().enumerate() {
                                slot.insert(index.to_string(), product_entry(product));
                            }
                        }
                        _ => {}
                    }
                }
            }
            ResultsPayload::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    let Value::Object(fields) = item else {
                        continue;
                    };
                    let store = fields.get("store").and_then(value_text).unwrap_or_default();
                    let product_id = fields
                        .get("id")
                        .and_then(value_text)
                        .unwrap_or_else(|| index.to_string());
                    results.insert_product(store, product_id, product_entry(item));
                }
            }
        }
        results
    }
}

/// Inverse of [`ResultsPayload::ByStore`], used for save bodies.
pub fn results_to_json(results: &ResultSet) -> Value {
    let mut stores = Map::new();
    for (store, products) in results.stores() {
        let mut entries = Map::new();
        for (product_id, entry) in products {
            let mut fields = Map::new();
            for (key, value) in [
                ("title", &entry.title),
                ("link", &entry.link),
                ("currency", &entry.currency),
                ("sale_price", &entry.sale_price),
            ] {
                if let Some(value) = value {
                    fields.insert(key.to_string(), Value::String(value.clone()));
                }
            }
            entries.insert(product_id.clone(), Value::Object(fields));
        }
        stores.insert(store.to_string(), Value::Object(entries));
    }
    Value::Object(stores)
}

fn product_entry(product: &Value) -> ProductEntry {
    let field = |key: &str| product.get(key).and_then(value_text);
    ProductEntry {
        title: field("title"),
        link: field("link"),
        currency: field("currency"),
        sale_price: field("sale_price"),
    }
}

/// Text of a scalar: strings as-is, numbers and booleans in JSON form.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Only an array counts as a batch of new messages.
fn message_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
        _ => Vec::new(),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(value_text).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        other => value_text(other).filter(|text| !text.is_empty()),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn body(value: Value) -> ReplyBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn status_with_results_by_store() {
        let status = body(json!({
            "messages": ["a"],
            "results": {"store.example.com": {"p1": {
                "title": "Shoe", "link": "http://x", "currency": "$", "sale_price": "10"
            }}}
        }))
        .into_status();

        assert_eq!(status.messages, vec!["a".to_string()]);
        let results = status.results.unwrap();
        let products = results.store("store.example.com").unwrap();
        assert_eq!(
            products.get("p1"),
            Some(&ProductEntry {
                title: Some("Shoe".into()),
                link: Some("http://x".into()),
                currency: Some("$".into()),
                sale_price: Some("10".into()),
            })
        );
        assert!(!status.finished);
        assert_eq!(status.error, None);
    }

    #[test]
    fn error_status_carries_string_message() {
        let status = body(json!({"error": true, "messages": "bad input"})).into_status();
        assert_eq!(status.error.as_deref(), Some("bad input"));
        assert!(status.messages.is_empty());
    }

    #[test]
    fn non_array_messages_are_ignored() {
        let status = body(json!({"messages": "just text", "search_finished": true})).into_status();
        assert!(status.messages.is_empty());
        assert!(status.finished);
    }

    #[test]
    fn null_results_and_flags_are_absent() {
        let status = body(json!({"results": null, "search_finished": null, "error": false}))
            .into_status();
        assert_eq!(status.results, None);
        assert!(!status.finished);
        assert_eq!(status.error, None);
    }

    #[test]
    fn empty_results_object_is_an_empty_set() {
        let status = body(json!({"results": {}})).into_status();
        assert_eq!(status.results, Some(ResultSet::new()));
    }

    #[test]
    fn list_results_group_by_store() {
        let payload = ResultsPayload::from_value(json!([
            {"store": "a.example.com", "id": "1", "title": "Lamp", "link": "http://a/1", "sale_price": 12.5},
            {"store": "b.example.com", "title": "Desk", "link": "http://b/1"},
            {"store": "a.example.com", "id": 2, "title": "Bulb"},
            "garbage"
        ]))
        .unwrap();
        let results = payload.normalize();

        let stores: Vec<_> = results.stores().map(|(store, _)| store).collect();
        assert_eq!(stores, vec!["a.example.com", "b.example.com"]);
        let a = results.store("a.example.com").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("1").unwrap().sale_price.as_deref(), Some("12.5"));
        assert!(a.get("2").unwrap().link.is_none());
        assert!(results.store("b.example.com").unwrap().contains_key("1"));
    }

    #[test]
    fn scalar_results_carry_nothing() {
        assert_eq!(ResultsPayload::from_value(json!("x")), None);
        assert_eq!(ResultsPayload::from_value(Value::Null), None);
    }

    #[test]
    fn start_error_becomes_rejection() {
        let reply = body(json!({"error": true, "messages": "Too many searches running"}))
            .into_start_reply();
        assert_eq!(
            reply,
            StartReply::Rejected {
                message: "Too many searches running".into()
            }
        );
    }

    #[test]
    fn ack_without_message() {
        assert_eq!(
            body(json!({})).into_ack(),
            ServerAck::Accepted { message: None }
        );
        assert_eq!(
            body(json!({"error": true})).into_ack(),
            ServerAck::Rejected {
                message: DEFAULT_ERROR_TEXT.into()
            }
        );
    }

    #[test]
    fn results_json_keeps_present_fields_only() {
        let mut results = ResultSet::new();
        results.insert_product(
            "s.example.com",
            "p1",
            ProductEntry {
                title: Some("Shoe".into()),
                link: Some("http://x".into()),
                ..ProductEntry::default()
            },
        );
        assert_eq!(
            results_to_json(&results),
            json!({"s.example.com": {"p1": {"title": "Shoe", "link": "http://x"}}})
        );
    }
}
