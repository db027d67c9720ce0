use mongodb::bson::{Bson, Document};
use serde_json::{Map, Number, Value};

/// Convert a stored document into its public JSON shape.
///
/// ObjectIds render as hex strings and datetimes as RFC 3339, the way clients
/// see them from the document driver's own JSON encoding. Everything else
/// keeps its natural JSON form.
pub fn document_to_json(doc: &Document) -> Value {
    let mut obj = Map::with_capacity(doc.len());
    for (key, value) in doc {
        obj.insert(key.clone(), bson_to_json(value));
    }
    Value::Object(obj)
}

fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Document(inner) => document_to_json(inner),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        Bson::Null | Bson::Undefined => Value::Null,
        other => other.clone().into_relaxed_extjson(),
    }
}
