use chrono::NaiveDateTime;
use serde_json::{json, Value};

use crate::errors::CoreError;
use crate::models::snapshot::SymbolSnapshot;
use crate::models::symbol::SymbolRecord;

/// Key of the timestamp object that leads the array.
pub const DATE_KEY: &str = "date";

/// Layout of the timestamp value, exchange-local time without offset.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize a snapshot to the `symbols-data.json` layout.
///
/// Layout:
/// ```text
/// [
///   {"date": "2024-03-01 17:45:02"},
///   {"symbol": "TLV", "weight": 19.5, "open_price": ..., ...},
///   ...
/// ]
/// ```
/// The date element is omitted when the snapshot has no timestamp.
pub fn encode(snapshot: &SymbolSnapshot) -> Result<Vec<u8>, CoreError> {
    let mut items = Vec::with_capacity(snapshot.symbols.len() + 1);

    if let Some(updated_at) = snapshot.updated_at {
        items.push(json!({ DATE_KEY: updated_at.format(DATE_FORMAT).to_string() }));
    }
    for record in &snapshot.symbols {
        let value = serde_json::to_value(record)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize {}: {e}", record.symbol)))?;
        items.push(value);
    }

    serde_json::to_vec(&items)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))
}

/// Parse the `symbols-data.json` layout.
///
/// Files from older collectors have no leading date element; they load with
/// `updated_at = None`.
pub fn decode(data: &[u8]) -> Result<SymbolSnapshot, CoreError> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| CoreError::InvalidFileFormat(format!("Not valid JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(CoreError::InvalidFileFormat(
            "Expected a JSON array of symbols".into(),
        ));
    };

    let mut items = items.into_iter().peekable();

    let updated_at = match items.peek() {
        Some(Value::Object(map)) if map.contains_key(DATE_KEY) && !map.contains_key("symbol") => {
            let raw = map.get(DATE_KEY).and_then(Value::as_str).unwrap_or_default();
            let parsed = parse_date(raw)?;
            items.next();
            Some(parsed)
        }
        _ => None,
    };

    let symbols = items
        .map(serde_json::from_value::<SymbolRecord>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SymbolSnapshot { updated_at, symbols })
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, ignoring any trailing fraction or offset.
fn parse_date(raw: &str) -> Result<NaiveDateTime, CoreError> {
    raw.get(..19)
        .and_then(|head| NaiveDateTime::parse_from_str(head, DATE_FORMAT).ok())
        .ok_or_else(|| CoreError::InvalidFileFormat(format!("Invalid snapshot date: {raw:?}")))
}
