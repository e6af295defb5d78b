use serde_json::Value;

use super::cell;

/// Headline figure of each report, most specific first.
const PRIORITY_KEYS: [&str; 7] = [
    "weighted_risk",
    "target_risk",
    "risk_score",
    "bucket_amount",
    "one_way_turnover",
    "currency_reference",
    "principal",
];

/// Print just the key answer value from the output.
///
/// Falls back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    println!("{}", cell(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, cell(val));
            }
        }
        Value::Array(items) => println!("{}", items.len()),
        _ => println!("{}", cell(result_obj)),
    }
}
