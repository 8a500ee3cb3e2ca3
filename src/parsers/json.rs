use serde_json::Value;

use crate::parsers::text::{self, TextFormat};
use crate::record::{PortField, RawRecord};
use crate::validate::sanitize_label;

const IP_KEYS: &[&str] = &["ip", "address", "server", "host", "hostname", "domain"];
const PORT_KEYS: &[&str] = &[
    "port",
    "server_port",
    "p",
    "srv_port",
    "dstPort",
    "destinationPort",
];
const LABEL_KEYS: &[&str] = &[
    "label", "name", "remark", "tag", "loc", "location", "country", "note",
];

/// Extracts candidates from the JSON shapes seen in the wild: a bare array,
/// an object wrapping one under `list`/`items`/`proxies`, or a key-value
/// map whose values are the entries. String entries are re-parsed as loose
/// text.
pub fn parse(value: &Value) -> Vec<RawRecord> {
    let entries: Vec<&Value> = match value {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(map) => ["list", "items", "proxies"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(|arr| arr.iter().collect())
            .unwrap_or_else(|| map.values().collect()),
        _ => Vec::new(),
    };

    let mut records = Vec::new();
    for entry in entries {
        match entry {
            Value::String(s) => records.extend(text::parse(s, TextFormat::Loose)),
            Value::Object(map) => {
                let Some(ip) = first_text(map, IP_KEYS) else {
                    continue;
                };
                let label = first_text(map, LABEL_KEYS).unwrap_or_default();
                records.push(RawRecord {
                    ip,
                    port: PortField::Number(resolved_port(map)),
                    label: sanitize_label(&label),
                    country: None,
                });
            }
            _ => {}
        }
    }
    records
}

fn first_text(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        map.get(*k)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First non-zero port among the known keys; numeric strings are parsed.
/// Absent or unusable values fall back to 443.
fn resolved_port(map: &serde_json::Map<String, Value>) -> u32 {
    for key in PORT_KEYS {
        match map.get(*key) {
            Some(Value::Number(n)) => {
                let port = n.as_u64().unwrap_or(0);
                if port == 0 || port > u32::MAX as u64 {
                    continue;
                }
                return port as u32;
            }
            Some(Value::String(s)) if !s.is_empty() => {
                // a string that parses to 0 is as unusable as no port
                return match s.trim().parse() {
                    Ok(port) if port > 0 => port,
                    _ => 443,
                };
            }
            _ => continue,
        }
    }
    443
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrapped_items_with_aliased_fields() {
        let value = json!({"items": [{"host": "1.1.1.1", "port": "8443", "name": "X"}]});
        let records = parse(&value);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip, "1.1.1.1");
        assert_eq!(records[0].port.as_u32(), 8443);
        assert_eq!(records[0].label, "X");
    }

    #[test]
    fn bare_array_and_port_default() {
        let value = json!([{"address": "2.2.2.2"}, {"server": "3.3.3.3", "server_port": 2083}]);
        let records = parse(&value);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].port.as_u32(), 443);
        assert_eq!(records[1].port.as_u32(), 2083);
    }

    #[test]
    fn kv_map_values_are_entries() {
        let value = json!({
            "sg1": {"ip": "4.4.4.4", "port": 443, "remark": "[SG] one"},
            "sg2": {"ip": "5.5.5.5", "port": 443}
        });
        let mut records = parse(&value);
        records.sort_by(|a, b| a.ip.cmp(&b.ip));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "SG one");
        assert_eq!(records[1].label, "");
    }

    #[test]
    fn string_entries_reuse_the_loose_parser() {
        let value = json!(["6.6.6.6:8080 edge", 42, null]);
        let records = parse(&value);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip, "6.6.6.6");
        assert_eq!(records[0].port.as_u32(), 8080);
    }

    #[test]
    fn unusable_string_ports_default_to_443() {
        let value = json!([
            {"ip": "1.1.1.1", "port": "0"},
            {"ip": "2.2.2.2", "port": "junk"}
        ]);
        let records = parse(&value);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].port.as_u32(), 443);
        assert_eq!(records[1].port.as_u32(), 443);
    }

    #[test]
    fn entries_without_an_address_are_skipped() {
        let value = json!([{"port": 443, "name": "orphan"}]);
        assert!(parse(&value).is_empty());
    }

    #[test]
    fn scalar_top_level_yields_nothing() {
        assert!(parse(&json!("just text")).is_empty());
        assert!(parse(&json!(17)).is_empty());
    }
}
