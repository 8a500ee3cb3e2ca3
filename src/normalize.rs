use std::collections::HashSet;

use crate::record::{ProxyRecord, RawRecord};
use crate::validate::{is_valid_ipv4, is_valid_port, sanitize_label};

/// Validation gate and canonical ordering for candidate records. Invalid
/// and duplicate entries are dropped silently; the first occurrence of an
/// `(ip, port)` pair wins. Applied to parser output and client-submitted
/// selections alike, and idempotent over its own output.
pub fn normalize(raw: Vec<RawRecord>) -> Vec<ProxyRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for candidate in raw {
        let ip = candidate.ip.trim().to_string();
        let port = candidate.port.as_u32();
        if !is_valid_ipv4(&ip) || !is_valid_port(port) {
            continue;
        }
        if !seen.insert(format!("{}:{}", ip, port)) {
            continue;
        }
        records.push(ProxyRecord {
            ip,
            port: port as u16,
            label: sanitize_label(&candidate.label),
            country: candidate.country,
        });
    }

    records.sort_by(|a, b| {
        a.country
            .as_deref()
            .unwrap_or("")
            .cmp(b.country.as_deref().unwrap_or(""))
            .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
            .then_with(|| a.ip.cmp(&b.ip))
            .then_with(|| a.port.cmp(&b.port))
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_invalid_and_keeps_first_duplicate() {
        let raw = vec![
            RawRecord::new("1.2.3.4", 80, ""),
            RawRecord::new("1.2.3.4", 80, "dup"),
            RawRecord::new("256.1.1.1", 80, "bad ip"),
            RawRecord::new("9.9.9.9", 0, "bad port"),
        ];
        let records = normalize(raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key(), "1.2.3.4:80");
        assert_eq!(records[0].label, "");
    }

    #[test]
    fn trims_ips_and_resanitizes_labels() {
        let raw = vec![RawRecord::new(" 1.2.3.4 ", 443, " [SG]  node ")];
        let records = normalize(raw);
        assert_eq!(records[0].ip, "1.2.3.4");
        assert_eq!(records[0].label, "SG node");
    }

    #[test]
    fn sorts_by_label_then_ip_then_port() {
        let raw = vec![
            RawRecord::new("2.2.2.2", 443, "beta"),
            RawRecord::new("1.1.1.1", 8080, "Alpha"),
            RawRecord::new("1.1.1.1", 443, "alpha"),
            RawRecord::new("1.1.1.2", 443, "alpha"),
        ];
        let keys: Vec<String> = normalize(raw).iter().map(ProxyRecord::key).collect();
        assert_eq!(
            keys,
            vec!["1.1.1.1:443", "1.1.1.1:8080", "1.1.1.2:443", "2.2.2.2:443"]
        );
    }

    #[test]
    fn country_sorts_ahead_of_label() {
        let mut raw = vec![
            RawRecord::new("1.1.1.1", 443, "zz"),
            RawRecord::new("2.2.2.2", 443, "aa"),
        ];
        raw[0].country = Some("DE".to_string());
        raw[1].country = Some("SG".to_string());
        let records = normalize(raw);
        assert_eq!(records[0].country.as_deref(), Some("DE"));
        assert_eq!(records[1].country.as_deref(), Some("SG"));
    }

    #[test]
    fn is_idempotent() {
        let raw = vec![
            RawRecord::new("8.8.8.8", 443, "b"),
            RawRecord::new("1.1.1.1", 53, "a"),
            RawRecord::new("8.8.8.8", 443, "c"),
        ];
        let once = normalize(raw);
        let twice = normalize(once.iter().cloned().map(RawRecord::from).collect());
        assert_eq!(once, twice);
    }
}
