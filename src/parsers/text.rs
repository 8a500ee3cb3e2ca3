use lazy_static::lazy_static;
use regex::Regex;

use crate::record::{PortField, RawRecord};
use crate::validate::sanitize_label;

/// Line layout of a text source. The two layouts are deliberately separate
/// strategies: `Csv` requires a country column, `Loose` scavenges whatever
/// the line offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Loose,
    Csv,
}

lazy_static! {
    static ref IP_PORT: Regex =
        Regex::new(r"(?P<ip>(?:\d{1,3}\.){3}\d{1,3})\s*[-:\s]\s*(?P<port>\d{2,5})").unwrap();
    static ref BARE_IP: Regex = Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}").unwrap();
    static ref SEPARATOR_RUN: Regex = Regex::new(r"[|,;]+").unwrap();
}

pub fn parse(text: &str, format: TextFormat) -> Vec<RawRecord> {
    match format {
        TextFormat::Loose => parse_loose(text),
        TextFormat::Csv => parse_csv(text),
    }
}

/// Log-style lines: an IPv4 followed by a dash/colon/whitespace separator
/// and a 2-5 digit port, or a bare IPv4 with the port defaulting to 443.
/// The label is the rest of the line with pipe/comma/semicolon runs
/// squashed.
fn parse_loose(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.len() < 4 {
            continue;
        }

        if let Some(cap) = IP_PORT.captures(line) {
            let span = cap.get(0).unwrap();
            let port: u32 = cap["port"].parse().unwrap_or(0);
            records.push(RawRecord::new(
                &cap["ip"],
                port,
                remainder_label(line, span.start(), span.end()),
            ));
        } else if let Some(span) = BARE_IP.find(line) {
            records.push(RawRecord::new(
                span.as_str(),
                443,
                remainder_label(line, span.start(), span.end()),
            ));
        }
    }
    records
}

fn remainder_label(line: &str, start: usize, end: usize) -> String {
    let rest = format!("{}{}", &line[..start], &line[end..]);
    sanitize_label(SEPARATOR_RUN.replace_all(&rest, " ").trim())
}

/// Structured lines: `ip,port,country,provider[,more provider text]`.
/// Lines with fewer than four fields or an unparseable port are skipped.
fn parse_csv(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 4 {
            continue;
        }

        let ip = fields[0].trim();
        let port: u32 = match fields[1].trim().parse() {
            Ok(p) if p > 0 => p,
            _ => continue,
        };
        let country = fields[2].trim().to_uppercase();
        if ip.is_empty() || country.is_empty() {
            continue;
        }

        records.push(RawRecord {
            ip: ip.to_string(),
            port: PortField::Number(port),
            label: sanitize_label(&fields[3..].join(",")),
            country: Some(country),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_parses_ip_port_and_label() {
        let records = parse("203.0.113.5:8080 | Singapore Node", TextFormat::Loose);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip, "203.0.113.5");
        assert_eq!(records[0].port.as_u32(), 8080);
        assert_eq!(records[0].label, "Singapore Node");
    }

    #[test]
    fn loose_accepts_dash_and_whitespace_separators() {
        let records = parse("1.2.3.4-2053 edge\n5.6.7.8 8443", TextFormat::Loose);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].port.as_u32(), 2053);
        assert_eq!(records[0].label, "edge");
        assert_eq!(records[1].port.as_u32(), 8443);
    }

    #[test]
    fn loose_defaults_bare_ip_to_443() {
        let records = parse("198.51.100.7  ; JP backup", TextFormat::Loose);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].port.as_u32(), 443);
        assert_eq!(records[0].label, "JP backup");
    }

    #[test]
    fn loose_skips_comments_blanks_and_short_lines() {
        let text = "# header\n\nx.y\nno address here\n";
        assert!(parse(text, TextFormat::Loose).is_empty());
    }

    #[test]
    fn csv_parses_country_and_joined_label() {
        let records = parse("203.0.113.5,443,sg,MyProvider", TextFormat::Csv);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip, "203.0.113.5");
        assert_eq!(records[0].port.as_u32(), 443);
        assert_eq!(records[0].country.as_deref(), Some("SG"));
        assert_eq!(records[0].label, "MyProvider");
    }

    #[test]
    fn csv_rejoins_trailing_fields_with_commas() {
        let records = parse("203.0.113.5,443,SG,Acme, Inc", TextFormat::Csv);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "Acme, Inc");
    }

    #[test]
    fn csv_skips_short_and_broken_lines() {
        let text = "1.2.3.4,443,SG\n1.2.3.4,none,SG,x\n# comment\n";
        assert!(parse(text, TextFormat::Csv).is_empty());
    }
}
