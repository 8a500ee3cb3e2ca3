use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOTTED_QUAD: Regex = Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Four dot-separated groups of 1-3 digits, each in [0,255]. Leading zeros
/// are accepted; "01" reads as 1.
pub fn is_valid_ipv4(s: &str) -> bool {
    if !DOTTED_QUAD.is_match(s) {
        return false;
    }
    s.split('.')
        .all(|octet| matches!(octet.parse::<u16>(), Ok(v) if v <= 255))
}

pub fn is_valid_port(port: u32) -> bool {
    (1..=65535).contains(&port)
}

/// Strips square brackets, squashes whitespace runs and trims. Idempotent.
pub fn sanitize_label(label: &str) -> String {
    let stripped: String = label.chars().filter(|c| *c != '[' && *c != ']').collect();
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}
