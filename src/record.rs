use serde::{Deserialize, Serialize};

/// A validated proxy endpoint. Identity is the `(ip, port)` pair; the label
/// is display-only and never merged between duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRecord {
    pub ip: String,
    pub port: u16,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ProxyRecord {
    pub fn key(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl std::fmt::Display for ProxyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Proxy {}:{}>", self.ip, self.port)
    }
}

/// An unvalidated candidate as produced by the parsers or submitted by a
/// client. Everything here is taken on faith until `normalize` runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub ip: String,
    pub port: PortField,
    pub label: String,
    pub country: Option<String>,
}

impl RawRecord {
    pub fn new(ip: impl Into<String>, port: u32, label: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port: PortField::Number(port),
            label: label.into(),
            country: None,
        }
    }
}

impl From<ProxyRecord> for RawRecord {
    fn from(record: ProxyRecord) -> Self {
        Self {
            ip: record.ip,
            port: PortField::Number(record.port as u32),
            label: record.label,
            country: record.country,
        }
    }
}

/// Client payloads carry ports as numbers or numeric strings; anything else
/// coerces to 0 and falls out during normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortField {
    Number(u32),
    Text(String),
    Other(serde_json::Value),
}

impl Default for PortField {
    fn default() -> Self {
        PortField::Number(0)
    }
}

impl PortField {
    pub fn as_u32(&self) -> u32 {
        match self {
            PortField::Number(n) => *n,
            PortField::Text(s) => s.trim().parse().unwrap_or(0),
            PortField::Other(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_field_coerces_strings() {
        let raw: RawRecord = serde_json::from_str(r#"{"ip":"1.1.1.1","port":"8443"}"#).unwrap();
        assert_eq!(raw.port.as_u32(), 8443);
    }

    #[test]
    fn port_field_tolerates_garbage() {
        let raw: RawRecord = serde_json::from_str(r#"{"ip":"1.1.1.1","port":[1]}"#).unwrap();
        assert_eq!(raw.port.as_u32(), 0);
        let raw: RawRecord = serde_json::from_str(r#"{"ip":"1.1.1.1"}"#).unwrap();
        assert_eq!(raw.port.as_u32(), 0);
    }

    #[test]
    fn country_is_omitted_from_json_when_absent() {
        let record = ProxyRecord {
            ip: "1.2.3.4".into(),
            port: 443,
            label: String::new(),
            country: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("country"));
    }
}
