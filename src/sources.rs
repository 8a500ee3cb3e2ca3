use crate::parsers::text::TextFormat;

pub const DEFAULT_SOURCE_KEY: &str = "all";

/// Where a source's records come from.
#[derive(Debug, Clone)]
pub enum SourceKind {
    Text {
        url: &'static str,
        format: TextFormat,
    },
    Json {
        url: &'static str,
    },
    Multi {
        members: &'static [&'static str],
    },
}

/// A named, pre-configured origin of proxy records. Static configuration,
/// not user-mutable.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: SourceKind,
}

/// The compiled-in source table. The first entry doubles as the fallback
/// for unknown source keys.
pub fn sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor {
            key: "all",
            name: "all sources merged",
            kind: SourceKind::Multi {
                members: &["txt", "json"],
            },
        },
        SourceDescriptor {
            key: "txt",
            name: "proxyList.txt",
            kind: SourceKind::Text {
                url: "https://raw.githubusercontent.com/mrzero0nol/My-v2ray/refs/heads/main/proxyList.txt",
                format: TextFormat::Loose,
            },
        },
        SourceDescriptor {
            key: "json",
            name: "KvProxyList.json",
            kind: SourceKind::Json {
                url: "https://raw.githubusercontent.com/mrzero0nol/My-v2ray/refs/heads/main/KvProxyList.json",
            },
        },
    ]
}
