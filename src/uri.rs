use uuid::Uuid;

use crate::record::ProxyRecord;

pub const DEFAULT_FRONT_DOMAIN: &str = "df.game.naver.com";
pub const DEFAULT_SNI: &str = "df.game.naver.com.ukonskypea.dpdns.org";
pub const DEFAULT_TLS_PORT: u16 = 443;

/// Per-request knobs for URI generation. Defaults are compiled in and
/// overridable field by field.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub front_domain: String,
    pub sni: String,
    pub host_header: String,
    pub tls_port: u16,
    pub include_trojan: bool,
    pub include_vless: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            front_domain: DEFAULT_FRONT_DOMAIN.to_string(),
            sni: DEFAULT_SNI.to_string(),
            host_header: String::new(),
            tls_port: DEFAULT_TLS_PORT,
            include_trojan: true,
            include_vless: true,
        }
    }
}

/// Credential source for generated URIs. Production draws a fresh random
/// UUID per URI, never reusing one across records or schemes; tests inject
/// fixed values to pin down exact output.
pub trait Credentials: Send + Sync {
    fn next(&self) -> String;
}

pub struct RandomCredentials;

impl Credentials for RandomCredentials {
    fn next(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltUris {
    pub trojan: Option<String>,
    pub vless: Option<String>,
    pub tag: String,
}

/// One descriptor URI per requested scheme. The websocket path carries the
/// backend endpoint as `/<ip>-<port>`; the fragment is the display tag.
pub fn build_uris(
    record: &ProxyRecord,
    opts: &GenerateOptions,
    credentials: &dyn Credentials,
) -> BuiltUris {
    let tag = if record.label.is_empty() {
        format!("[{}]", record.ip)
    } else {
        format!("{} [{}]", record.label, record.ip)
    };
    let path = format!("/{}-{}", record.ip, record.port);
    let encoded_path = urlencoding::encode(&path).into_owned();
    let encoded_tag = urlencoding::encode(&tag).into_owned();
    let host = if opts.host_header.is_empty() {
        opts.sni.as_str()
    } else {
        opts.host_header.as_str()
    };

    let trojan = opts.include_trojan.then(|| {
        format!(
            "trojan://{}@{}:{}/?type=ws&host={}&path={}&security=tls&sni={}#{}",
            credentials.next(),
            opts.front_domain,
            opts.tls_port,
            host,
            encoded_path,
            opts.sni,
            encoded_tag
        )
    });
    let vless = opts.include_vless.then(|| {
        format!(
            "vless://{}@{}:{}/?type=ws&encryption=none&flow=&host={}&path={}&security=tls&sni={}#{}",
            credentials.next(),
            opts.front_domain,
            opts.tls_port,
            host,
            encoded_path,
            opts.sni,
            encoded_tag
        )
    });

    BuiltUris { trojan, vless, tag }
}
