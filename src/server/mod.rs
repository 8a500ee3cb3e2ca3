use std::sync::Arc;

use hyper::{server::conn::Http, service::service_fn, Body, Method, Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::fetch::{Fetcher, HttpClient};
use crate::normalize::normalize;
use crate::record::RawRecord;
use crate::sources::DEFAULT_SOURCE_KEY;
use crate::uri::{build_uris, Credentials, GenerateOptions};

const INDEX_PAGE: &str = "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"/><title>proxylink</title></head>\n<body>\n<h1>proxylink</h1>\n<p>Proxy list aggregator and trojan/vless URI generator.</p>\n<ul>\n<li><code>GET /api/proxies?source=&lt;key&gt;</code></li>\n<li><code>POST /generate</code></li>\n</ul>\n</body>\n</html>\n";

pub struct AppState<C> {
    pub fetcher: Fetcher<C>,
    pub credentials: Box<dyn Credentials>,
}

#[derive(Debug)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Server {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    pub async fn start<C: HttpClient + 'static>(&self, state: Arc<AppState<C>>) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr).await?;
        log::info!("Listening on http://{}", addr);

        loop {
            let (stream, addr) = listener.accept().await?;
            log::debug!("Accepted connection from {}", addr);
            let state = Arc::clone(&state);
            tokio::task::spawn(async move {
                let service = service_fn(move |request| {
                    let state = Arc::clone(&state);
                    async move { Ok::<_, hyper::Error>(route(request, state).await) }
                });
                if let Err(err) = Http::new().serve_connection(stream, service).await {
                    log::error!("Connection error: {}", err);
                }
            });
        }
    }
}

pub async fn route<C: HttpClient>(request: Request<Body>, state: Arc<AppState<C>>) -> Response<Body> {
    match (request.method(), request.uri().path()) {
        (&Method::GET, "/api/proxies") => list_proxies(request, state).await,
        (&Method::POST, "/generate") => generate(request, state).await,
        _ => html(INDEX_PAGE),
    }
}

async fn list_proxies<C: HttpClient>(
    request: Request<Body>,
    state: Arc<AppState<C>>,
) -> Response<Body> {
    let source = request
        .uri()
        .query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "source")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_else(|| DEFAULT_SOURCE_KEY.to_string());

    match state.fetcher.records(&source).await {
        Ok(items) => json_response(
            StatusCode::OK,
            &json!({ "count": items.len(), "items": items }),
        ),
        Err(err) => {
            log::error!("{}", err);
            plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Error: {}", err),
            )
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GenerateRequest {
    source_key: Option<String>,
    front_domain: Option<String>,
    sni: Option<String>,
    host_header: Option<String>,
    cf_tls_port: Option<u16>,
    gen_trojan: Option<bool>,
    gen_vless: Option<bool>,
    // decoded per entry; one bad-typed entry must not sink the request
    selected: Vec<serde_json::Value>,
}

async fn generate<C: HttpClient>(request: Request<Body>, state: Arc<AppState<C>>) -> Response<Body> {
    let body = match hyper::body::to_bytes(request.into_body()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            log::error!("{}", err);
            return json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "ok": false, "error": err.to_string() }),
            );
        }
    };
    // an unreadable body reads as all-defaults
    let request: GenerateRequest = serde_json::from_slice(&body).unwrap_or_default();

    let defaults = GenerateOptions::default();
    let opts = GenerateOptions {
        front_domain: request.front_domain.unwrap_or(defaults.front_domain),
        sni: request.sni.unwrap_or(defaults.sni),
        host_header: request.host_header.unwrap_or(defaults.host_header),
        tls_port: request.cf_tls_port.unwrap_or(defaults.tls_port),
        include_trojan: request.gen_trojan.unwrap_or(defaults.include_trojan),
        include_vless: request.gen_vless.unwrap_or(defaults.include_vless),
    };

    let items = if !request.selected.is_empty() {
        let candidates: Vec<RawRecord> = request
            .selected
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        let items = normalize(candidates);
        if items.is_empty() {
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({ "ok": false, "error": "no valid proxies in selection" }),
            );
        }
        items
    } else {
        let key = request
            .source_key
            .unwrap_or_else(|| DEFAULT_SOURCE_KEY.to_string());
        match state.fetcher.records(&key).await {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                return json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({ "ok": false, "error": "proxy list is empty or could not be fetched" }),
                )
            }
            Err(err) => {
                log::error!("{}", err);
                return json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &json!({ "ok": false, "error": err.to_string() }),
                );
            }
        }
    };

    let mut trojan = Vec::new();
    let mut vless = Vec::new();
    for record in &items {
        let built = build_uris(record, &opts, state.credentials.as_ref());
        if let Some(uri) = built.trojan {
            trojan.push(uri);
        }
        if let Some(uri) = built.vless {
            vless.push(uri);
        }
    }
    let combined = trojan
        .iter()
        .chain(vless.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");

    json_response(
        StatusCode::OK,
        &json!({
            "ok": true,
            "counts": { "trojan": trojan.len(), "vless": vless.len() },
            "trojan": trojan,
            "vless": vless,
            "combined": combined,
        }),
    )
}

fn json_response(status: StatusCode, value: &serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(value.to_string()))
        .unwrap()
}

fn plain(status: StatusCode, body: String) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(body))
        .unwrap()
}

fn html(body: &'static str) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(body))
        .unwrap()
}
