use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    error::{ClientError, ClientResult},
    settings::Settings,
};

pub const API_PREFIX: &str = "/api/v1";

/// Path builder for the backend's per-resource route convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    resource: &'static str,
}

impl ResourcePath {
    pub const fn new(resource: &'static str) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn list(&self) -> String {
        format!("{API_PREFIX}/{}/obtener", self.resource)
    }

    pub fn item(&self, id: i64) -> String {
        format!("{API_PREFIX}/{}/obtener/{id}", self.resource)
    }

    pub fn create(&self) -> String {
        format!("{API_PREFIX}/{}/crear", self.resource)
    }

    pub fn update(&self, id: i64) -> String {
        format!("{API_PREFIX}/{}/actualizar/{id}", self.resource)
    }

    pub fn delete(&self, id: i64) -> String {
        format!("{API_PREFIX}/{}/eliminar/{id}", self.resource)
    }

    pub fn analyze_transition(&self, id: i64) -> String {
        format!("{API_PREFIX}/{}/{id}/analizar-transicion", self.resource)
    }

    pub fn execute_transition(&self, id: i64) -> String {
        format!("{API_PREFIX}/{}/{id}/ejecutar-transicion", self.resource)
    }
}

/// Some endpoints wrap their payload in `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Bare(T),
    Wrapped { data: T },
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Bare(value) | Envelope::Wrapped { data: value } => value,
        }
    }
}

/// Raw response body of a binary download (reports).
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        let builder = self.http.request(method, self.url(path));
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(status = status.as_u16(), path, "error body unreadable: {err}");
                String::new()
            }
        };
        let err = ClientError::from_response(status, &body);
        warn!(status = status.as_u16(), path, "api request failed: {err}");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice::<Envelope<T>>(&bytes)
            .map(Envelope::into_inner)
            .map_err(|err| ClientError::Decode(format!("{path}: {err}")))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::GET, path).await;
        let response = self.send(builder, path).await?;
        Self::decode(response, path).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).await.json(body);
        let response = self.send(builder, path).await?;
        Self::decode(response, path).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).await.json(body);
        let response = self.send(builder, path).await?;
        Self::decode(response, path).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, path).await;
        self.send(builder, path).await?;
        Ok(())
    }

    pub async fn get_bytes(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Blob> {
        let builder = self.request(Method::GET, path).await.query(query);
        let response = self.send(builder, path).await?;
        let headers = response.headers();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let filename = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);
        let bytes = response.bytes().await?.to_vec();
        Ok(Blob {
            bytes,
            content_type,
            filename,
        })
    }
}

fn filename_from_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        bare_filename(raw.trim().trim_matches('"'))
    })
}

/// Last path component of a server-suggested name. Directory parts are
/// dropped so the name can only ever land inside the caller's directory.
pub(crate) fn bare_filename(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}
