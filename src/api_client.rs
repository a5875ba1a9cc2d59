use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{
    AuthStatus, AuthUrlResponse, CallbackResponse, Client, ClientQuery, ClientStats, EmailDraft,
    EmailQuery, HealthStatus, Opportunity, OpportunityQuery, OpportunityStats, OpportunityStatus,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Per-request options layered on top of the client defaults.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
            query: Vec::new(),
        }
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Adds or overrides a header; request headers win over the defaults.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends query parameters from any flat serializable struct.
    ///
    /// Absent (`null`) fields are skipped, strings are sent unquoted.
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, ApiError> {
        match serde_json::to_value(params)? {
            Value::Object(map) => {
                for (key, value) in map {
                    let rendered = match value {
                        Value::Null => continue,
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    self.query.push((key, rendered));
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ApiError::Decode(format!(
                "query parameters must be an object, got {}",
                other
            ))),
        }
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Response advertised `application/json`.
    Json(Value),
    /// Any other content type, returned verbatim.
    Text(String),
}

impl ResponseBody {
    /// JSON value of the body; plain text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(v) => v,
            ResponseBody::Text(s) => Value::String(s),
        }
    }

    /// Decodes the body into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ResponseBody::Json(v) => Ok(serde_json::from_value(v)?),
            ResponseBody::Text(s) => Err(ApiError::Decode(format!(
                "expected a JSON response, got text: {}",
                s.chars().take(120).collect::<String>()
            ))),
        }
    }
}

/// Client for the CRM backend REST API.
///
/// Every call carries the session cookies set by the backend. No retries,
/// no caching, no timeout: a failed call fails once and is reported.
#[derive(Clone)]
pub struct ApiService {
    client: reqwest::Client,
    base_url: String,
}

impl ApiService {
    /// Creates a new `ApiService`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Origin and prefix of the API (e.g. `http://localhost:5001/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs one round trip to `endpoint` (relative to the base URL).
    ///
    /// # Returns
    ///
    /// * `Result<ResponseBody, ApiError>` - Parsed JSON or raw text on 2xx;
    ///   otherwise an `ApiError::Http` carrying the server's `error` message.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, ApiError> {
        let result = self.send(endpoint, options).await;
        if let Err(ref e) = result {
            tracing::error!("API error on {}: {}", endpoint, e);
        }
        result
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<ResponseBody, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("{} {}", options.method, url);

        let mut builder = self
            .client
            .request(options.method, &url)
            .headers(options.headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = options.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            // Error bodies are best-effort: a non-JSON body falls back to the generic message.
            let server_message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));
            return Err(ApiError::http(status.as_u16(), server_message));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        if is_json {
            Ok(ResponseBody::Json(response.json().await?))
        } else {
            Ok(ResponseBody::Text(response.text().await?))
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let body = self.request(endpoint, options).await?;
        body.into_json().map_err(|e| {
            tracing::error!("Unexpected response shape from {}: {}", endpoint, e);
            e
        })
    }

    pub async fn get(&self, endpoint: &str) -> Result<ResponseBody, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: Option<&T>,
    ) -> Result<ResponseBody, ApiError> {
        self.request(endpoint, with_body(Method::POST, data)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &T,
    ) -> Result<ResponseBody, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::PUT).json(data)?)
            .await
    }

    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &T,
    ) -> Result<ResponseBody, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::PATCH).json(data)?)
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ResponseBody, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }

    // Authentication

    pub async fn get_auth_url(&self) -> Result<AuthUrlResponse, ApiError> {
        self.fetch("/auth/google/url", RequestOptions::new(Method::GET))
            .await
    }

    pub async fn handle_google_callback(&self, code: &str) -> Result<CallbackResponse, ApiError> {
        let options = RequestOptions::new(Method::POST).json(&json!({ "code": code }))?;
        self.fetch("/auth/google/callback", options).await
    }

    pub async fn get_auth_status(&self) -> Result<AuthStatus, ApiError> {
        self.fetch("/auth/status", RequestOptions::new(Method::GET))
            .await
    }

    pub async fn logout(&self) -> Result<Value, ApiError> {
        Ok(self.post::<Value>("/auth/logout", None).await?.into_value())
    }

    // Clients

    pub async fn get_clients(&self, params: &ClientQuery) -> Result<Value, ApiError> {
        let options = RequestOptions::new(Method::GET).query(params)?;
        Ok(self.request("/clients", options).await?.into_value())
    }

    pub async fn get_client(&self, id: &str) -> Result<Value, ApiError> {
        Ok(self.get(&format!("/clients/{}", path_segment(id)?)).await?.into_value())
    }

    pub async fn create_client(&self, client: &Client) -> Result<Value, ApiError> {
        Ok(self.post("/clients", Some(client)).await?.into_value())
    }

    pub async fn update_client(&self, id: &str, client: &Client) -> Result<Value, ApiError> {
        Ok(self
            .put(&format!("/clients/{}", path_segment(id)?), client)
            .await?
            .into_value())
    }

    pub async fn delete_client(&self, id: &str) -> Result<Value, ApiError> {
        Ok(self.delete(&format!("/clients/{}", path_segment(id)?)).await?.into_value())
    }

    pub async fn get_client_stats(&self) -> Result<ClientStats, ApiError> {
        self.fetch("/clients/stats/overview", RequestOptions::new(Method::GET))
            .await
    }

    // Emails

    pub async fn get_client_emails(&self, client_id: &str) -> Result<Value, ApiError> {
        Ok(self
            .get(&format!("/emails/client/{}", path_segment(client_id)?))
            .await?
            .into_value())
    }

    pub async fn get_emails(&self, params: &EmailQuery) -> Result<Value, ApiError> {
        let options = RequestOptions::new(Method::GET).query(params)?;
        Ok(self.request("/emails", options).await?.into_value())
    }

    pub async fn send_email(&self, email: &EmailDraft) -> Result<Value, ApiError> {
        Ok(self.post("/emails/send", Some(email)).await?.into_value())
    }

    pub async fn sync_all_emails(&self) -> Result<Value, ApiError> {
        Ok(self
            .post::<Value>("/emails/sync-all", None)
            .await?
            .into_value())
    }

    /// Asks the backend to draft a reply to `email_content`.
    pub async fn generate_email_response(
        &self,
        email_content: &str,
        client_name: &str,
    ) -> Result<Value, ApiError> {
        let body = json!({
            "emailContent": email_content,
            "clientName": client_name
        });
        Ok(self
            .post("/emails/generate-response", Some(&body))
            .await?
            .into_value())
    }

    pub async fn summarize_email(&self, email_content: &str) -> Result<Value, ApiError> {
        let body = json!({ "emailContent": email_content });
        Ok(self
            .post("/emails/summarize", Some(&body))
            .await?
            .into_value())
    }

    // Opportunities

    pub async fn get_opportunities(&self, params: &OpportunityQuery) -> Result<Value, ApiError> {
        let options = RequestOptions::new(Method::GET).query(params)?;
        Ok(self.request("/opportunities", options).await?.into_value())
    }

    pub async fn get_opportunity(&self, id: &str) -> Result<Value, ApiError> {
        Ok(self
            .get(&format!("/opportunities/{}", path_segment(id)?))
            .await?
            .into_value())
    }

    pub async fn create_opportunity(&self, opportunity: &Opportunity) -> Result<Value, ApiError> {
        Ok(self
            .post("/opportunities", Some(opportunity))
            .await?
            .into_value())
    }

    pub async fn update_opportunity(
        &self,
        id: &str,
        opportunity: &Opportunity,
    ) -> Result<Value, ApiError> {
        Ok(self
            .put(&format!("/opportunities/{}", path_segment(id)?), opportunity)
            .await?
            .into_value())
    }

    pub async fn update_opportunity_status(
        &self,
        id: &str,
        status: OpportunityStatus,
    ) -> Result<Value, ApiError> {
        Ok(self
            .patch(
                &format!("/opportunities/{}/status", path_segment(id)?),
                &json!({ "statut": status }),
            )
            .await?
            .into_value())
    }

    pub async fn delete_opportunity(&self, id: &str) -> Result<Value, ApiError> {
        Ok(self
            .delete(&format!("/opportunities/{}", path_segment(id)?))
            .await?
            .into_value())
    }

    pub async fn get_opportunity_stats(&self) -> Result<OpportunityStats, ApiError> {
        self.fetch(
            "/opportunities/stats/overview",
            RequestOptions::new(Method::GET),
        )
        .await
    }

    pub async fn get_recent_opportunities(&self) -> Result<Value, ApiError> {
        Ok(self
            .get("/opportunities/recent/week")
            .await?
            .into_value())
    }

    // Health

    pub async fn get_health(&self) -> Result<HealthStatus, ApiError> {
        self.fetch("/health", RequestOptions::new(Method::GET)).await
    }
}

/// Percent-encodes a record id so it stays a single path segment.
///
/// Empty ids and dot segments are refused: they would resolve to another
/// endpoint.
fn path_segment(id: &str) -> Result<String, ApiError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(ApiError::InvalidUrl(format!("invalid record id '{}'", id)));
    }
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    // Form encoding writes spaces as '+'; a literal '+' is already %2B.
    Ok(encoded.replace('+', "%20"))
}

fn with_body<T: Serialize + ?Sized>(
    method: Method,
    data: Option<&T>,
) -> Result<RequestOptions, ApiError> {
    let options = RequestOptions::new(method);
    match data {
        Some(body) => options.json(body),
        None => Ok(options),
    }
}
