use compare_core::{SavePayload, ServerAck, StartReply, StatusReply};
use compare_logging::{compare_debug, compare_info};
use reqwest::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde_json::{json, Map, Value};

use crate::types::Operation;
use crate::wire::{results_to_json, ReplyBody};
use crate::{ApiError, ApiLayout, ClientSettings, Credentials};

/// Requests the search server understands.
#[async_trait::async_trait]
pub trait SearchApi: Send + Sync {
    async fn start(&self, list1: &[String], list2: &[String]) -> Result<StartReply, ApiError>;

    async fn status(&self, session_id: Option<&str>) -> Result<StatusReply, ApiError>;

    async fn stop(&self, session_id: Option<&str>) -> Result<ServerAck, ApiError>;

    async fn save(
        &self,
        session_id: Option<&str>,
        payload: &SavePayload,
    ) -> Result<ServerAck, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSearchApi {
    client: reqwest::Client,
    base_url: Url,
    layout: ApiLayout,
    bearer_token: Option<String>,
}

impl ReqwestSearchApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(settings.base_url.clone()));
        }

        // Start answers with a redirect to the session page; read it instead
        // of following it.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            layout: settings.layout,
            bearer_token: settings.bearer_token.clone(),
        })
    }

    fn endpoint(&self, operation: Operation, session_id: Option<&str>) -> Result<Url, ApiError> {
        let segments = self.layout.segments(operation, session_id)?;
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn lists_body(&self, list1: &[String], list2: &[String]) -> Map<String, Value> {
        let (key1, key2) = self.layout.list_keys();
        let mut body = Map::new();
        body.insert(key1.to_string(), json!(list1));
        body.insert(key2.to_string(), json!(list2));
        body
    }

    /// Posts the OAuth2 password form and returns the access token.
    ///
    /// The server answers with a redirect that sets an `access_token` cookie;
    /// a JSON body carrying `access_token` is accepted too.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let url = self.endpoint(Operation::Login, None)?;
        compare_info!("Logging in as {} at {}", credentials.username, url);
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "password")
            .append_pair("username", &credentials.username)
            .append_pair("password", &credentials.password)
            .finish();
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if let Some(token) = token_from_cookies(&response) {
            return Ok(token);
        }

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        if status.is_client_error() {
            let detail = body
                .get("detail")
                .and_then(Value::as_str)
                .unwrap_or("invalid credentials");
            return Err(ApiError::LoginRejected(detail.to_string()));
        }
        if !status.is_success() && !status.is_redirection() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        body.get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or(ApiError::MissingToken)
    }

    /// Session id from a redirect such as `/search/{id}`.
    fn session_from_redirect(&self, response: &Response) -> Result<String, ApiError> {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::BadRedirect("missing location".to_string()))?;
        let target = response
            .url()
            .join(location)
            .map_err(|err| ApiError::BadRedirect(format!("{location}: {err}")))?;
        let segments: Vec<&str> = target
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        match segments.as_slice() {
            [.., "search", id] if *id != "start" => Ok((*id).to_string()),
            _ => Err(ApiError::BadRedirect(location.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl SearchApi for ReqwestSearchApi {
    async fn start(&self, list1: &[String], list2: &[String]) -> Result<StartReply, ApiError> {
        let url = self.endpoint(Operation::Start, None)?;
        compare_info!(
            "Starting search at {} ({} + {} names)",
            url,
            list1.len(),
            list2.len()
        );
        let response = self
            .request(Method::POST, url)
            .json(&self.lists_body(list1, list2))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if response.status().is_redirection() {
            let session_id = self.session_from_redirect(&response)?;
            return Ok(StartReply::Redirected { session_id });
        }
        Ok(read_body(response).await?.into_start_reply())
    }

    async fn status(&self, session_id: Option<&str>) -> Result<StatusReply, ApiError> {
        let url = self.endpoint(Operation::Messages, session_id)?;
        compare_debug!("Polling {}", url);
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Ok(read_body(response).await?.into_status())
    }

    async fn stop(&self, session_id: Option<&str>) -> Result<ServerAck, ApiError> {
        let url = self.endpoint(Operation::Stop, session_id)?;
        let response = self
            .request(Method::POST, url)
            .json(&json!({ "stop_search": true }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_ack(response).await
    }

    async fn save(
        &self,
        session_id: Option<&str>,
        payload: &SavePayload,
    ) -> Result<ServerAck, ApiError> {
        let url = self.endpoint(Operation::Save, session_id)?;
        let mut body = self.lists_body(&payload.list1, &payload.list2);
        body.insert("messages".to_string(), json!(payload.messages));
        body.insert("results".to_string(), results_to_json(&payload.results));

        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_ack(response).await
    }
}

fn token_from_cookies(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next()?.trim().split_once('='))
        .find(|(name, value)| *name == "access_token" && !value.is_empty())
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Logs in on a short-lived runtime, for use before the client thread starts.
pub fn login_blocking(
    settings: &ClientSettings,
    credentials: &Credentials,
) -> Result<String, ApiError> {
    let api = ReqwestSearchApi::new(settings)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| ApiError::Runtime(err.to_string()))?;
    runtime.block_on(api.login(credentials))
}

async fn read_body(response: Response) -> Result<ReplyBody, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::HttpStatus(status.as_u16()));
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Stop and save only need a success status; the body is optional.
async fn read_ack(response: Response) -> Result<ServerAck, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::HttpStatus(status.as_u16()));
    }
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    let body: ReplyBody = serde_json::from_slice(&bytes).unwrap_or_default();
    Ok(body.into_ack())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
