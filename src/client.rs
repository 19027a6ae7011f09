//! OneView REST client.
//!
//! Implements [`InventoryClient`] over the appliance's HTTP API. Each
//! collector owns its own client, and with it its own login session.

use crate::config::OneViewConfig;
use crate::error::{OneViewError, Result};
use crate::inventory::{
    HealthStatus, InventoryClient, ResourceCount, ResourceKind, ResourceList, ResourceMember,
    Utilization,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const LOGIN_PATH: &str = "/rest/login-sessions";

/// OneView API client.
pub struct OneViewClient {
    client: Client,
    config: OneViewConfig,
    base_url: String,
    session: Mutex<Option<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    user_name: &'a str,
    password: &'a str,
    auth_login_domain: &'a str,
    login_msg_ack: bool,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(rename = "sessionID")]
    session_id: String,
}

/// One page of a resource collection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourcePage {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    members: Vec<ResourceMember>,
    #[serde(default)]
    next_page_uri: Option<String>,
}

impl OneViewClient {
    /// Create a new OneView API client. No request is sent until
    /// [`login`](Self::login) or the first read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use oneview_exporter::client::OneViewClient;
    /// use oneview_exporter::config::Settings;
    ///
    /// let mut settings = Settings::default();
    /// settings.oneview.endpoint = "https://oneview.example.com".to_string();
    /// let client = OneViewClient::new(settings.oneview).unwrap();
    /// ```
    pub fn new(config: OneViewConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        let base_url = config.endpoint.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            config,
            base_url,
            session: Mutex::new(None),
        })
    }

    /// Open a login session and keep its token for subsequent requests.
    pub async fn login(&self) -> Result<()> {
        let token = self.create_session().await?;
        *self.session.lock().await = Some(token);
        info!("Logged in to OneView at {}", self.base_url);
        Ok(())
    }

    async fn create_session(&self) -> Result<String> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        debug!("Creating login session at: {}", url);

        let body = LoginRequest {
            user_name: &self.config.username,
            password: &self.config.password,
            auth_login_domain: &self.config.auth_login_domain,
            login_msg_ack: true,
        };

        let response = self
            .client
            .post(&url)
            .header("X-API-Version", self.config.api_version.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Login rejected: {}", status);
            return Err(OneViewError::Auth(format!(
                "login to {} returned {}",
                self.base_url, status
            )));
        }

        let login: LoginResponse = response.json().await.map_err(|e| {
            OneViewError::ParseError(format!("Failed to parse login response: {}", e))
        })?;
        Ok(login.session_id)
    }

    /// Current session token, logging in first if there is none.
    async fn session_token(&self) -> Result<String> {
        let mut session = self.session.lock().await;
        if let Some(token) = session.as_ref() {
            return Ok(token.clone());
        }
        let token = self.create_session().await?;
        *session = Some(token.clone());
        Ok(token)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header("X-API-Version", self.config.api_version.to_string())
            .header("If-Match", &self.config.if_match)
            .header("Auth", token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let token = self.session_token().await?;
        debug!("Fetching {} {:?}", url, query);

        let response = self
            .authorized(self.client.get(url), &token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Session expired or revoked; the next call logs in again.
            self.session.lock().await.take();
            warn!("Session rejected for {}", url);
            return Err(OneViewError::Auth(format!("{} returned {}", url, status)));
        }
        if !status.is_success() {
            warn!("Request to {} failed: {}", url, status);
        }
        let response = response.error_for_status()?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            OneViewError::ParseError(format!("{}: {}. Body preview: {}...", url, e, preview))
        })
    }

    async fn first_page(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourcePage> {
        let mut query = Vec::new();
        if let Some(status) = status {
            query.push(("filter", status.filter()));
        }

        let url = format!("{}{}", self.base_url, kind.path());
        self.get_json(&url, &query).await
    }
}

#[async_trait]
impl InventoryClient for OneViewClient {
    async fn count_resources(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourceCount> {
        let page = self.first_page(kind, status).await?;
        debug!("Counted {} (total {}, status {:?})", kind, page.total, status);
        Ok(ResourceCount {
            total: page.total,
            category: page.category,
        })
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        status: Option<HealthStatus>,
    ) -> Result<ResourceList> {
        let first = self.first_page(kind, status).await?;

        let mut list = ResourceList {
            total: first.total,
            category: first.category,
            members: first.members,
        };

        let mut next = first.next_page_uri.filter(|uri| !uri.is_empty());
        while let Some(uri) = next.take() {
            // nextPageUri already carries the filter and paging parameters.
            let page_url = format!("{}{}", self.base_url, uri);
            let page: ResourcePage = self.get_json(&page_url, &[]).await?;
            if page.members.is_empty() {
                break;
            }
            list.members.extend(page.members);
            next = page
                .next_page_uri
                .filter(|candidate| !candidate.is_empty() && *candidate != uri);
        }

        debug!(
            "Listed {} {} (total {}, status {:?})",
            list.members.len(),
            kind,
            list.total,
            status
        );
        Ok(list)
    }

    async fn fetch_utilization(&self, uri: &str) -> Result<Utilization> {
        let url = format!("{}{}/utilization", self.base_url, uri);
        self.get_json(&url, &[("refresh", "true".to_string())]).await
    }
}
