//! HTTP implementation of the command channel.

use async_trait::async_trait;
use lan_control_types::{Command, LoginRequest, Reply, SessionInfo};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::channel::{CommandChannel, SessionApi};
use crate::error::ProtocolError;
use crate::wire::{self, Method, Route};

/// JSON-over-HTTP transport to a host.
///
/// Holds a cookie store so the session cookie set by `/api/login` travels
/// with every later request. Cloning shares the connection pool and cookies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Create a transport for the host at `base_url` (e.g. `http://10.0.0.2:4001`).
    pub fn new(base_url: &str) -> Result<Self, ProtocolError> {
        let base = Url::parse(base_url)
            .map_err(|e| ProtocolError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ProtocolError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self { client, base })
    }

    /// The host base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn execute<T>(&self, route: Route, body: Option<Value>) -> Result<T, ProtocolError>
    where
        T: DeserializeOwned + Default,
    {
        let url = self
            .base
            .join(route.path)
            .map_err(|e| ProtocolError::InvalidUrl(e.to_string()))?;
        let request = match route.method {
            Method::Get => self.client.get(url),
            Method::Post => self
                .client
                .post(url)
                .json(&body.unwrap_or_else(wire::empty_body)),
        };
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(path = route.path, status = status.as_u16(), "host replied");
        wire::parse_body(
            status.as_u16(),
            status.canonical_reason().unwrap_or("request failed"),
            &bytes,
        )
    }
}

#[async_trait]
impl CommandChannel for HttpTransport {
    async fn send(&self, command: Command) -> Result<Reply, ProtocolError> {
        let route = wire::route(&command);
        let body = wire::body(&command)?;
        self.execute(route, body).await
    }
}

#[async_trait]
impl SessionApi for HttpTransport {
    async fn session(&self) -> Result<SessionInfo, ProtocolError> {
        match self.execute(wire::SESSION, None).await {
            Err(e) if e.is_session_lost() => Ok(SessionInfo::default()),
            other => other,
        }
    }

    async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ProtocolError> {
        let username = request.username.clone();
        let body = serde_json::to_value(&request)?;
        let reply: SessionInfo = self.execute(wire::LOGIN, Some(body)).await?;
        Ok(SessionInfo {
            authenticated: true,
            username: reply.username.or(Some(username)),
        })
    }

    async fn logout(&self) -> Result<(), ProtocolError> {
        let _: Value = self.execute(wire::LOGOUT, None).await?;
        Ok(())
    }
}
