//! The ticketing service client.
//!
//! Stages never speak HTTP themselves, they hold an [`Api`]. The production
//! implementation is [`HttpClient`], JSON over HTTP/1 against a base URI.
//! Tests drive the stages with stub implementations.
//!
//! Ticket creation distinguishes three outcomes: the service issued a ticket,
//! the service refused with a non-200 status ([`Error::Refused`]) or the
//! request never completed ([`Error::Transport`]). Callers that only care
//! whether a ticket was issued may ignore the difference.

use async_trait::async_trait;
use bytes::Bytes;
use http::{
    Method, Request, StatusCode, Uri,
    header::CONTENT_TYPE,
    uri::{Authority, Scheme},
};
use http_body_util::{BodyExt, Full};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::event::{Event, EventId, NewEvent, Ticket};

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Api`] implementations.
pub enum Error {
    /// The request did not complete: connection refused, DNS failure and the
    /// like.
    #[error("Failed to send HTTP request to {uri}: {source}")]
    Transport {
        /// Target URI
        uri: String,
        /// Underlying client error
        #[source]
        source: Box<hyper_util::client::legacy::Error>,
    },
    /// The response body could not be read.
    #[error("Failed to read response body from {uri}: {source}")]
    Body {
        /// Target URI
        uri: String,
        /// Underlying hyper error
        #[source]
        source: Box<hyper::Error>,
    },
    /// The response body was not the expected JSON.
    #[error("Failed to decode response from {uri}: {source}")]
    Decode {
        /// Target URI
        uri: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
    /// The service answered ticket creation with a non-200 status.
    #[error("Service refused request to {uri} with status {status}")]
    Refused {
        /// Target URI
        uri: String,
        /// Status returned by the service
        status: StatusCode,
    },
    /// The request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    /// The request could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),
    /// The configured target URI is missing a scheme or authority.
    #[error("Target URI {0} must carry a scheme and authority")]
    InvalidTarget(Uri),
}

impl Error {
    /// True if the service answered but declined the request.
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refused { .. })
    }

    /// True if no answer arrived from the service.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Body { .. })
    }
}

/// The remote operations the pipeline needs from the ticketing service.
#[async_trait]
pub trait Api: Send + Sync {
    /// Fetch every event. A body that does not decode yields no events.
    async fn list_events(&self) -> Result<Vec<Event>, Error>;

    /// Create an event, returning the service's canonical copy.
    async fn create_event(&self, name: &str, capacity: i32) -> Result<Event, Error>;

    /// Delete an event, returning the status code the service answered with.
    async fn delete_event(&self, id: EventId) -> Result<StatusCode, Error>;

    /// Request a ticket named `name` against event `event_id`.
    async fn create_ticket(&self, event_id: EventId, name: &str) -> Result<Ticket, Error>;
}

#[derive(Debug, Clone)]
/// [`Api`] over HTTP/1 with JSON bodies.
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
    scheme: Scheme,
    authority: Authority,
    base_path: String,
}

impl HttpClient {
    /// Create a new [`HttpClient`] rooted at `target_uri`.
    ///
    /// # Errors
    ///
    /// Function will error if `target_uri` has no scheme or no authority.
    pub fn new(target_uri: &Uri) -> Result<Self, Error> {
        let (Some(scheme), Some(authority)) = (target_uri.scheme(), target_uri.authority()) else {
            return Err(Error::InvalidTarget(target_uri.clone()));
        };
        let base_path = target_uri.path().trim_end_matches('/').to_string();

        let client = Client::builder(TokioExecutor::new())
            .retry_canceled_requests(false)
            .build_http();

        Ok(Self {
            client,
            scheme: scheme.clone(),
            authority: authority.clone(),
            base_path,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Uri, Error> {
        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(format!("{base}{path}", base = self.base_path))
            .build()?;
        Ok(uri)
    }

    /// Send a request, returning the status and the whole body.
    async fn send(&self, method: Method, uri: Uri, body: Bytes) -> Result<(StatusCode, Bytes), Error> {
        let mut builder = Request::builder().method(method.clone()).uri(uri.clone());
        if !body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder.body(Full::new(body))?;

        debug!("{method} {uri}");
        let response = self
            .client
            .request(request)
            .await
            .map_err(|source| Error::Transport {
                uri: uri.to_string(),
                source: Box::new(source),
            })?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|source| Error::Body {
                uri: uri.to_string(),
                source: Box::new(source),
            })?
            .to_bytes();
        Ok((status, bytes))
    }
}

fn decode<T>(uri: &Uri, bytes: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|source| Error::Decode {
        uri: uri.to_string(),
        source,
    })
}

#[async_trait]
impl Api for HttpClient {
    async fn list_events(&self) -> Result<Vec<Event>, Error> {
        let uri = self.endpoint("/events")?;
        let (_status, bytes) = self.send(Method::GET, uri.clone(), Bytes::new()).await?;
        match decode(&uri, &bytes) {
            Ok(events) => Ok(events),
            Err(err) => {
                debug!("Discarding event listing: {err}");
                Ok(Vec::new())
            }
        }
    }

    async fn create_event(&self, name: &str, capacity: i32) -> Result<Event, Error> {
        let uri = self.endpoint("/events")?;
        let body = serde_json::to_vec(&NewEvent {
            name: name.to_string(),
            capacity,
        })?;
        let (_status, bytes) = self.send(Method::POST, uri.clone(), body.into()).await?;
        decode(&uri, &bytes)
    }

    async fn delete_event(&self, id: EventId) -> Result<StatusCode, Error> {
        let uri = self.endpoint(&format!("/events/{id}"))?;
        let (status, _bytes) = self.send(Method::DELETE, uri, Bytes::new()).await?;
        Ok(status)
    }

    async fn create_ticket(&self, event_id: EventId, name: &str) -> Result<Ticket, Error> {
        let uri = self.endpoint(&format!("/events/{event_id}/ticket"))?;
        let body = serde_json::to_vec(&Ticket {
            event_id,
            name: name.to_string(),
        })?;
        let (status, bytes) = self.send(Method::POST, uri.clone(), body.into()).await?;
        if status != StatusCode::OK {
            return Err(Error::Refused {
                uri: uri.to_string(),
                status,
            });
        }
        decode(&uri, &bytes)
    }
}
