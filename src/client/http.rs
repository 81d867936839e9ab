//! reqwest implementation of [`TicketBackend`].

use reqwest::{Client, Response, StatusCode};
use url::Url;

use super::error::api_error;
use super::{RetryPolicy, TicketBackend, execute_with_retry};
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::types::{NewTicket, Ticket, TicketId, TicketPatch};

/// HTTP client for the ticket REST service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl HttpBackend {
    /// Create a backend from configuration.
    ///
    /// `url_override` wins over `TICKETDESK_URL` and the config file.
    pub fn from_config(config: &Config, url_override: Option<&str>) -> Result<Self> {
        let base_url = config.resolve_base_url(url_override)?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self::with_client(client, base_url).with_retry(RetryPolicy::new(config.retries)))
    }

    /// Create a backend with default timeouts for `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&Config::default(), Some(base_url))
    }

    fn with_client(client: Client, mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn tickets_url(&self) -> Result<Url> {
        self.join("tickets")
    }

    fn ticket_url(&self, id: TicketId) -> Result<Url> {
        self.join(&format!("tickets/{id}"))
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| DeskError::Config(format!("invalid backend URL: {e}")))
    }

    /// Pass success responses through and turn everything else into an error.
    async fn check(response: Response, ticket: Option<TicketId>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body, ticket))
    }
}

impl TicketBackend for HttpBackend {
    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        let url = self.tickets_url()?;
        tracing::debug!(%url, "GET tickets");

        let (client, url) = (&self.client, &url);
        execute_with_retry(self.retry, || async move {
            let response = client.get(url.clone()).send().await?;
            let response = Self::check(response, None).await?;
            Ok(response.json::<Vec<Ticket>>().await?)
        })
        .await
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        let url = self.ticket_url(id)?;
        tracing::debug!(%url, "GET ticket");

        let (client, url) = (&self.client, &url);
        let direct = execute_with_retry(self.retry, || async move {
            let response = client.get(url.clone()).send().await?;
            let status = response.status();
            if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED {
                return Ok(None);
            }
            let response = Self::check(response, Some(id)).await?;
            Ok(Some(response.json::<Ticket>().await?))
        })
        .await?;

        if let Some(ticket) = direct {
            return Ok(ticket);
        }

        // Backends without an item route only expose the collection
        self.list_tickets()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(DeskError::TicketNotFound(id, None))
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        let url = self.tickets_url()?;
        tracing::debug!(%url, title = %ticket.title, "POST ticket");

        let response = self.client.post(url).json(ticket).send().await?;
        let response = Self::check(response, None).await?;
        Ok(response.json::<Ticket>().await?)
    }

    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        let url = self.ticket_url(id)?;
        tracing::debug!(%url, "PATCH ticket");

        let response = self.client.patch(url).json(patch).send().await?;
        let response = Self::check(response, Some(id)).await?;
        Ok(response.json::<Ticket>().await?)
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<()> {
        let url = self.ticket_url(id)?;
        tracing::debug!(%url, "DELETE ticket");

        let response = self.client.delete(url).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
