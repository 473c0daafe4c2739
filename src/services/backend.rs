//! Platform Backend Client
//!
//! Typed client for the astrology platform's REST API: order search, report
//! batch submission, admin login, and the catalog/reporting reads the
//! dashboard proxies. The backend is treated as opaque; this module owns the
//! request dialect, the envelope normalization quirks, and nothing else.

use serde::Deserialize;

use crate::config::AppConfig;
use crate::models::earning::{Earning, RawEarningsEnvelope};
use crate::models::lead::{Lead, RawLeadsEnvelope};
use crate::models::order::{OrderQuery, OrdersPage, RawOrdersEnvelope};
use crate::models::puja::{Category, RawCategoryList, RawPuja, RawPujaEnvelope};

/// Successful login reply from the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSuccess {
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessReply {
    #[serde(default)]
    job_count: Option<u64>,
}

/// Client for the platform backend REST API.
pub struct BackendApi {
    http: reqwest::Client,
    base_url: String,
}

impl BackendApi {
    pub fn new(config: &AppConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("astro-admin/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.backend_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check that the body is a 2xx reply, otherwise surface status and body.
    async fn read_success(response: reqwest::Response) -> Result<String, BackendError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            metrics::counter!("backend_request_failures_total").increment(1);
            return Err(BackendError::Status { status, body });
        }
        Ok(body)
    }

    /// Search orders. The backend's own `reportDeliveryStatus` filter is an
    /// optimization hint only; callers re-validate what comes back.
    pub async fn query_orders(
        &self,
        token: &str,
        query: &OrderQuery,
    ) -> Result<OrdersPage, BackendError> {
        let started = std::time::Instant::now();
        metrics::counter!("backend_requests_total").increment(1);
        let response = self
            .http
            .get(self.url("/api/admin/life-journey-orders"))
            .bearer_auth(token)
            .query(&query.params())
            .send()
            .await?;
        metrics::histogram!("backend_request_seconds").record(started.elapsed().as_secs_f64());

        let body = Self::read_success(response).await?;
        let envelope: RawOrdersEnvelope = serde_json::from_str(&body)?;
        let page = envelope.normalize();
        tracing::debug!(
            page = page.page,
            total = page.total,
            items = page.items.len(),
            "order query returned"
        );
        Ok(page)
    }

    /// Trigger report generation for a batch of order ids. A 2xx means
    /// "queued"; the body is parsed best-effort for a job count and nothing
    /// else is relied upon.
    pub async fn submit_report_batch(
        &self,
        token: &str,
        report_ids: &[String],
    ) -> Result<u64, BackendError> {
        let started = std::time::Instant::now();
        metrics::counter!("backend_requests_total").increment(1);
        let response = self
            .http
            .post(self.url("/api/life-journey-report/process-lcr-reports"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "reportIds": report_ids }))
            .send()
            .await?;
        metrics::histogram!("backend_request_seconds").record(started.elapsed().as_secs_f64());

        let body = Self::read_success(response).await?;
        let reply: ProcessReply = serde_json::from_str(&body).unwrap_or_default();
        Ok(reply.job_count.unwrap_or(report_ids.len() as u64))
    }

    /// Proxy the admin login. Non-2xx replies come back as
    /// [`BackendError::Status`] carrying the verbatim body so the caller can
    /// pass it through.
    pub async fn admin_login(
        &self,
        credentials: &serde_json::Value,
    ) -> Result<LoginSuccess, BackendError> {
        let response = self
            .http
            .post(self.url("/api/admin/adminLogin"))
            .json(credentials)
            .send()
            .await?;

        let body = Self::read_success(response).await?;
        let success: LoginSuccess = serde_json::from_str(&body)?;
        Ok(success)
    }

    /// Fetch every lead, or only those inside a date range when one is given.
    pub async fn fetch_leads(
        &self,
        token: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<Lead>, BackendError> {
        let request = match (from, to) {
            (Some(from), Some(to)) => self
                .http
                .get(self.url("/api/admin/leads-by-date"))
                .query(&[("fromDate", from), ("toDate", to)]),
            _ => self.http.get(self.url("/api/admin/leads")),
        };
        let response = request.bearer_auth(token).send().await?;

        let body = Self::read_success(response).await?;
        let envelope: RawLeadsEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.normalize())
    }

    /// Fetch the admin earnings history, optionally bounded by date and type.
    pub async fn fetch_earnings(
        &self,
        token: &str,
        from: Option<&str>,
        to: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Vec<Earning>, BackendError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(from) = from {
            params.push(("startDate", from));
        }
        if let Some(to) = to {
            params.push(("endDate", to));
        }
        if let Some(kind) = kind {
            params.push(("type", kind));
        }

        // Endpoint path is spelled the way the backend deployed it.
        let response = self
            .http
            .get(self.url("/api/admin/get_admin_earnig_history2"))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await?;

        let body = Self::read_success(response).await?;
        let envelope: RawEarningsEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.normalize())
    }

    /// Fetch one puja listing (raw; the caller normalizes against its
    /// configured image base).
    pub async fn fetch_puja(&self, token: &str, id: &str) -> Result<RawPuja, BackendError> {
        let response = self
            .http
            .get(self.url(&format!("/api/puja-new/get_puja_by/{id}")))
            .bearer_auth(token)
            .send()
            .await?;

        let body = Self::read_success(response).await?;
        let envelope: RawPujaEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.into_raw())
    }

    pub async fn fetch_puja_categories(&self, token: &str) -> Result<Vec<Category>, BackendError> {
        let response = self
            .http
            .get(self.url("/api/puja/get_puja_category"))
            .bearer_auth(token)
            .send()
            .await?;

        let body = Self::read_success(response).await?;
        let list: RawCategoryList = serde_json::from_str(&body)?;
        Ok(list.normalize())
    }

    /// Forward a validated create-puja form as multipart.
    pub async fn create_puja(
        &self,
        token: &str,
        form: reqwest::multipart::Form,
    ) -> Result<serde_json::Value, BackendError> {
        let response = self
            .http
            .post(self.url("/api/puja-new/create_puja"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let body = Self::read_success(response).await?;
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }

    /// Forward a validated update-puja form as multipart.
    pub async fn update_puja(
        &self,
        token: &str,
        id: &str,
        form: reqwest::multipart::Form,
    ) -> Result<serde_json::Value, BackendError> {
        let response = self
            .http
            .put(self.url(&format!("/api/puja-new/update-puja/{id}")))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let body = Self::read_success(response).await?;
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }

    /// Reachability probe for health checks. Any HTTP reply counts; only a
    /// transport failure is an error.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.http.get(self.url("/")).send().await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request to backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}
