use std::time::Duration;

use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::dataset::Dataset;
use crate::error::{IddaaError, Result};
use crate::extract::Extractor;
use crate::model::{Competition, ExtractionBatch};

const BASE_URL: &str = "https://www.spordb.com";
const LANDING_PATH: &str = "/iddaa-programi/";
const TABLE_PATH: &str = "/view/iddaa_program_table.php";
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// The main entry point for fetching betting-program pages.
///
/// `IddaaClient` wraps a [`reqwest::Client`] and an [`Extractor`], fetching
/// one week of the program per request and extracting a competition from it.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> iddaa_scraper::Result<()> {
/// use iddaa_scraper::{CompetitionPreset, IddaaClient};
///
/// let client = IddaaClient::new()?;
/// let week = client.get_current_week().await?;
/// let batch = client
///     .get_week(week, &CompetitionPreset::SuperLig.into())
///     .await?;
/// println!("Found {} matches", batch.len());
/// # Ok(())
/// # }
/// ```
pub struct IddaaClient {
    http: reqwest::Client,
    extractor: Extractor,
    base_url: String,
    request_delay: Duration,
}

impl IddaaClient {
    /// Create a new client with a cookie store, as the table endpoint expects
    /// a session opened on the landing page.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| IddaaError::Http {
                url: BASE_URL.to_owned(),
                source: e,
            })?;
        Self::with_client(http)
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            http: client,
            extractor: Extractor::new()?,
            base_url: BASE_URL.to_owned(),
            request_delay: DEFAULT_REQUEST_DELAY,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Pause between consecutive week requests in [`IddaaClient::collect_weeks`].
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// The week the program currently shows.
    #[instrument(skip(self))]
    pub async fn get_current_week(&self) -> Result<u32> {
        let body = self.get_text(TABLE_PATH, &[]).await?;
        let week = self
            .extractor
            .current_week(&Html::parse_document(&body))
            .ok_or(IddaaError::ElementNotFound {
                context: "current week option (select#iddaa_daterange)",
            })?;
        debug!(week, "resolved current week");
        Ok(week)
    }

    /// Fetch the raw program table for `week`, ordered by league.
    #[instrument(skip(self))]
    pub async fn get_week_page(&self, week: u32) -> Result<String> {
        self.open_session().await?;

        let week = week.to_string();
        self.get_text(
            TABLE_PATH,
            &[("iddaa_hafta", &week), ("tarih", "*"), ("orderby", "lig")],
        )
        .await
    }

    /// Fetch `week` and extract `competition` from it.
    #[instrument(skip(self, competition), fields(competition = %competition.code))]
    pub async fn get_week(&self, week: u32, competition: &Competition) -> Result<ExtractionBatch> {
        let body = self.get_week_page(week).await?;
        let batch = self.extractor.run_html(&body, competition).with_week(week);
        debug!(week, count = batch.len(), "parsed week");
        Ok(batch)
    }

    /// Collect weeks `from` down to `to` (inclusive) into one deduplicated
    /// dataset. Weeks that fail to fetch are logged and skipped.
    #[instrument(skip(self, competition), fields(competition = %competition.code))]
    pub async fn collect_weeks(
        &self,
        from: u32,
        to: u32,
        competition: &Competition,
    ) -> Result<Dataset> {
        let mut dataset = Dataset::default();
        let mut weeks_collected = 0;

        for week in (to.min(from)..=from.max(to)).rev() {
            if weeks_collected > 0 {
                tokio::time::sleep(self.request_delay).await;
            }
            match self.get_week(week, competition).await {
                Ok(batch) if batch.is_empty() => {
                    debug!(week, diagnostic = ?batch.diagnostic, "no records for week");
                }
                Ok(batch) => {
                    info!(week, count = batch.len(), "collected week");
                    dataset.push_batch(batch);
                }
                Err(e) => warn!(week, error = %e, "skipping week"),
            }
            weeks_collected += 1;
        }

        let removed = dataset.dedup();
        info!(
            weeks = weeks_collected,
            rows = dataset.len(),
            duplicates = removed,
            "collected weeks"
        );
        Ok(dataset)
    }

    /// Visit the landing page so the session cookies are set. Only a failed
    /// request is an error; an error status is logged and the table is
    /// fetched regardless.
    async fn open_session(&self) -> Result<()> {
        let url = self.url(LANDING_PATH, &[])?;
        let response = self.send(&url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = url.as_str(), %status, "landing page returned an error status");
        }
        Ok(())
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = self.url(path, query)?;
        let response = self.send(&url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IddaaError::UnexpectedStatus {
                url: url.into(),
                status,
            });
        }

        response.text().await.map_err(|e| IddaaError::ResponseBody {
            url: url.into(),
            source: e,
        })
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        debug!(url = url.as_str(), "fetching page");
        self.http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| IddaaError::Http {
                url: url.as_str().to_owned(),
                source: e,
            })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let url = format!("{}{path}", self.base_url);
        let parsed = if query.is_empty() {
            Url::parse(&url)
        } else {
            Url::parse_with_params(&url, query)
        };
        parsed.map_err(|_| IddaaError::InvalidUrl(url))
    }
}
