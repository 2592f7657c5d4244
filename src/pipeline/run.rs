//! One complete relay run: page → link → document → text → messages.
//!
//! A run never fails outward. Every error is converted into a single
//! diagnostic chunk on the sink and recorded in the [`RunReport`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::pipeline::render_menu;
use crate::services::{DocumentFetcher, Fetch, LinkResolver, TextExtractor, extract_blocking};
use crate::sink::{ChunkSink, emit_paced};
use crate::utils::preview;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Published,
    LinkNotFound,
    EmptyContent,
    Failed,
}

/// Summary of a single run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub link: Option<String>,
    pub tier: Option<u8>,
    pub date_label: Option<String>,
    /// False when the label fell back to today's date
    pub date_inferred: bool,
    /// Content chunks emitted, excluding announcements
    pub chunk_count: usize,
    pub digest: Option<String>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            status: RunStatus::Failed,
            link: None,
            tier: None,
            date_label: None,
            date_inferred: false,
            chunk_count: 0,
            digest: None,
            error: None,
            started_at: now,
            finished_at: now,
        }
    }
}

/// Collaborators a run talks to.
pub struct RunDeps<'a> {
    pub fetcher: &'a dyn Fetch,
    pub extractor: Arc<dyn TextExtractor>,
    pub sink: &'a dyn ChunkSink,
}

/// Execute one run. `today` anchors date inference and the fallback label.
pub async fn run_once(config: &Config, deps: &RunDeps<'_>, today: NaiveDate) -> RunReport {
    let mut report = RunReport::new();

    let outcome = execute(config, deps, today, &mut report).await;
    let notice = match outcome {
        Ok(status) => {
            report.status = status;
            None
        }
        Err(AppError::EmptyContent) => {
            log::warn!("Document had no usable text");
            report.status = RunStatus::EmptyContent;
            Some(config.messages.empty_content.clone())
        }
        Err(e) => {
            log::error!("Run failed: {}", e);
            report.status = RunStatus::Failed;
            report.error = Some(e.to_string());
            Some(config.messages.render_failed(&e.to_string()))
        }
    };

    if let Some(notice) = notice {
        if let Err(e) = deps.sink.emit(&notice).await {
            log::error!("Could not deliver diagnostic message: {}", e);
        }
    }

    report.finished_at = Utc::now();
    log::info!(
        "Run finished: {:?} ({} content chunk(s))",
        report.status,
        report.chunk_count
    );
    report
}

async fn execute(
    config: &Config,
    deps: &RunDeps<'_>,
    today: NaiveDate,
    report: &mut RunReport,
) -> Result<RunStatus> {
    let messages = &config.messages;
    deps.sink.emit(&messages.starting).await?;

    let page_url = Url::parse(&config.source.page_url)?;
    let resolver = LinkResolver::new(deps.fetcher, &config.fetcher, &config.links);
    let Some(link) = resolver.resolve(&page_url).await? else {
        deps.sink.emit(&messages.link_not_found).await?;
        return Ok(RunStatus::LinkNotFound);
    };
    report.link = Some(link.url.to_string());
    report.tier = Some(link.tier.number());

    let document = DocumentFetcher::new(deps.fetcher, &config.fetcher)
        .fetch(&link.url)
        .await?;
    report.digest = Some(document.digest());

    let text = extract_blocking(Arc::clone(&deps.extractor), document.bytes).await?;
    log::info!(
        "Extracted {} line(s), {} character(s)",
        text.lines().len(),
        text.char_count()
    );
    log::debug!("Text begins: {}", preview(&text.to_text(), 80));

    let menu = render_menu(config, &text, today)?;
    report.date_label = Some(menu.date_label.clone());
    report.date_inferred = menu.inferred.is_some();

    let header = messages.render_header(&menu.date_label, &config.source.title, link.url.as_str());
    deps.sink.emit(&header).await?;

    let contents = menu.content_messages(config.output.code_block);
    let delay = Duration::from_millis(config.output.chunk_delay_ms);
    report.chunk_count = emit_paced(deps.sink, &contents, delay).await?;

    deps.sink.emit(&messages.complete).await?;
    Ok(RunStatus::Published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::{ExtractionError, FetchError};
    use crate::models::ExtractedText;
    use crate::services::PlainTextExtractor;
    use crate::sink::MemorySink;

    const PAGE: &str = r#"<html><body><a href="/files/july.pdf">七月菜單</a></body></html>"#;

    /// Serves `page` for every URL except `.pdf` paths, which get `document`.
    struct StubFetch {
        page: &'static str,
        document: std::result::Result<&'static str, u16>,
    }

    #[async_trait]
    impl Fetch for StubFetch {
        async fn fetch_bytes(
            &self,
            url: &Url,
            _timeout: Duration,
        ) -> std::result::Result<Vec<u8>, FetchError> {
            if !url.path().ends_with(".pdf") {
                return Ok(self.page.as_bytes().to_vec());
            }
            match self.document {
                Ok(body) => Ok(body.as_bytes().to_vec()),
                Err(status) => Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                }),
            }
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.source.page_url = "https://kitchen.example.org/menu".to_string();
        config.output.chunk_delay_ms = 0;
        config
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 12).unwrap()
    }

    async fn run(fetch: StubFetch, extractor: Arc<dyn TextExtractor>) -> (RunReport, Vec<String>) {
        let sink = MemorySink::new();
        let deps = RunDeps {
            fetcher: &fetch,
            extractor,
            sink: &sink,
        };
        let report = run_once(&config(), &deps, today()).await;
        (report, sink.chunks())
    }

    #[tokio::test]
    async fn published_run_emits_announcements_around_content() {
        let fetch = StubFetch {
            page: PAGE,
            document: Ok("2024年7月9日 星期二\n\n午餐\n\n白飯  雞腿"),
        };
        let (report, chunks) = run(fetch, Arc::new(PlainTextExtractor)).await;

        assert_eq!(report.status, RunStatus::Published);
        assert_eq!(report.tier, Some(1));
        assert_eq!(report.chunk_count, 1);
        assert!(report.date_inferred);

        let config = config();
        let messages = &config.messages;
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], messages.starting);
        assert!(chunks[1].starts_with("📄 **2024年7月9日 星期二 中央廚房菜單**"));
        assert!(chunks[1].contains("https://kitchen.example.org/files/july.pdf"));
        assert!(chunks[2].contains("**午餐**"));
        assert_eq!(chunks[3], messages.complete);
    }

    #[tokio::test]
    async fn missing_link_is_reported_not_failed() {
        let fetch = StubFetch {
            page: "<a href='/about'>關於</a>",
            document: Ok(""),
        };
        let (report, chunks) = run(fetch, Arc::new(PlainTextExtractor)).await;

        assert_eq!(report.status, RunStatus::LinkNotFound);
        assert_eq!(chunks, [config().messages.starting, config().messages.link_not_found]);
    }

    #[tokio::test]
    async fn fetch_failure_becomes_one_diagnostic_chunk() {
        let fetch = StubFetch {
            page: PAGE,
            document: Err(404),
        };
        let (report, chunks) = run(fetch, Arc::new(PlainTextExtractor)).await;

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].starts_with("❌ 執行任務時發生錯誤: "));
        assert!(chunks[1].contains("HTTP 404"));
    }

    struct Exploding;

    impl TextExtractor for Exploding {
        fn extract(&self, _bytes: &[u8]) -> std::result::Result<ExtractedText, ExtractionError> {
            panic!("corrupt stream");
        }
    }

    #[tokio::test]
    async fn extractor_panic_does_not_escape_the_run() {
        let fetch = StubFetch {
            page: PAGE,
            document: Ok("%PDF-1.4"),
        };
        let (report, chunks) = run(fetch, Arc::new(Exploding)).await;

        assert_eq!(report.status, RunStatus::Failed);
        assert!(report.error.unwrap().contains("aborted"));
        assert!(chunks.last().unwrap().starts_with("❌"));
    }

    #[tokio::test]
    async fn blank_document_is_empty_content() {
        let fetch = StubFetch {
            page: PAGE,
            document: Ok("  \n\n\t"),
        };
        let (report, chunks) = run(fetch, Arc::new(PlainTextExtractor)).await;

        assert_eq!(report.status, RunStatus::EmptyContent);
        assert_eq!(chunks.last().unwrap(), &config().messages.empty_content);
    }

    #[tokio::test]
    async fn rejecting_sink_still_returns_a_report() {
        let fetch = StubFetch {
            page: PAGE,
            document: Ok("午餐"),
        };
        let sink = MemorySink::rejecting_after(0);
        let deps = RunDeps {
            fetcher: &fetch,
            extractor: Arc::new(PlainTextExtractor),
            sink: &sink,
        };
        let report = run_once(&config(), &deps, today()).await;

        assert_eq!(report.status, RunStatus::Failed);
        assert!(sink.chunks().is_empty());
    }

    #[test]
    fn report_serializes_status_in_snake_case() {
        let mut report = RunReport::new();
        report.status = RunStatus::LinkNotFound;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "link_not_found");
    }
}
