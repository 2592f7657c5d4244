//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page that links to the published menu
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP behavior settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Link discovery keywords
    #[serde(default)]
    pub links: LinkConfig,

    /// Date inference window
    #[serde(default)]
    pub dates: DateConfig,

    /// Chunking and pacing of emitted messages
    #[serde(default)]
    pub output: OutputConfig,

    /// User-facing message strings
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let page = url::Url::parse(&self.source.page_url)?;
        if !matches!(page.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "source.page_url must be http(s), got {}",
                page.scheme()
            )));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.page_timeout_secs == 0 {
            return Err(AppError::validation("fetcher.page_timeout_secs must be > 0"));
        }
        if self.fetcher.document_timeout_secs == 0 {
            return Err(AppError::validation(
                "fetcher.document_timeout_secs must be > 0",
            ));
        }
        if self.links.document_suffix.trim().is_empty() {
            return Err(AppError::validation("links.document_suffix is empty"));
        }
        if self.dates.scan_lines == 0 {
            return Err(AppError::validation("dates.scan_lines must be > 0"));
        }
        // Long enough to hold at least one word per chunk.
        if self.output.max_chunk_chars < 16 {
            return Err(AppError::validation("output.max_chunk_chars must be >= 16"));
        }
        Ok(())
    }
}

/// Where the menu is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page containing the link to the menu document
    #[serde(default = "defaults::page_url")]
    pub page_url: String,

    /// Label appended to the date in the header message
    #[serde(default = "defaults::title")]
    pub title: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_url: defaults::page_url(),
            title: defaults::title(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Timeout for the source page in seconds
    #[serde(default = "defaults::page_timeout")]
    pub page_timeout_secs: u64,

    /// Timeout for the document download in seconds
    #[serde(default = "defaults::document_timeout")]
    pub document_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            page_timeout_secs: defaults::page_timeout(),
            document_timeout_secs: defaults::document_timeout(),
        }
    }
}

/// Keywords for the three link tiers. Matching is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Suffix marking a document link (tier 1, also tier 3)
    #[serde(default = "defaults::document_suffix")]
    pub document_suffix: String,

    /// Link text keywords (tier 2)
    #[serde(default = "defaults::text_keywords")]
    pub text_keywords: Vec<String>,

    /// Extra `href` keywords (tier 3)
    #[serde(default = "defaults::href_keywords")]
    pub href_keywords: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            document_suffix: defaults::document_suffix(),
            text_keywords: defaults::text_keywords(),
            href_keywords: defaults::href_keywords(),
        }
    }
}

/// Date inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateConfig {
    /// Number of leading lines scanned for a date
    #[serde(default = "defaults::scan_lines")]
    pub scan_lines: usize,

    /// Accepted distance from today, in days, either direction
    #[serde(default = "defaults::window_days")]
    pub window_days: i64,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            scan_lines: defaults::scan_lines(),
            window_days: defaults::window_days(),
        }
    }
}

/// Output chunking and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Maximum characters per content chunk
    #[serde(default = "defaults::max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Delay between content chunks in milliseconds
    #[serde(default = "defaults::chunk_delay")]
    pub chunk_delay_ms: u64,

    /// Wrap content chunks in a fenced code block
    #[serde(default)]
    pub code_block: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: defaults::max_chunk_chars(),
            chunk_delay_ms: defaults::chunk_delay(),
            code_block: false,
        }
    }
}

/// User-facing message strings.
///
/// `header` understands `{date}`, `{title}` and `{link}`;
/// `failed` understands `{error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "defaults::msg_starting")]
    pub starting: String,
    #[serde(default = "defaults::msg_link_not_found")]
    pub link_not_found: String,
    #[serde(default = "defaults::msg_empty_content")]
    pub empty_content: String,
    #[serde(default = "defaults::msg_failed")]
    pub failed: String,
    #[serde(default = "defaults::msg_header")]
    pub header: String,
    #[serde(default = "defaults::msg_complete")]
    pub complete: String,
    #[serde(default = "defaults::msg_placeholder")]
    pub placeholder: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            starting: defaults::msg_starting(),
            link_not_found: defaults::msg_link_not_found(),
            empty_content: defaults::msg_empty_content(),
            failed: defaults::msg_failed(),
            header: defaults::msg_header(),
            complete: defaults::msg_complete(),
            placeholder: defaults::msg_placeholder(),
        }
    }
}

impl MessagesConfig {
    /// Render the header announcing a menu.
    pub fn render_header(&self, date: &str, title: &str, link: &str) -> String {
        self.header
            .replace("{date}", date)
            .replace("{title}", title)
            .replace("{link}", link)
    }

    /// Render the diagnostic chunk for a failed run.
    pub fn render_failed(&self, error: &str) -> String {
        self.failed.replace("{error}", error)
    }
}

mod defaults {
    // Source defaults
    pub fn page_url() -> String {
        "https://www.blessing.org.tw/%E4%B8%AD%E5%A4%AE%E5%BB%9A%E6%88%BF".into()
    }
    pub fn title() -> String {
        "中央廚房菜單".into()
    }

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn page_timeout() -> u64 {
        15
    }
    pub fn document_timeout() -> u64 {
        30
    }

    // Link defaults
    pub fn document_suffix() -> String {
        ".pdf".into()
    }
    pub fn text_keywords() -> Vec<String> {
        vec!["pdf".into(), "菜單".into(), "餐點".into(), "menu".into()]
    }
    pub fn href_keywords() -> Vec<String> {
        vec!["download".into(), "file".into()]
    }

    // Date defaults
    pub fn scan_lines() -> usize {
        10
    }
    pub fn window_days() -> i64 {
        30
    }

    // Output defaults
    pub fn max_chunk_chars() -> usize {
        1900
    }
    pub fn chunk_delay() -> u64 {
        1000
    }

    // Message defaults
    pub fn msg_starting() -> String {
        "🔄 開始下載並處理PDF文件...".into()
    }
    pub fn msg_link_not_found() -> String {
        "❌ 無法找到PDF連結".into()
    }
    pub fn msg_empty_content() -> String {
        "❌ PDF文字提取失敗或內容為空".into()
    }
    pub fn msg_failed() -> String {
        "❌ 執行任務時發生錯誤: {error}".into()
    }
    pub fn msg_header() -> String {
        "📄 **{date} {title}**\n🔗 原始連結: {link}\n\n**📋 菜單內容:**".into()
    }
    pub fn msg_complete() -> String {
        "✅ PDF內容發布完成！".into()
    }
    pub fn msg_placeholder() -> String {
        "（無內容）".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.fetcher.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_page() {
        let mut config = Config::default();
        config.source.page_url = "ftp://example.com/menu".to_string();
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_rejects_tiny_chunks() {
        let mut config = Config::default();
        config.output.max_chunk_chars = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            page_url = "https://example.com/kitchen"

            [output]
            chunk_delay_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.source.page_url, "https://example.com/kitchen");
        assert_eq!(config.source.title, "中央廚房菜單");
        assert_eq!(config.output.chunk_delay_ms, 0);
        assert_eq!(config.output.max_chunk_chars, 1900);
        assert_eq!(config.fetcher.document_timeout_secs, 30);
        assert_eq!(config.dates.scan_lines, 10);
    }

    #[test]
    fn header_template_substitutes_all_fields() {
        let messages = MessagesConfig::default();
        let header = messages.render_header("2024年7月9日 星期二", "菜單", "https://x/a.pdf");
        assert!(header.starts_with("📄 **2024年7月9日 星期二 菜單**"));
        assert!(header.contains("https://x/a.pdf"));
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let sample: Config = toml::from_str(include_str!("../../menu-relay.toml")).unwrap();
        let defaults = Config::default();

        assert!(sample.validate().is_ok());
        assert_eq!(sample.source.page_url, defaults.source.page_url);
        assert_eq!(sample.fetcher.user_agent, defaults.fetcher.user_agent);
        assert_eq!(sample.links.text_keywords, defaults.links.text_keywords);
        assert_eq!(sample.messages.header, defaults.messages.header);
        assert_eq!(sample.messages.failed, defaults.messages.failed);
    }
}
