// src/services/links.rs

//! Link discovery on the source page.
//!
//! The page is scanned with an ordered list of [`LinkRule`]s. Every anchor is
//! tried against the first rule before any anchor is tried against the next,
//! so a tier-1 match always beats a tier-2 or tier-3 match further up the page.

use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::error::FetchError;
use crate::models::{CandidateLink, FetcherConfig, LinkConfig, LinkTier, SourcePage};
use crate::services::Fetch;
use crate::utils::resolve_url;

/// Part of an anchor a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorField {
    Href,
    Text,
}

/// A hyperlink as it appears on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// One link heuristic: a field plus the needles that must appear in it.
#[derive(Debug, Clone)]
pub struct LinkRule {
    pub tier: LinkTier,
    pub field: AnchorField,
    needles: Vec<String>,
}

impl LinkRule {
    pub fn new(tier: LinkTier, field: AnchorField, needles: &[String]) -> Self {
        Self {
            tier,
            field,
            needles: needles
                .iter()
                .map(|n| n.to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive containment test on the rule's field.
    pub fn matches(&self, anchor: &Anchor) -> bool {
        let haystack = match self.field {
            AnchorField::Href => anchor.href.to_lowercase(),
            AnchorField::Text => anchor.text.to_lowercase(),
        };
        self.needles.iter().any(|n| haystack.contains(n.as_str()))
    }
}

/// Build the three tiers from configuration.
pub fn default_rules(config: &LinkConfig) -> Vec<LinkRule> {
    let suffix = vec![config.document_suffix.clone()];
    let mut download = suffix.clone();
    download.extend(config.href_keywords.iter().cloned());

    vec![
        LinkRule::new(LinkTier::Suffix, AnchorField::Href, &suffix),
        LinkRule::new(LinkTier::Keyword, AnchorField::Text, &config.text_keywords),
        LinkRule::new(LinkTier::Download, AnchorField::Href, &download),
    ]
}

/// Collect every `<a href>` in document order.
pub fn collect_anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = el.text().collect::<String>();
            Some(Anchor {
                href: href.to_string(),
                text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            })
        })
        .collect()
}

/// Apply the rules in order; first resolvable match wins.
pub fn find_link(page: &SourcePage, rules: &[LinkRule]) -> Option<CandidateLink> {
    let anchors = collect_anchors(&page.html);
    log::debug!("Found {} anchors on {}", anchors.len(), page.url);

    rules.iter().find_map(|rule| {
        anchors
            .iter()
            .filter(|anchor| rule.matches(anchor))
            .find_map(|anchor| resolve_url(&page.url, &anchor.href))
            .map(|url| CandidateLink {
                url,
                tier: rule.tier,
            })
    })
}

/// Fetches the source page and picks the document link.
pub struct LinkResolver<'a> {
    fetcher: &'a dyn Fetch,
    rules: Vec<LinkRule>,
    timeout: Duration,
}

impl<'a> LinkResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetch, fetcher_config: &FetcherConfig, links: &LinkConfig) -> Self {
        Self {
            fetcher,
            rules: default_rules(links),
            timeout: Duration::from_secs(fetcher_config.page_timeout_secs),
        }
    }

    /// Fetch `page_url` and return the document link, or `None` when no
    /// heuristic matched.
    pub async fn resolve(&self, page_url: &Url) -> Result<Option<CandidateLink>, FetchError> {
        log::info!("Fetching source page: {}", page_url);
        let bytes = self.fetcher.fetch_bytes(page_url, self.timeout).await?;
        let page = SourcePage {
            url: page_url.clone(),
            html: String::from_utf8_lossy(&bytes).into_owned(),
        };

        let link = find_link(&page, &self.rules);
        match &link {
            Some(link) => log::info!("Found document link ({}): {}", link.tier, link.url),
            None => log::warn!("No document link found on {}", page_url),
        }
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> SourcePage {
        SourcePage {
            url: Url::parse("https://kitchen.example.org/center/menu-page").unwrap(),
            html: html.to_string(),
        }
    }

    fn rules() -> Vec<LinkRule> {
        default_rules(&LinkConfig::default())
    }

    #[test]
    fn suffix_link_wins_over_earlier_keyword_link() {
        let html = r#"
            <a href="/news">本週菜單</a>
            <a href="/download?id=3">下載</a>
            <a href="files/week32.PDF">week 32</a>
        "#;
        let link = find_link(&page(html), &rules()).unwrap();
        assert_eq!(link.tier, LinkTier::Suffix);
        assert_eq!(
            link.url.as_str(),
            "https://kitchen.example.org/center/files/week32.PDF"
        );
    }

    #[test]
    fn first_suffix_match_in_document_order_wins() {
        let html = r#"<a href="/a.pdf">a</a><a href="/b.pdf">b</a>"#;
        let link = find_link(&page(html), &rules()).unwrap();
        assert_eq!(link.url.path(), "/a.pdf");
    }

    #[test]
    fn keyword_text_is_tier_two() {
        let html = r#"
            <a href="/download/77">附件</a>
            <a href="/doc/view?id=9"> 七月 菜單 </a>
        "#;
        let link = find_link(&page(html), &rules()).unwrap();
        assert_eq!(link.tier, LinkTier::Keyword);
        assert_eq!(link.url.as_str(), "https://kitchen.example.org/doc/view?id=9");
    }

    #[test]
    fn download_href_is_tier_three() {
        let html = r#"<a href="/about">關於我們</a><a href="/File/Get/12">附件</a>"#;
        let link = find_link(&page(html), &rules()).unwrap();
        assert_eq!(link.tier, LinkTier::Download);
        assert_eq!(link.url.path(), "/File/Get/12");
    }

    #[test]
    fn no_match_is_none() {
        let html = r##"<a href="/about">關於我們</a><a href="#top">top</a>"##;
        assert!(find_link(&page(html), &rules()).is_none());
    }

    #[test]
    fn unresolvable_match_falls_through_to_next_anchor() {
        let html = r#"
            <a href="javascript:openMenu('x.pdf')">menu</a>
            <a href="/real.pdf">real</a>
        "#;
        let link = find_link(&page(html), &rules()).unwrap();
        assert_eq!(link.url.path(), "/real.pdf");
    }

    #[test]
    fn anchors_without_href_are_ignored() {
        let anchors = collect_anchors(r#"<a name="x">菜單</a><a href="">菜單</a>"#);
        assert!(anchors.is_empty());
    }
}
