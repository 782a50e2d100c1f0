//! Wikipedia lead-paragraph extractor
//!
//! Collects the introductory paragraph of random articles through the
//! MediaWiki API, as source text for question sets.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

const USER_AGENT: &str = concat!(
    "answer-benchmark-wiki/",
    env!("CARGO_PKG_VERSION"),
    " (random article intro extractor)"
);

/// Pause between API requests
pub const REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Attempts allowed per requested article
pub const ATTEMPTS_PER_ARTICLE: usize = 3;

/// One extracted article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub intro: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<ApiQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    fullurl: String,
}

/// Client for the random-article endpoint of one Wikipedia language
pub struct WikiClient {
    http: reqwest::Client,
    lang: String,
    delay: Duration,
}

impl WikiClient {
    pub fn new(lang: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            lang: lang.into(),
            delay: REQUEST_DELAY,
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn api_url(&self) -> String {
        format!("https://{}.wikipedia.org/w/api.php", self.lang)
    }

    /// One random main-namespace article. `None` when it has no usable intro.
    pub async fn fetch_random_article(&self) -> Result<Option<Article>> {
        let body = self
            .http
            .get(self.api_url())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "random"),
                ("grnnamespace", "0"),
                ("grnlimit", "1"),
                ("prop", "extracts|info"),
                ("explaintext", "1"),
                ("inprop", "url"),
            ])
            .send()
            .await
            .context("Wikipedia request failed")?
            .error_for_status()?
            .text()
            .await?;

        parse_random_page(&body)
    }

    /// Gather `count` articles with a non-empty intro.
    ///
    /// Failed requests and empty intros are retried, up to
    /// `count * ATTEMPTS_PER_ARTICLE` requests in total.
    pub async fn collect_articles(&self, count: usize) -> Vec<Article> {
        let max_attempts = count.saturating_mul(ATTEMPTS_PER_ARTICLE);
        let mut articles = Vec::with_capacity(count);
        let mut attempts = 0;

        while articles.len() < count && attempts < max_attempts {
            attempts += 1;
            let position = articles.len() + 1;

            match self.fetch_random_article().await {
                Ok(Some(article)) => {
                    eprintln!("[{}/{}] {}", position, count, article.title);
                    articles.push(article);
                }
                Ok(None) => eprintln!("[{}/{}] skipped (no intro)", position, count),
                Err(e) => tracing::warn!("[{}/{}] {:#}", position, count, e),
            }

            if articles.len() < count && attempts < max_attempts && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        if articles.len() < count {
            tracing::warn!(
                "Collected {} of {} articles after {} attempts",
                articles.len(),
                count,
                attempts
            );
        }
        articles
    }
}

/// Article from a `generator=random` response body
pub fn parse_random_page(body: &str) -> Result<Option<Article>> {
    let response: ApiResponse = serde_json::from_str(body).context("Invalid MediaWiki response")?;
    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .context("MediaWiki response has no page")?;

    let intro = lead_paragraph(&page.extract);
    if intro.is_empty() {
        return Ok(None);
    }
    Ok(Some(Article {
        title: page.title,
        intro,
        url: page.fullurl,
    }))
}

/// First non-empty blank-line separated block that is not a section heading
pub fn lead_paragraph(text: &str) -> String {
    text.split("\n\n")
        .find(|block| !block.is_empty() && !block.starts_with("=="))
        .map(clean_text)
        .unwrap_or_default()
}

/// Collapse whitespace runs and drop `[n]` citation markers
pub fn clean_text(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static CITATION: OnceLock<Regex> = OnceLock::new();

    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    let citation = CITATION.get_or_init(|| Regex::new(r"\[\d+\]").expect("valid regex"));

    let collapsed = whitespace.replace_all(text, " ");
    citation.replace_all(&collapsed, "").trim().to_string()
}

/// `# title`, intro, `URL: url` and a `---` separator per article
pub fn render_annotated(articles: &[Article]) -> String {
    let mut out = String::new();
    for article in articles {
        out.push_str(&format!("# {}\n", article.title));
        out.push_str(&format!("{}\n", article.intro));
        out.push_str(&format!("URL: {}\n", article.url));
        out.push_str("\n---\n\n");
    }
    out
}

/// Intros only, separated by blank lines
pub fn render_plain(articles: &[Article]) -> String {
    articles.iter().map(|a| format!("{}\n\n", a.intro)).collect()
}

pub fn save_annotated(path: &Path, articles: &[Article]) -> Result<()> {
    std::fs::write(path, render_annotated(articles))
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn save_plain(path: &Path, articles: &[Article]) -> Result<()> {
    std::fs::write(path, render_plain(articles))
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, intro: &str) -> Article {
        Article {
            title: title.to_string(),
            intro: intro.to_string(),
            url: format!("https://ja.wikipedia.org/wiki/{}", title),
        }
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  東京都は[1]日本の\n首都[23]である。  "), "東京都は日本の 首都である。");
        assert_eq!(clean_text("a\t\tb   c"), "a b c");
        assert_eq!(clean_text("[note] stays"), "[note] stays");
    }

    #[test]
    fn test_lead_paragraph_skips_headings() {
        let text = "== 概要 ==\n\nRust[1] は  プログラミング言語である。\n\n== 歴史 ==\n\n2010年に発表された。";
        assert_eq!(lead_paragraph(text), "Rust は プログラミング言語である。");
    }

    #[test]
    fn test_lead_paragraph_empty() {
        assert_eq!(lead_paragraph(""), "");
        assert_eq!(lead_paragraph("== 見出し ==\n\n== 別 =="), "");
    }

    #[test]
    fn test_parse_random_page() {
        let body = r#"{
            "batchcomplete": true,
            "query": {"pages": [{
                "pageid": 42,
                "ns": 0,
                "title": "富士山",
                "extract": "富士山は[2]日本の最高峰である。\n\n== 地理 ==\n\n標高3776m。",
                "fullurl": "https://ja.wikipedia.org/wiki/%E5%AF%8C%E5%A3%AB%E5%B1%B1"
            }]}
        }"#;

        let article = parse_random_page(body).unwrap().unwrap();
        assert_eq!(article.title, "富士山");
        assert_eq!(article.intro, "富士山は日本の最高峰である。");
        assert!(article.url.starts_with("https://ja.wikipedia.org/wiki/"));
    }

    #[test]
    fn test_parse_random_page_without_intro() {
        let body = r#"{"query": {"pages": [{"title": "空", "extract": ""}]}}"#;
        assert_eq!(parse_random_page(body).unwrap(), None);
    }

    #[test]
    fn test_parse_random_page_errors() {
        assert!(parse_random_page("not json").is_err());
        assert!(parse_random_page(r#"{"batchcomplete": true}"#).is_err());
    }

    #[test]
    fn test_render_annotated() {
        let out = render_annotated(&[article("A", "intro a")]);
        assert_eq!(out, "# A\nintro a\nURL: https://ja.wikipedia.org/wiki/A\n\n---\n\n");
    }

    #[test]
    fn test_save_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        save_plain(&path, &[article("A", "intro a"), article("B", "intro b")]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "intro a\n\nintro b\n\n");
    }

    #[test]
    fn test_api_url() {
        let client = WikiClient::new("en").unwrap();
        assert_eq!(client.api_url(), "https://en.wikipedia.org/w/api.php");
    }

    #[tokio::test]
    async fn test_collect_zero_articles_makes_no_requests() {
        let client = WikiClient::new("ja").unwrap().with_delay(Duration::ZERO);
        assert!(client.collect_articles(0).await.is_empty());
    }
}
