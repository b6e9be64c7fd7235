//! `search_web` tool and search providers.
//!
//! The tool is a thin adapter: it forwards the query to a [`SearchProvider`]
//! and formats whatever comes back. The bundled provider scrapes the
//! DuckDuckGo HTML endpoint, which needs no API key.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ReckonError;

use super::tool::{AgentTool, Tool, ToolExecutionContext};
use super::types::AgentToolParameters;

pub const SEARCH_TOOL_NAME: &str = "search_web";

pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Reckon/0.1)";
const SEARCH_HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// Something that can answer a web query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ReckonError>;
}

/// DuckDuckGo HTML search.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    base_url: String,
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new(base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(SEARCH_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ReckonError> {
        let url = format!("{}/html/?q={}", self.base_url, urlencoding::encode(query));
        tracing::debug!(query, max_results, "duckduckgo search");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReckonError::Search(format!("search returned HTTP {status}")));
        }
        let html = resp.text().await?;
        Ok(parse_results(&html, max_results))
    }
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)class="result__a"[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#).expect("valid regex")
    })
}

fn snippet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#).expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

/// Extract up to `max_results` hits from a DuckDuckGo HTML result page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    html.split("result__body")
        .skip(1)
        .filter_map(|block| {
            let anchor = anchor_re().captures(block)?;
            let title = clean_text(anchor.get(2)?.as_str());
            if title.is_empty() {
                return None;
            }
            let snippet = snippet_re()
                .captures(block)
                .and_then(|c| c.get(1))
                .map(|m| clean_text(m.as_str()))
                .unwrap_or_default();
            Some(SearchResult {
                title,
                snippet,
                link: resolve_link(anchor.get(1)?.as_str()),
            })
        })
        .take(max_results)
        .collect()
}

fn clean_text(fragment: &str) -> String {
    let stripped = tag_re().replace_all(fragment, "");
    html_decode(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// DuckDuckGo wraps outbound links in a redirect; unwrap the `uddg` target.
fn resolve_link(href: &str) -> String {
    let href = html_decode(href);
    if let Some(start) = href.find("uddg=") {
        let encoded = href[start + 5..].split('&').next().unwrap_or_default();
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    href
}

/// Decode the entities DuckDuckGo emits. `&amp;` goes last so escaped
/// entities such as `&amp;lt;` decode only once.
fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Render results the way the model sees them.
pub fn format_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| format!("snippet: {}, title: {}, link: {}", r.snippet, r.title, r.link))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Results to fetch: the requested count capped by the configured maximum,
/// never fewer than one.
fn result_limit(requested: Option<u64>, max_results: usize) -> usize {
    let max_results = max_results.max(1);
    requested
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX).min(max_results).max(1))
        .unwrap_or(max_results)
}

/// Create the `search_web` tool over `provider`, returning at most
/// `max_results` hits per query.
pub fn search_tool(provider: Arc<dyn SearchProvider>, max_results: usize) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        SEARCH_TOOL_NAME,
        "Search the web for real-world facts (e.g. speeds, distances, dimensions). \
Returns snippets, titles and links of matching pages.",
        AgentToolParameters::object()
            .string("query", "The search query", true)
            .integer("num_results", "Maximum number of results to return", false)
            .build(),
        move |args, _ctx: ToolExecutionContext| {
            let provider = Arc::clone(&provider);
            async move {
                let query = args.get_str("query")?.trim().to_string();
                if query.is_empty() {
                    return Err(ReckonError::InvalidArgument("query must not be empty".into()));
                }
                let limit = result_limit(args.get_u64_opt("num_results"), max_results);

                let results = provider.search(&query, limit).await?;
                if results.is_empty() {
                    return Ok(serde_json::Value::String(format!("No results found for: {query}")));
                }
                Ok(serde_json::Value::String(format_results(&results)))
            }
        },
    ))
}
