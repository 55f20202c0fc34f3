//! Integrated web search result parser.
//!
//! The result list is server-rendered; each organic hit carries a title
//! anchor, a snippet, and usually a source label.

use anyhow::Result;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// One organic search hit
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub source: Option<String>,
}

/// Parser for integrated search result pages
pub struct SearchResultParser;

impl SearchResultParser {
    /// Parse the organic results out of a search page.
    pub fn parse(html: &str) -> Result<Vec<SearchHit>> {
        let document = Html::parse_document(html);
        let mut hits = Vec::new();

        // Result items; markup varies between result blocks
        let item_selectors = ["li.bx", ".lst_total > li", ".total_wrap"];
        let mut items = Vec::new();
        for sel_str in item_selectors {
            if let Ok(selector) = Selector::parse(sel_str) {
                items = document.select(&selector).collect();
                if !items.is_empty() {
                    break;
                }
            }
        }

        for item in items {
            if let Some(hit) = Self::parse_item(&item) {
                hits.push(hit);
            }
        }

        Ok(hits)
    }

    fn parse_item(item: &scraper::ElementRef) -> Option<SearchHit> {
        let mut hit = SearchHit::default();

        // Title anchor carries the outbound link
        for sel_str in ["a.total_tit", ".total_tit a", "a.api_txt_lines.total_tit"] {
            if let Ok(sel) = Selector::parse(sel_str) {
                if let Some(elem) = item.select(&sel).next() {
                    hit.title = elem.text().collect::<String>().trim().to_string();
                    if let Some(href) = elem.value().attr("href") {
                        hit.url = href.to_string();
                    }
                    break;
                }
            }
        }

        // Snippet
        if let Ok(sel) = Selector::parse(".api_txt_lines.dsc_txt, .total_dsc, .dsc_txt") {
            if let Some(elem) = item.select(&sel).next() {
                let text = elem.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    hit.description = Some(text);
                }
            }
        }

        // Source label (site name)
        if let Ok(sel) = Selector::parse(".sub_txt.sub_name, a.sub_txt, .source_box .name") {
            if let Some(elem) = item.select(&sel).next() {
                let text = elem.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    hit.source = Some(text);
                }
            }
        }

        if hit.title.is_empty() || hit.url.is_empty() {
            return None;
        }

        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<ul class="lst_total">
  <li class="bx">
    <div class="total_wrap">
      <a href="https://blog.example.com/rust-intro" class="api_txt_lines total_tit">러스트 입문 가이드</a>
      <div class="total_dsc_wrap">
        <a class="api_txt_lines dsc_txt" href="https://blog.example.com/rust-intro">소유권과 빌림부터 시작하는 러스트 기초 정리.</a>
      </div>
      <a class="sub_txt sub_name" href="https://blog.example.com">개발 블로그</a>
    </div>
  </li>
  <li class="bx">
    <div class="total_wrap">
      <a href="https://news.example.com/article/1" class="api_txt_lines total_tit">시스템 언어 동향</a>
    </div>
  </li>
  <li class="bx">
    <div class="total_wrap">
      <span class="no_link">링크 없는 항목</span>
    </div>
  </li>
</ul>
</body>
</html>"#;

    #[test]
    fn test_parse_hits() {
        let hits = SearchResultParser::parse(SAMPLE_HTML).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "러스트 입문 가이드");
        assert_eq!(hits[0].url, "https://blog.example.com/rust-intro");
        assert_eq!(
            hits[0].description.as_deref(),
            Some("소유권과 빌림부터 시작하는 러스트 기초 정리.")
        );
        assert_eq!(hits[0].source.as_deref(), Some("개발 블로그"));
    }

    #[test]
    fn test_hit_without_snippet() {
        let hits = SearchResultParser::parse(SAMPLE_HTML).unwrap();

        assert_eq!(hits[1].title, "시스템 언어 동향");
        assert!(hits[1].description.is_none());
        assert!(hits[1].source.is_none());
    }

    #[test]
    fn test_item_without_link_is_skipped() {
        let hits = SearchResultParser::parse(SAMPLE_HTML).unwrap();
        assert!(hits.iter().all(|h| !h.url.is_empty()));
    }

    #[test]
    fn test_empty_document() {
        let hits = SearchResultParser::parse("<html></html>").unwrap();
        assert!(hits.is_empty());
    }
}
