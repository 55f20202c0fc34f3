//! News search result parser.
//!
//! News hits are server-rendered like web search, with a press name and a
//! publication label ("3시간 전", "2025.08.01.") in the info line.

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// One news search hit
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub press: Option<String>,
    pub summary: Option<String>,
    /// Publication label as displayed; relative ("3시간 전") or absolute
    /// ("2025.08.01.") depending on article age.
    pub published: Option<String>,
}

/// Parser for news search result pages
pub struct NewsParser;

impl NewsParser {
    /// Parse the article list out of a news search page.
    pub fn parse(html: &str) -> Result<Vec<NewsArticle>> {
        let document = Html::parse_document(html);
        let mut articles = Vec::new();

        let item_selectors = ["ul.list_news > li.bx", ".list_news li", ".news_area"];
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
            if let Some(article) = Self::parse_item(&item) {
                articles.push(article);
            }
        }

        Ok(articles)
    }

    fn parse_item(item: &scraper::ElementRef) -> Option<NewsArticle> {
        let mut article = NewsArticle::default();

        if let Ok(sel) = Selector::parse("a.news_tit") {
            if let Some(elem) = item.select(&sel).next() {
                // title attribute holds the untruncated headline
                article.title = elem
                    .value()
                    .attr("title")
                    .map(str::to_string)
                    .unwrap_or_else(|| elem.text().collect::<String>().trim().to_string());
                if let Some(href) = elem.value().attr("href") {
                    article.url = href.to_string();
                }
            }
        }

        if let Ok(sel) = Selector::parse("a.info.press, .info_group a.press") {
            if let Some(elem) = item.select(&sel).next() {
                let mut press = elem.text().collect::<String>().trim().to_string();
                // strip the "선정" badge suffix some press links carry
                if let Some(stripped) = press.strip_suffix("언론사 선정") {
                    press = stripped.trim().to_string();
                }
                if !press.is_empty() {
                    article.press = Some(press);
                }
            }
        }

        if let Ok(sel) = Selector::parse(".news_dsc, a.api_txt_lines.dsc_txt") {
            if let Some(elem) = item.select(&sel).next() {
                let text = elem.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    article.summary = Some(text);
                }
            }
        }

        // Publication label is one of the plain spans in the info group
        if let Ok(sel) = Selector::parse(".info_group span.info") {
            let label_re = Regex::new(r"(\d+(분|시간|일) 전|\d{4}\.\d{2}\.\d{2}\.)").unwrap();
            for elem in item.select(&sel) {
                let text = elem.text().collect::<String>().trim().to_string();
                if label_re.is_match(&text) {
                    article.published = Some(text);
                    break;
                }
            }
        }

        if article.title.is_empty() || article.url.is_empty() {
            return None;
        }

        Some(article)
    }
}
