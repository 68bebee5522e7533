use chrono::Local;
use scraper::{Html, Selector};

use crate::extract::element_text;
use crate::records::RawNotice;

const LINK_SELECTOR: &str = r#"a[href*="notice"], a[href*="announce"]"#;
const MAX_ITEMS: usize = 30;
const MIN_TITLE_CHARS: usize = 5;
const SOURCE: &str = "北京大学通知公告";

/// Pull notice records out of a bulletin page: anchors whose href mentions a
/// notice/announcement path, with trivially short link texts dropped.
pub fn extract(html: &str) -> Vec<RawNotice> {
    let doc = Html::parse_document(html);
    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return Vec::new();
    };

    let today = Local::now().format("%Y-%m-%d").to_string();
    let mut notices = Vec::new();

    for link in doc.select(&selector).take(MAX_ITEMS) {
        let title = element_text(&link);
        if title.chars().count() <= MIN_TITLE_CHARS {
            continue;
        }
        notices.push(RawNotice {
            notice_id: format!("notice_{:04}", notices.len() + 1),
            title: Some(title),
            content: None,
            url: Some(link.value().attr("href").unwrap_or("").to_string()),
            date: Some(today.clone()),
            category: None,
            source: Some(SOURCE.to_string()),
            record_type: "notice".to_string(),
            crawl_time: None,
        });
    }

    notices
}
