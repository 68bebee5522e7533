use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use scraper::{Html, Selector};

use crate::extract::{element_text, first_matching, SelectorRule};
use crate::records::RawNews;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

const LIST_RULES: &[SelectorRule] = &[
    SelectorRule { selector: ".news-list li", min_items: 3 },
    SelectorRule { selector: ".list li", min_items: 3 },
    SelectorRule { selector: ".article-list li", min_items: 3 },
    SelectorRule { selector: "ul li a", min_items: 3 },
    SelectorRule { selector: ".item", min_items: 3 },
    SelectorRule { selector: ".news-item", min_items: 3 },
];

const SUMMARY_SELECTOR: &str = ".summary, .intro, .description";
const MAX_ITEMS: usize = 20;
const MAX_TITLE: usize = 100;
const MAX_SUMMARY: usize = 200;
const SOURCE: &str = "北京大学新闻网";

/// Title keyword → category, scanned in order; first match wins.
pub const TITLE_CATEGORIES: &[(&str, &str)] = &[
    ("学术", "学术动态"),
    ("科研", "科研成果"),
    ("会议", "会议活动"),
    ("讲座", "学术讲座"),
    ("获奖", "荣誉表彰"),
    ("合作", "国际交流"),
    ("视察", "领导关怀"),
];

pub const DEFAULT_TITLE_CATEGORY: &str = "校园动态";

pub fn categorize_title(title: &str) -> &'static str {
    TITLE_CATEGORIES
        .iter()
        .find(|(keyword, _)| title.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_TITLE_CATEGORY)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Pull news records out of one section listing page. `base_host` qualifies
/// root-relative hrefs, `base_dir` qualifies directory-relative ones, and
/// `start` continues the id sequence across section pages.
pub fn extract(html: &str, base_host: &str, base_dir: &str, start: usize) -> Vec<RawNews> {
    let doc = Html::parse_document(html);
    let Some(items) = first_matching(&doc, LIST_RULES) else {
        return Vec::new();
    };
    let Ok(link_selector) = Selector::parse("a") else {
        return Vec::new();
    };
    let Ok(summary_selector) = Selector::parse(SUMMARY_SELECTOR) else {
        return Vec::new();
    };

    let today = Local::now().format("%Y-%m-%d").to_string();
    let crawl_time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut news = Vec::new();

    for item in items.iter().take(MAX_ITEMS) {
        // Items without a link carry no story; skip them.
        let Some(link) = item.select(&link_selector).next() else {
            continue;
        };
        let title = element_text(&link);

        let href = link.value().attr("href").unwrap_or("").to_string();
        let url = if !href.is_empty() && !href.starts_with("http") {
            if href.starts_with('/') {
                format!("{base_host}{href}")
            } else {
                format!("{base_dir}{href}")
            }
        } else {
            href
        };

        let date = DATE_RE
            .captures(&item.html())
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| today.clone());

        let summary = item
            .select(&summary_selector)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_else(|| format!("北京大学相关新闻：{title}"));

        news.push(RawNews {
            news_id: format!("news_{:04}", start + news.len() + 1),
            title: Some(truncate_chars(&title, MAX_TITLE)),
            summary: Some(truncate_chars(&summary, MAX_SUMMARY)),
            content: None,
            url: Some(url),
            date: Some(date),
            category: Some(categorize_title(&title).to_string()),
            source: Some(SOURCE.to_string()),
            record_type: "news".to_string(),
            crawl_time: Some(crawl_time.clone()),
        });
    }

    news
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "http://news.example.edu.cn";
    const DIR: &str = "http://news.example.edu.cn/xwzh/";

    fn section(items: &[&str]) -> String {
        let lis: String = items.iter().map(|t| format!("<li>{t}</li>")).collect();
        format!("<ul class=\"news-list\">{lis}</ul>")
    }

    #[test]
    fn anchor_supplies_title_and_url() {
        let html = section(&[
            r#"<a href="http://other.example.com/a1">学校召开学术会议</a> 2024-03-05"#,
            r#"<a href="/zyxw/a2.htm">实验室科研平台启用</a>"#,
            r#"<a href="a3.htm">师生讲座预告</a>"#,
            r#"<span>no link here</span>"#,
        ]);
        let news = extract(&html, HOST, DIR, 0);
        assert_eq!(news.len(), 3);
        assert_eq!(news[0].url.as_deref(), Some("http://other.example.com/a1"));
        assert_eq!(
            news[1].url.as_deref(),
            Some("http://news.example.edu.cn/zyxw/a2.htm")
        );
        assert_eq!(
            news[2].url.as_deref(),
            Some("http://news.example.edu.cn/xwzh/a3.htm")
        );
        assert_eq!(news[0].date.as_deref(), Some("2024-03-05"));
        // No date in markup: today is substituted.
        let today = Local::now().format("%Y-%m-%d").to_string();
        assert_eq!(news[1].date.as_deref(), Some(today.as_str()));
    }

    #[test]
    fn ids_continue_from_start() {
        let html = section(&[
            r#"<a href="a.htm">一</a>"#,
            r#"<a href="b.htm">二</a>"#,
            r#"<a href="c.htm">三</a>"#,
            r#"<a href="d.htm">四</a>"#,
        ]);
        let news = extract(&html, HOST, DIR, 40);
        assert_eq!(news[0].news_id, "news_0041");
        assert_eq!(news[3].news_id, "news_0044");
    }

    #[test]
    fn summary_element_preferred_over_placeholder() {
        let html = section(&[
            r#"<a href="a.htm">标题甲</a><p class="summary">编辑撰写的摘要</p>"#,
            r#"<a href="b.htm">标题乙</a>"#,
            r#"<a href="c.htm">标题丙</a>"#,
            r#"<a href="d.htm">标题丁</a>"#,
        ]);
        let news = extract(&html, HOST, DIR, 0);
        assert_eq!(news[0].summary.as_deref(), Some("编辑撰写的摘要"));
        assert_eq!(news[1].summary.as_deref(), Some("北京大学相关新闻：标题乙"));
    }

    #[test]
    fn title_and_summary_are_truncated() {
        let long = "长".repeat(300);
        let row = format!("<a href=\"a.htm\">{long}</a>");
        let html = section(&[
            row.as_str(),
            "<a href=\"b\">x</a>",
            "<a href=\"c\">y</a>",
            "<a href=\"d\">z</a>",
        ]);
        let news = extract(&html, HOST, DIR, 0);
        assert_eq!(news[0].title.as_ref().unwrap().chars().count(), 100);
        assert_eq!(news[0].summary.as_ref().unwrap().chars().count(), 200);
    }

    #[test]
    fn keyword_categories_first_match_wins() {
        assert_eq!(categorize_title("学校召开学术会议"), "学术动态");
        assert_eq!(categorize_title("科研团队获奖"), "科研成果");
        assert_eq!(categorize_title("新学期讲座安排"), "学术讲座");
        assert_eq!(categorize_title("校园春季长跑"), "校园动态");
    }

    #[test]
    fn news_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/news.html").unwrap();
        let news = extract(&html, HOST, DIR, 0);
        assert!(news.len() >= 4);
        assert!(news.iter().all(|n| n.url.is_some() && n.date.is_some()));
    }
}
