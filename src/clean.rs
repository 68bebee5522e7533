use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

use crate::records::*;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4})").unwrap());

/// Remove exact-duplicate rows, keeping the first occurrence. Equality is
/// full-row: two rows are duplicates only when every field matches.
fn dedup_rows<T: Serialize>(rows: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| match serde_json::to_string(row) {
            Ok(key) => seen.insert(key),
            Err(_) => true,
        })
        .collect()
}

/// First 4-digit substring as the year, else the fixed default.
fn coerce_year(value: Option<&str>) -> i64 {
    value
        .and_then(|s| YEAR_RE.captures(s))
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_YEAR)
}

/// Numeric cell to integer: integers pass through, floats truncate, strings
/// parse as integer then float; anything else becomes the default.
fn coerce_int(value: Option<&Scalar>, default: i64) -> i64 {
    match value {
        Some(Scalar::Int(n)) => *n,
        Some(Scalar::Float(f)) => *f as i64,
        Some(Scalar::Text(s)) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(default)
        }
        None => default,
    }
}

/// Calendar date from a handful of accepted shapes; missing or unparseable
/// values collapse to the fixed fallback date.
fn coerce_date(value: Option<&str>) -> NaiveDateTime {
    let Some(raw) = value else {
        return fallback_date();
    };
    let raw = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt;
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, format) {
            return d.and_hms_opt(0, 0, 0).unwrap_or_else(fallback_date);
        }
    }
    fallback_date()
}

fn char_len(value: Option<&str>) -> i64 {
    value.map(|s| s.chars().count() as i64).unwrap_or(0)
}

fn or_default(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}

pub fn clean_books(raw: Vec<RawBook>) -> Vec<CleanBook> {
    if raw.is_empty() {
        return Vec::new();
    }
    dedup_rows(raw)
        .into_iter()
        .map(|b| {
            let year_clean = coerce_year(b.year.as_deref());
            CleanBook {
                book_id: b.book_id,
                title: or_default(b.title, DEFAULT_BOOK_TITLE),
                author: or_default(b.author, DEFAULT_BOOK_AUTHOR),
                publisher: or_default(b.publisher, DEFAULT_BOOK_PUBLISHER),
                category: or_default(b.category, DEFAULT_BOOK_CATEGORY),
                year: b.year,
                year_clean,
                isbn: b.isbn,
                description: b.description,
                source: b.source,
                record_type: b.record_type,
                crawl_time: b.crawl_time,
            }
        })
        .collect()
}

pub fn clean_courses(raw: Vec<RawCourse>) -> Vec<CleanCourse> {
    if raw.is_empty() {
        return Vec::new();
    }
    dedup_rows(raw)
        .into_iter()
        .map(|c| CleanCourse {
            course_id: c.course_id,
            name: or_default(c.name, DEFAULT_COURSE_NAME),
            code: or_default(c.code, DEFAULT_COURSE_CODE),
            teacher: or_default(c.teacher, DEFAULT_COURSE_TEACHER),
            department: or_default(c.department, DEFAULT_COURSE_DEPARTMENT),
            credit: coerce_int(c.credit.as_ref(), DEFAULT_CREDIT),
            hours: coerce_int(c.hours.as_ref(), DEFAULT_HOURS),
            semester: c.semester,
            description: c.description,
            source: c.source,
            record_type: c.record_type,
            crawl_time: c.crawl_time,
        })
        .collect()
}

pub fn clean_news(raw: Vec<RawNews>) -> Vec<CleanNews> {
    if raw.is_empty() {
        return Vec::new();
    }
    dedup_rows(raw)
        .into_iter()
        .map(|n| {
            let date_clean = coerce_date(n.date.as_deref());
            let summary_length = char_len(n.summary.as_deref());
            CleanNews {
                news_id: n.news_id,
                title: or_default(n.title, DEFAULT_NEWS_TITLE),
                summary: n.summary,
                content: n.content,
                url: n.url,
                date: n.date,
                date_clean,
                category: or_default(n.category, DEFAULT_NEWS_CATEGORY),
                source: or_default(n.source, DEFAULT_NEWS_SOURCE),
                record_type: n.record_type,
                crawl_time: n.crawl_time,
                summary_length,
            }
        })
        .collect()
}

pub fn clean_notices(raw: Vec<RawNotice>) -> Vec<CleanNotice> {
    if raw.is_empty() {
        return Vec::new();
    }
    dedup_rows(raw)
        .into_iter()
        .map(|n| {
            let date_clean = coerce_date(n.date.as_deref());
            let content_length = char_len(n.content.as_deref());
            // A notice without its own category inherits the type tag.
            let category = n
                .category
                .or_else(|| {
                    if n.record_type.is_empty() {
                        None
                    } else {
                        Some(n.record_type.clone())
                    }
                })
                .unwrap_or_else(|| DEFAULT_NOTICE_CATEGORY.to_string());
            CleanNotice {
                notice_id: n.notice_id,
                title: or_default(n.title, DEFAULT_NOTICE_TITLE),
                content: n.content,
                url: n.url,
                date: n.date,
                date_clean,
                category,
                source: or_default(n.source, DEFAULT_NOTICE_SOURCE),
                record_type: n.record_type,
                crawl_time: n.crawl_time,
                content_length,
            }
        })
        .collect()
}
