use std::collections::HashMap;

use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::records::{CleanBook, CleanCourse, CleanNews, CleanNotice};

const TOP_N: usize = 10;

/// Aggregate statistics over the cleaned tables. Sub-objects stay empty for
/// types with no rows; individual stats are omitted rather than erroring.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub timestamp: String,
    pub summary: Summary,
    pub books_analysis: BooksAnalysis,
    pub courses_analysis: CoursesAnalysis,
    pub news_analysis: NewsAnalysis,
    pub notices_analysis: NoticesAnalysis,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_records: usize,
    pub books_count: usize,
    pub courses_count: usize,
    pub news_count: usize,
    pub notices_count: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct BooksAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_categories: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_stats: Option<YearStats>,
}

#[derive(Debug, Serialize)]
pub struct YearStats {
    pub average_year: i64,
    pub latest_year: i64,
    pub year_range: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CoursesAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_departments: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_stats: Option<CreditStats>,
}

#[derive(Debug, Serialize)]
pub struct CreditStats {
    pub average_credit: f64,
    pub max_credit: i64,
    pub min_credit: i64,
}

#[derive(Debug, Default, Serialize)]
pub struct NewsAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Default, Serialize)]
pub struct NoticesAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_info: Option<DateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_stats: Option<ContentStats>,
}

#[derive(Debug, Serialize)]
pub struct DateInfo {
    pub start: String,
    pub end: String,
    /// Literal max minus min day span, kept as computed even when default
    /// date substitution collapses the range.
    pub total_days: i64,
}

#[derive(Debug, Serialize)]
pub struct ContentStats {
    pub avg_length: i64,
    pub max_length: i64,
    pub min_length: i64,
}

/// Top-N value counts in descending order, ties broken by first occurrence.
pub fn top_counts<'a>(values: impl Iterator<Item = &'a str>, limit: usize) -> Map<String, Value> {
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in values {
        match index.get(value) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(value.to_string(), order.len());
                order.push((value.to_string(), 1));
            }
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(limit)
        .map(|(k, n)| (k, Value::from(n)))
        .collect()
}

fn int_mean(values: impl Iterator<Item = i64> + Clone) -> i64 {
    let count = values.clone().count();
    if count == 0 {
        return 0;
    }
    (values.sum::<i64>() as f64 / count as f64) as i64
}

pub fn analyze_all_data(
    books: &[CleanBook],
    courses: &[CleanCourse],
    news: &[CleanNews],
    notices: &[CleanNotice],
) -> Analysis {
    let mut books_analysis = BooksAnalysis::default();
    if !books.is_empty() {
        books_analysis.top_categories =
            Some(top_counts(books.iter().map(|b| b.category.as_str()), TOP_N));
        let min = books.iter().map(|b| b.year_clean).min().unwrap_or(0);
        let max = books.iter().map(|b| b.year_clean).max().unwrap_or(0);
        books_analysis.year_stats = Some(YearStats {
            average_year: int_mean(books.iter().map(|b| b.year_clean)),
            latest_year: max,
            year_range: format!("{min}-{max}"),
        });
    }

    let mut courses_analysis = CoursesAnalysis::default();
    if !courses.is_empty() {
        courses_analysis.top_departments = Some(top_counts(
            courses.iter().map(|c| c.department.as_str()),
            TOP_N,
        ));
        let total: i64 = courses.iter().map(|c| c.credit).sum();
        courses_analysis.credit_stats = Some(CreditStats {
            average_credit: total as f64 / courses.len() as f64,
            max_credit: courses.iter().map(|c| c.credit).max().unwrap_or(0),
            min_credit: courses.iter().map(|c| c.credit).min().unwrap_or(0),
        });
    }

    let mut news_analysis = NewsAnalysis::default();
    if !news.is_empty() {
        news_analysis.categories =
            Some(top_counts(news.iter().map(|n| n.category.as_str()), TOP_N));
        if let (Some(start), Some(end)) = (
            news.iter().map(|n| n.date_clean).min(),
            news.iter().map(|n| n.date_clean).max(),
        ) {
            news_analysis.date_range = Some(DateRange {
                start: start.format("%Y-%m-%d").to_string(),
                end: end.format("%Y-%m-%d").to_string(),
            });
        }
    }

    let mut notices_analysis = NoticesAnalysis::default();
    if !notices.is_empty() {
        notices_analysis.categories =
            Some(top_counts(notices.iter().map(|n| n.category.as_str()), TOP_N));
        if let (Some(start), Some(end)) = (
            notices.iter().map(|n| n.date_clean).min(),
            notices.iter().map(|n| n.date_clean).max(),
        ) {
            notices_analysis.date_info = Some(DateInfo {
                start: start.format("%Y-%m-%d").to_string(),
                end: end.format("%Y-%m-%d").to_string(),
                total_days: (end - start).num_days(),
            });
        }
        notices_analysis.content_stats = Some(ContentStats {
            avg_length: int_mean(notices.iter().map(|n| n.content_length)),
            max_length: notices.iter().map(|n| n.content_length).max().unwrap_or(0),
            min_length: notices.iter().map(|n| n.content_length).min().unwrap_or(0),
        });
    }

    Analysis {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        summary: Summary {
            total_records: books.len() + courses.len() + news.len() + notices.len(),
            books_count: books.len(),
            courses_count: courses.len(),
            news_count: news.len(),
            notices_count: notices.len(),
        },
        books_analysis,
        courses_analysis,
        news_analysis,
        notices_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fallback_date;
    use chrono::NaiveDate;

    fn book(category: &str, year: i64) -> CleanBook {
        CleanBook {
            book_id: "b".into(),
            title: "t".into(),
            author: "a".into(),
            publisher: "p".into(),
            category: category.into(),
            year: Some(year.to_string()),
            year_clean: year,
            isbn: None,
            description: None,
            source: None,
            record_type: "book".into(),
            crawl_time: None,
        }
    }

    fn notice(date: (i32, u32, u32), content_length: i64) -> CleanNotice {
        CleanNotice {
            notice_id: "n".into(),
            title: "t".into(),
            content: None,
            url: None,
            date: None,
            date_clean: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            category: "通知公告".into(),
            source: "s".into(),
            record_type: "notice".into(),
            crawl_time: None,
            content_length,
        }
    }

    #[test]
    fn top_categories_descending_with_counts() {
        let books: Vec<CleanBook> = ["A", "A", "A", "B", "B", "C"]
            .iter()
            .map(|c| book(c, 2020))
            .collect();
        let analysis = analyze_all_data(&books, &[], &[], &[]);
        let top = analysis.books_analysis.top_categories.unwrap();
        let entries: Vec<(String, u64)> = top
            .iter()
            .map(|(k, v)| (k.clone(), v.as_u64().unwrap()))
            .collect();
        assert_eq!(
            entries,
            vec![("A".into(), 3), ("B".into(), 2), ("C".into(), 1)]
        );
    }

    #[test]
    fn top_counts_caps_at_limit() {
        let values: Vec<String> = (0..15).map(|i| format!("c{i}")).collect();
        let top = top_counts(values.iter().map(String::as_str), 10);
        assert_eq!(top.len(), 10);
    }

    #[test]
    fn year_stats_mean_truncates() {
        let books = vec![book("A", 2020), book("A", 2023)];
        let stats = analyze_all_data(&books, &[], &[], &[])
            .books_analysis
            .year_stats
            .unwrap();
        assert_eq!(stats.average_year, 2021); // 2021.5 truncated
        assert_eq!(stats.latest_year, 2023);
        assert_eq!(stats.year_range, "2020-2023");
    }

    #[test]
    fn empty_input_yields_zero_totals_and_empty_sub_objects() {
        let analysis = analyze_all_data(&[], &[], &[], &[]);
        assert_eq!(analysis.summary.total_records, 0);
        let json = serde_json::to_value(&analysis).unwrap();
        for key in [
            "books_analysis",
            "courses_analysis",
            "news_analysis",
            "notices_analysis",
        ] {
            assert_eq!(json[key], serde_json::json!({}), "{key} not empty");
        }
    }

    #[test]
    fn notice_day_span_is_literal_and_may_invert() {
        let notices = vec![notice((2024, 3, 10), 10), notice((2024, 3, 1), 30)];
        let info = analyze_all_data(&[], &[], &[], &notices)
            .notices_analysis
            .date_info
            .unwrap();
        assert_eq!(info.start, "2024-03-01");
        assert_eq!(info.end, "2024-03-10");
        assert_eq!(info.total_days, 9);

        // All dates collapsed to the fallback: span is zero, never negative
        // here, but the computation stays literal max-min.
        let same = vec![
            CleanNotice { date_clean: fallback_date(), ..notice((2024, 1, 1), 5) },
            CleanNotice { date_clean: fallback_date(), ..notice((2024, 1, 1), 7) },
        ];
        let info = analyze_all_data(&[], &[], &[], &same)
            .notices_analysis
            .date_info
            .unwrap();
        assert_eq!(info.total_days, 0);
    }

    #[test]
    fn notice_content_stats() {
        let notices = vec![notice((2024, 1, 1), 10), notice((2024, 1, 2), 31)];
        let stats = analyze_all_data(&[], &[], &[], &notices)
            .notices_analysis
            .content_stats
            .unwrap();
        assert_eq!(stats.avg_length, 20); // 20.5 truncated
        assert_eq!(stats.max_length, 31);
        assert_eq!(stats.min_length, 10);
    }

    #[test]
    fn credit_stats_mean_is_float() {
        let courses: Vec<CleanCourse> = [2, 3, 4]
            .iter()
            .map(|&credit| CleanCourse {
                course_id: "c".into(),
                name: "n".into(),
                code: "k".into(),
                teacher: "t".into(),
                department: "d".into(),
                credit,
                hours: 32,
                semester: None,
                description: None,
                source: None,
                record_type: "course".into(),
                crawl_time: None,
            })
            .collect();
        let stats = analyze_all_data(&[], &courses, &[], &[])
            .courses_analysis
            .credit_stats
            .unwrap();
        assert!((stats.average_credit - 3.0).abs() < f64::EPSILON);
        assert_eq!(stats.max_credit, 4);
        assert_eq!(stats.min_credit, 2);
    }
}
