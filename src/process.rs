use anyhow::Result;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::analyze::{self, Analysis};
use crate::records::{CleanBook, CleanCourse, CleanNews, CleanNotice, MergedRow};
use crate::{artifacts, clean, db};

/// Stage 2: load raw tables, clean each type, persist cleaned + merged
/// tables, aggregate, and write the analysis/samples artifacts. Returns
/// `None` when there is no raw data at all.
pub fn run_processing(conn: &Connection) -> Result<Option<Analysis>> {
    let raw_books = db::load_raw_books(conn)?;
    let raw_courses = db::load_raw_courses(conn)?;
    let raw_news = db::load_raw_news(conn)?;
    let raw_notices = db::load_raw_notices(conn)?;

    if raw_books.is_empty() && raw_courses.is_empty() && raw_news.is_empty() && raw_notices.is_empty()
    {
        warn!("no raw data found; nothing to process");
        return Ok(None);
    }

    info!(
        "cleaning {} books, {} courses, {} news, {} notices",
        raw_books.len(),
        raw_courses.len(),
        raw_news.len(),
        raw_notices.len()
    );
    let books = clean::clean_books(raw_books);
    let courses = clean::clean_courses(raw_courses);
    let news = clean::clean_news(raw_news);
    let notices = clean::clean_notices(raw_notices);

    db::save_clean_books(conn, &books)?;
    db::save_clean_courses(conn, &courses)?;
    db::save_clean_news(conn, &news)?;
    db::save_clean_notices(conn, &notices)?;

    let merged = build_merged(&books, &courses, &news, &notices);
    db::save_merged(conn, &merged)?;
    info!("saved {} merged rows", merged.len());

    let analysis = analyze::analyze_all_data(&books, &courses, &news, &notices);

    // Artifact writes are best-effort: a failed write is logged and the
    // pipeline carries on without the file.
    if let Err(e) = artifacts::write_analysis(&analysis) {
        warn!("failed to write analysis: {e}");
    }
    if let Err(e) = artifacts::write_samples(&books, &courses, &news, &notices) {
        warn!("failed to write samples: {e}");
    }

    Ok(Some(analysis))
}

/// Merge the four cleaned tables into one, keeping the reduced common column
/// set and tagging each row with its originating type.
pub fn build_merged(
    books: &[CleanBook],
    courses: &[CleanCourse],
    news: &[CleanNews],
    notices: &[CleanNotice],
) -> Vec<MergedRow> {
    let mut merged = Vec::with_capacity(books.len() + courses.len() + news.len() + notices.len());

    for b in books {
        merged.push(MergedRow {
            title: Some(b.title.clone()),
            name: None,
            author: Some(b.author.clone()),
            teacher: None,
            category: Some(b.category.clone()),
            date: None,
            date_clean: None,
            data_type: "books".to_string(),
        });
    }
    for c in courses {
        merged.push(MergedRow {
            title: None,
            name: Some(c.name.clone()),
            author: None,
            teacher: Some(c.teacher.clone()),
            category: None,
            date: None,
            date_clean: None,
            data_type: "courses".to_string(),
        });
    }
    for n in news {
        merged.push(MergedRow {
            title: Some(n.title.clone()),
            name: None,
            author: None,
            teacher: None,
            category: Some(n.category.clone()),
            date: n.date.clone(),
            date_clean: Some(
                n.date_clean
                    .format(crate::records::datetime_format::FORMAT)
                    .to_string(),
            ),
            data_type: "news".to_string(),
        });
    }
    for n in notices {
        merged.push(MergedRow {
            title: Some(n.title.clone()),
            name: None,
            author: None,
            teacher: None,
            category: Some(n.category.clone()),
            date: n.date.clone(),
            date_clean: Some(
                n.date_clean
                    .format(crate::records::datetime_format::FORMAT)
                    .to_string(),
            ),
            data_type: "notices".to_string(),
        });
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn merged_rows_are_tagged_and_reduced() {
        let mut rng = StdRng::seed_from_u64(11);
        let books = clean::clean_books(generate::books(3, &mut rng));
        let courses = clean::clean_courses(generate::courses(2, &mut rng));
        let news = clean::clean_news(generate::news(2, &mut rng));
        let notices = clean::clean_notices(generate::notices(2, 0, &mut rng));

        let merged = build_merged(&books, &courses, &news, &notices);
        assert_eq!(merged.len(), 9);

        let book_rows: Vec<_> = merged.iter().filter(|r| r.data_type == "books").collect();
        assert_eq!(book_rows.len(), 3);
        assert!(book_rows.iter().all(|r| r.title.is_some() && r.author.is_some()));
        assert!(book_rows.iter().all(|r| r.name.is_none() && r.teacher.is_none()));

        let course_rows: Vec<_> = merged.iter().filter(|r| r.data_type == "courses").collect();
        assert!(course_rows.iter().all(|r| r.name.is_some() && r.teacher.is_some()));
        assert!(course_rows.iter().all(|r| r.title.is_none()));

        let dated: Vec<_> = merged
            .iter()
            .filter(|r| r.data_type == "news" || r.data_type == "notices")
            .collect();
        assert!(dated.iter().all(|r| r.date.is_some() && r.date_clean.is_some()));
    }

    #[test]
    fn end_to_end_over_generated_records() {
        let mut rng = StdRng::seed_from_u64(5);
        let books = clean::clean_books(generate::books(100, &mut rng));
        let courses = clean::clean_courses(generate::courses(50, &mut rng));
        let news = clean::clean_news(generate::news(60, &mut rng));
        let notices = clean::clean_notices(generate::notices(40, 0, &mut rng));

        // Generated records are structurally complete; cleaning must not
        // drop anything but exact duplicates (ids make rows distinct).
        assert_eq!(books.len(), 100);
        assert_eq!(courses.len(), 50);
        assert_eq!(news.len(), 60);
        assert_eq!(notices.len(), 40);

        let analysis = analyze::analyze_all_data(&books, &courses, &news, &notices);
        assert_eq!(analysis.summary.total_records, 250);
        assert!(analysis.books_analysis.top_categories.is_some());
        assert!(analysis.courses_analysis.credit_stats.is_some());
        assert!(analysis.news_analysis.date_range.is_some());
        assert!(analysis.notices_analysis.date_info.is_some());
    }
}
