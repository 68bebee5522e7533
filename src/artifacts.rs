use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::analyze::Analysis;
use crate::crawler::CrawlStats;
use crate::records::{CleanBook, CleanCourse, CleanNews, CleanNotice, RawBook, RawCourse, RawNews, RawNotice};

const RAW_DIR: &str = "data/raw";
const STATISTICS_PATH: &str = "data/statistics.json";
const ANALYSIS_PATH: &str = "data/analysis.json";
const SAMPLES_PATH: &str = "data/samples.json";

/// Per-type sample cap in `samples.json`.
const SAMPLE_LIMIT: usize = 100;

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Raw per-type JSON arrays under `data/raw/`, one file per record type.
pub fn write_raw_arrays(
    books: &[RawBook],
    courses: &[RawCourse],
    news: &[RawNews],
    notices: &[RawNotice],
) -> Result<()> {
    let dir = Path::new(RAW_DIR);
    write_json(dir.join("books.json"), &books)?;
    write_json(dir.join("courses.json"), &courses)?;
    write_json(dir.join("news.json"), &news)?;
    write_json(dir.join("notices.json"), &notices)?;
    Ok(())
}

pub fn write_statistics(stats: &CrawlStats) -> Result<()> {
    write_json(STATISTICS_PATH, stats)
}

pub fn write_analysis(analysis: &Analysis) -> Result<()> {
    write_json(ANALYSIS_PATH, analysis)
}

#[derive(Debug, Serialize)]
struct Samples<'a> {
    sample_time: String,
    books_sample: &'a [CleanBook],
    courses_sample: &'a [CleanCourse],
    news_sample: &'a [CleanNews],
    notices_sample: &'a [CleanNotice],
}

fn capped<T>(rows: &[T]) -> &[T] {
    &rows[..rows.len().min(SAMPLE_LIMIT)]
}

/// Up to 100 cleaned records per type. Values serialize JSON-safe: datetimes
/// as `%Y-%m-%d %H:%M:%S` strings, missing cells as null.
pub fn write_samples(
    books: &[CleanBook],
    courses: &[CleanCourse],
    news: &[CleanNews],
    notices: &[CleanNotice],
) -> Result<()> {
    let samples = Samples {
        sample_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        books_sample: capped(books),
        courses_sample: capped(courses),
        news_sample: capped(news),
        notices_sample: capped(notices),
    };
    write_json(SAMPLES_PATH, &samples)
}
