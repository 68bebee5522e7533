mod analyze;
mod artifacts;
mod clean;
mod crawler;
mod db;
mod extract;
mod fetch;
mod generate;
mod process;
mod records;

use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::warn;

#[derive(Parser)]
#[command(name = "campus_data", about = "Campus data pipeline: crawl, clean, analyze")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl data sources, falling back to generated records
    Crawl,
    /// Clean raw records and compute the analysis summary
    Process,
    /// Crawl + process in one pipeline
    Run,
    /// Show table counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Crawl => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let stats = crawler::run_crawl(&conn).await?;
            print_crawl(&stats);
            Ok(())
        }
        Commands::Process => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            match process::run_processing(&conn)? {
                Some(analysis) => print_analysis(&analysis),
                None => println!("No raw data. Run 'crawl' first."),
            }
            Ok(())
        }
        Commands::Run => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;

            // Phase 1: crawl. A failed crawl is logged, not fatal; the
            // processing phase tolerates empty raw tables.
            let t_crawl = Instant::now();
            match crawler::run_crawl(&conn).await {
                Ok(stats) => {
                    print_crawl(&stats);
                    println!("Crawl finished in {:.1}s", t_crawl.elapsed().as_secs_f64());
                }
                Err(e) => warn!("crawl stage failed: {e}"),
            }

            // Phase 2: process.
            let t_process = Instant::now();
            match process::run_processing(&conn) {
                Ok(Some(analysis)) => {
                    print_analysis(&analysis);
                    println!(
                        "Processing finished in {:.1}s",
                        t_process.elapsed().as_secs_f64()
                    );
                }
                Ok(None) => println!("Nothing to process (crawl produced no records)."),
                Err(e) => warn!("process stage failed: {e}"),
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Raw records:");
            println!("  books:   {}", s.raw_books);
            println!("  courses: {}", s.raw_courses);
            println!("  news:    {}", s.raw_news);
            println!("  notices: {}", s.raw_notices);
            println!("  total:   {}", s.raw_total());
            println!("Cleaned records:");
            println!("  books:   {}", s.clean_books);
            println!("  courses: {}", s.clean_courses);
            println!("  news:    {}", s.clean_news);
            println!("  notices: {}", s.clean_notices);
            println!("  total:   {}", s.clean_total());
            println!("Merged rows: {}", s.merged);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_crawl(stats: &crawler::CrawlStats) {
    println!(
        "Crawled {} records ({} books, {} news, {} courses, {} notices)",
        stats.total_records,
        stats.books_count,
        stats.news_count,
        stats.courses_count,
        stats.notices_count,
    );
}

fn print_analysis(analysis: &analyze::Analysis) {
    let s = &analysis.summary;
    println!(
        "Cleaned {} records ({} books, {} courses, {} news, {} notices)",
        s.total_records, s.books_count, s.courses_count, s.news_count, s.notices_count,
    );
    println!("Analysis -> data/analysis.json, samples -> data/samples.json");
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
