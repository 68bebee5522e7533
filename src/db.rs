use anyhow::Result;
use rusqlite::{params, Connection};

use crate::records::*;

const DB_PATH: &str = "data/campus.sqlite";

pub fn connect() -> Result<Connection> {
    std::fs::create_dir_all("data")?;
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Raw tables keep records exactly as extracted/generated, duplicates
        -- included; cleaning dedups downstream.
        CREATE TABLE IF NOT EXISTS raw_books (
            book_id     TEXT NOT NULL,
            title       TEXT,
            author      TEXT,
            publisher   TEXT,
            category    TEXT,
            year        TEXT,
            isbn        TEXT,
            description TEXT,
            source      TEXT,
            record_type TEXT NOT NULL,
            crawl_time  TEXT
        );

        CREATE TABLE IF NOT EXISTS raw_courses (
            course_id   TEXT NOT NULL,
            name        TEXT,
            code        TEXT,
            teacher     TEXT,
            department  TEXT,
            credit,
            hours,
            semester    TEXT,
            description TEXT,
            source      TEXT,
            record_type TEXT NOT NULL,
            crawl_time  TEXT
        );

        CREATE TABLE IF NOT EXISTS raw_news (
            news_id     TEXT NOT NULL,
            title       TEXT,
            summary     TEXT,
            content     TEXT,
            url         TEXT,
            date        TEXT,
            category    TEXT,
            source      TEXT,
            record_type TEXT NOT NULL,
            crawl_time  TEXT
        );

        CREATE TABLE IF NOT EXISTS raw_notices (
            notice_id   TEXT NOT NULL,
            title       TEXT,
            content     TEXT,
            url         TEXT,
            date        TEXT,
            category    TEXT,
            source      TEXT,
            record_type TEXT NOT NULL,
            crawl_time  TEXT
        );

        CREATE TABLE IF NOT EXISTS clean_books (
            book_id     TEXT NOT NULL,
            title       TEXT NOT NULL,
            author      TEXT NOT NULL,
            publisher   TEXT NOT NULL,
            category    TEXT NOT NULL,
            year        TEXT,
            year_clean  INTEGER NOT NULL,
            isbn        TEXT,
            description TEXT,
            source      TEXT,
            record_type TEXT NOT NULL,
            crawl_time  TEXT
        );

        CREATE TABLE IF NOT EXISTS clean_courses (
            course_id   TEXT NOT NULL,
            name        TEXT NOT NULL,
            code        TEXT NOT NULL,
            teacher     TEXT NOT NULL,
            department  TEXT NOT NULL,
            credit      INTEGER NOT NULL,
            hours       INTEGER NOT NULL,
            semester    TEXT,
            description TEXT,
            source      TEXT,
            record_type TEXT NOT NULL,
            crawl_time  TEXT
        );

        CREATE TABLE IF NOT EXISTS clean_news (
            news_id        TEXT NOT NULL,
            title          TEXT NOT NULL,
            summary        TEXT,
            content        TEXT,
            url            TEXT,
            date           TEXT,
            date_clean     TEXT NOT NULL,
            category       TEXT NOT NULL,
            source         TEXT NOT NULL,
            record_type    TEXT NOT NULL,
            crawl_time     TEXT,
            summary_length INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS clean_notices (
            notice_id      TEXT NOT NULL,
            title          TEXT NOT NULL,
            content        TEXT,
            url            TEXT,
            date           TEXT,
            date_clean     TEXT NOT NULL,
            category       TEXT NOT NULL,
            source         TEXT NOT NULL,
            record_type    TEXT NOT NULL,
            crawl_time     TEXT,
            content_length INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS merged_data (
            title      TEXT,
            name       TEXT,
            author     TEXT,
            teacher    TEXT,
            category   TEXT,
            date       TEXT,
            date_clean TEXT,
            data_type  TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

// ── Raw tables ──
//
// Saves are wholesale: each run replaces the previous run's rows.

pub fn save_raw_books(conn: &Connection, rows: &[RawBook]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM raw_books", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO raw_books
             (book_id, title, author, publisher, category, year, isbn, description, source, record_type, crawl_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.book_id, r.title, r.author, r.publisher, r.category, r.year, r.isbn,
                r.description, r.source, r.record_type, r.crawl_time,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_raw_courses(conn: &Connection, rows: &[RawCourse]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM raw_courses", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO raw_courses
             (course_id, name, code, teacher, department, credit, hours, semester, description, source, record_type, crawl_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.course_id, r.name, r.code, r.teacher, r.department, r.credit, r.hours,
                r.semester, r.description, r.source, r.record_type, r.crawl_time,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_raw_news(conn: &Connection, rows: &[RawNews]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM raw_news", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO raw_news
             (news_id, title, summary, content, url, date, category, source, record_type, crawl_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.news_id, r.title, r.summary, r.content, r.url, r.date, r.category,
                r.source, r.record_type, r.crawl_time,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_raw_notices(conn: &Connection, rows: &[RawNotice]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM raw_notices", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO raw_notices
             (notice_id, title, content, url, date, category, source, record_type, crawl_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.notice_id, r.title, r.content, r.url, r.date, r.category, r.source,
                r.record_type, r.crawl_time,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn load_raw_books(conn: &Connection) -> Result<Vec<RawBook>> {
    let mut stmt = conn.prepare(
        "SELECT book_id, title, author, publisher, category, year, isbn, description, source, record_type, crawl_time
         FROM raw_books",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawBook {
                book_id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                publisher: row.get(3)?,
                category: row.get(4)?,
                year: row.get(5)?,
                isbn: row.get(6)?,
                description: row.get(7)?,
                source: row.get(8)?,
                record_type: row.get(9)?,
                crawl_time: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_raw_courses(conn: &Connection) -> Result<Vec<RawCourse>> {
    let mut stmt = conn.prepare(
        "SELECT course_id, name, code, teacher, department, credit, hours, semester, description, source, record_type, crawl_time
         FROM raw_courses",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawCourse {
                course_id: row.get(0)?,
                name: row.get(1)?,
                code: row.get(2)?,
                teacher: row.get(3)?,
                department: row.get(4)?,
                credit: row.get(5)?,
                hours: row.get(6)?,
                semester: row.get(7)?,
                description: row.get(8)?,
                source: row.get(9)?,
                record_type: row.get(10)?,
                crawl_time: row.get(11)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_raw_news(conn: &Connection) -> Result<Vec<RawNews>> {
    let mut stmt = conn.prepare(
        "SELECT news_id, title, summary, content, url, date, category, source, record_type, crawl_time
         FROM raw_news",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawNews {
                news_id: row.get(0)?,
                title: row.get(1)?,
                summary: row.get(2)?,
                content: row.get(3)?,
                url: row.get(4)?,
                date: row.get(5)?,
                category: row.get(6)?,
                source: row.get(7)?,
                record_type: row.get(8)?,
                crawl_time: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn load_raw_notices(conn: &Connection) -> Result<Vec<RawNotice>> {
    let mut stmt = conn.prepare(
        "SELECT notice_id, title, content, url, date, category, source, record_type, crawl_time
         FROM raw_notices",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RawNotice {
                notice_id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                url: row.get(3)?,
                date: row.get(4)?,
                category: row.get(5)?,
                source: row.get(6)?,
                record_type: row.get(7)?,
                crawl_time: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Cleaned tables ──

pub fn save_clean_books(conn: &Connection, rows: &[CleanBook]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM clean_books", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO clean_books
             (book_id, title, author, publisher, category, year, year_clean, isbn, description, source, record_type, crawl_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.book_id, r.title, r.author, r.publisher, r.category, r.year, r.year_clean,
                r.isbn, r.description, r.source, r.record_type, r.crawl_time,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_clean_courses(conn: &Connection, rows: &[CleanCourse]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM clean_courses", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO clean_courses
             (course_id, name, code, teacher, department, credit, hours, semester, description, source, record_type, crawl_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.course_id, r.name, r.code, r.teacher, r.department, r.credit, r.hours,
                r.semester, r.description, r.source, r.record_type, r.crawl_time,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_clean_news(conn: &Connection, rows: &[CleanNews]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM clean_news", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO clean_news
             (news_id, title, summary, content, url, date, date_clean, category, source, record_type, crawl_time, summary_length)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.news_id,
                r.title,
                r.summary,
                r.content,
                r.url,
                r.date,
                r.date_clean.format(datetime_format::FORMAT).to_string(),
                r.category,
                r.source,
                r.record_type,
                r.crawl_time,
                r.summary_length,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_clean_notices(conn: &Connection, rows: &[CleanNotice]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM clean_notices", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO clean_notices
             (notice_id, title, content, url, date, date_clean, category, source, record_type, crawl_time, content_length)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.notice_id,
                r.title,
                r.content,
                r.url,
                r.date,
                r.date_clean.format(datetime_format::FORMAT).to_string(),
                r.category,
                r.source,
                r.record_type,
                r.crawl_time,
                r.content_length,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn save_merged(conn: &Connection, rows: &[MergedRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM merged_data", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO merged_data (title, name, author, teacher, category, date, date_clean, data_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.title, r.name, r.author, r.teacher, r.category, r.date, r.date_clean,
                r.data_type,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Stats ──

pub struct TableStats {
    pub raw_books: usize,
    pub raw_courses: usize,
    pub raw_news: usize,
    pub raw_notices: usize,
    pub clean_books: usize,
    pub clean_courses: usize,
    pub clean_news: usize,
    pub clean_notices: usize,
    pub merged: usize,
}

impl TableStats {
    pub fn raw_total(&self) -> usize {
        self.raw_books + self.raw_courses + self.raw_news + self.raw_notices
    }

    pub fn clean_total(&self) -> usize {
        self.clean_books + self.clean_courses + self.clean_news + self.clean_notices
    }
}

fn count(conn: &Connection, table: &str) -> Result<usize> {
    let n: usize = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
    Ok(n)
}

pub fn get_stats(conn: &Connection) -> Result<TableStats> {
    Ok(TableStats {
        raw_books: count(conn, "raw_books")?,
        raw_courses: count(conn, "raw_courses")?,
        raw_news: count(conn, "raw_news")?,
        raw_notices: count(conn, "raw_notices")?,
        clean_books: count(conn, "clean_books")?,
        clean_courses: count(conn, "clean_courses")?,
        clean_news: count(conn, "clean_news")?,
        clean_notices: count(conn, "clean_notices")?,
        merged: count(conn, "merged_data")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn raw_course_roundtrip_preserves_scalar_cells() {
        let conn = test_conn();
        let rows = vec![
            RawCourse {
                course_id: "course_0001".into(),
                name: Some("机器学习".into()),
                code: Some("PKU1000".into()),
                teacher: Some("张明教授".into()),
                department: Some("计算机科学与技术学院".into()),
                credit: Some(Scalar::Int(3)),
                hours: Some(Scalar::Text("48".into())),
                semester: Some("2024秋季".into()),
                description: None,
                source: None,
                record_type: "course".into(),
                crawl_time: None,
            },
            RawCourse {
                course_id: "course_0002".into(),
                name: None,
                code: None,
                teacher: None,
                department: None,
                credit: None,
                hours: None,
                semester: None,
                description: None,
                source: None,
                record_type: "course".into(),
                crawl_time: None,
            },
        ];
        save_raw_courses(&conn, &rows).unwrap();
        let loaded = load_raw_courses(&conn).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn raw_saves_are_wholesale_overwrites() {
        let conn = test_conn();
        let book = RawBook {
            book_id: "lib_0001".into(),
            title: Some("北大记忆".into()),
            author: None,
            publisher: None,
            category: None,
            year: Some("2023".into()),
            isbn: None,
            description: None,
            source: None,
            record_type: "book".into(),
            crawl_time: None,
        };
        save_raw_books(&conn, &[book.clone(), book.clone()]).unwrap();
        assert_eq!(load_raw_books(&conn).unwrap().len(), 2);
        save_raw_books(&conn, &[book]).unwrap();
        assert_eq!(load_raw_books(&conn).unwrap().len(), 1);
    }

    #[test]
    fn empty_tables_load_as_empty_collections() {
        let conn = test_conn();
        assert!(load_raw_books(&conn).unwrap().is_empty());
        assert!(load_raw_courses(&conn).unwrap().is_empty());
        assert!(load_raw_news(&conn).unwrap().is_empty());
        assert!(load_raw_notices(&conn).unwrap().is_empty());
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.raw_total(), 0);
        assert_eq!(stats.clean_total(), 0);
    }
}
