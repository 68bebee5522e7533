use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

// Field defaults applied by the cleaning stage. A raw record may arrive with
// any of its non-id fields absent; after cleaning the required set is always
// populated.
pub const DEFAULT_BOOK_TITLE: &str = "未命名图书";
pub const DEFAULT_BOOK_AUTHOR: &str = "未知作者";
pub const DEFAULT_BOOK_CATEGORY: &str = "未分类";
pub const DEFAULT_BOOK_PUBLISHER: &str = "未知出版社";
pub const DEFAULT_COURSE_NAME: &str = "未命名课程";
pub const DEFAULT_COURSE_TEACHER: &str = "未知教师";
pub const DEFAULT_COURSE_DEPARTMENT: &str = "未指定院系";
pub const DEFAULT_COURSE_CODE: &str = "未编号";
pub const DEFAULT_NEWS_TITLE: &str = "未命名新闻";
pub const DEFAULT_NEWS_CATEGORY: &str = "综合新闻";
pub const DEFAULT_NEWS_SOURCE: &str = "未知来源";
pub const DEFAULT_NOTICE_TITLE: &str = "未命名通知";
pub const DEFAULT_NOTICE_CATEGORY: &str = "通知公告";
pub const DEFAULT_NOTICE_SOURCE: &str = "北京大学相关部门";

pub const DEFAULT_YEAR: i64 = 2023;
pub const DEFAULT_CREDIT: i64 = 2;
pub const DEFAULT_HOURS: i64 = 32;

/// Fallback for missing or unparseable dates: 2024-01-01 00:00:00.
pub fn fallback_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("fixed fallback date is valid")
}

/// A loosely typed table cell. Numeric fields of raw records (credit, hours)
/// may arrive as integers, floats, or strings depending on the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ToSql for Scalar {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Scalar::Int(n) => ToSqlOutput::from(*n),
            Scalar::Float(f) => ToSqlOutput::from(*f),
            Scalar::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl FromSql for Scalar {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(n) => Ok(Scalar::Int(n)),
            ValueRef::Real(f) => Ok(Scalar::Float(f)),
            ValueRef::Text(t) => Ok(Scalar::Text(String::from_utf8_lossy(t).into_owned())),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

// ── Raw records ──
//
// Produced by extraction or fallback generation, before cleaning. Absent
// fields stay absent (serialized keys are omitted) until the cleaning stage
// fills them.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBook {
    pub book_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCourse {
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNews {
    pub news_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNotice {
    pub notice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_time: Option<String>,
}

// ── Cleaned records ──
//
// Required fields are concrete; auxiliary fields stay optional and serialize
// to null in samples. Derived columns (year_clean, date_clean, lengths) are
// added by the cleaning stage.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanBook {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub category: String,
    pub year: Option<String>,
    pub year_clean: i64,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    pub crawl_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanCourse {
    pub course_id: String,
    pub name: String,
    pub code: String,
    pub teacher: String,
    pub department: String,
    pub credit: i64,
    pub hours: i64,
    pub semester: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    pub crawl_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanNews {
    pub news_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    #[serde(with = "datetime_format")]
    pub date_clean: NaiveDateTime,
    pub category: String,
    pub source: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub crawl_time: Option<String>,
    pub summary_length: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanNotice {
    pub notice_id: String,
    pub title: String,
    pub content: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    #[serde(with = "datetime_format")]
    pub date_clean: NaiveDateTime,
    pub category: String,
    pub source: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub crawl_time: Option<String>,
    pub content_length: i64,
}

/// One row of the merged cross-type table: the reduced common column set,
/// tagged with the originating record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub title: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub teacher: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub date_clean: Option<String>,
    pub data_type: String,
}

/// Serde adapter for the artifact datetime format (`2024-01-01 00:00:00`).
pub mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_untagged_cells_deserialize() {
        let cells: Vec<Scalar> = serde_json::from_str(r#"[3, 2.5, "two"]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                Scalar::Int(3),
                Scalar::Float(2.5),
                Scalar::Text("two".into())
            ]
        );
    }

    #[test]
    fn raw_book_omits_absent_fields() {
        let book = RawBook {
            book_id: "lib_0001".into(),
            title: Some("燕园史话".into()),
            author: None,
            publisher: None,
            category: None,
            year: None,
            isbn: None,
            description: None,
            source: None,
            record_type: "book".into(),
            crawl_time: None,
        };
        let json = serde_json::to_value(&book).unwrap();
        assert!(json.get("author").is_none());
        assert_eq!(json["type"], "book");
    }

    #[test]
    fn clean_news_datetime_format() {
        let news = CleanNews {
            news_id: "news_0001".into(),
            title: "标题".into(),
            summary: None,
            content: None,
            url: None,
            date: None,
            date_clean: fallback_date(),
            category: DEFAULT_NEWS_CATEGORY.into(),
            source: DEFAULT_NEWS_SOURCE.into(),
            record_type: "news".into(),
            crawl_time: None,
            summary_length: 0,
        };
        let json = serde_json::to_value(&news).unwrap();
        assert_eq!(json["date_clean"], "2024-01-01 00:00:00");
        assert_eq!(json["summary"], serde_json::Value::Null);
    }
}
