use crate::{deadline::Priority, scan::ExtractedDeadline};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_COURSE: &str = "General";

/// Instruction sent to the text model together with the document
pub fn build_extraction_prompt(document_text: &str) -> String {
    format!(
        r#"Analyze the following text and extract all genuine deadlines and tasks. For each one, provide:
1. A clear title
2. A detailed description
3. The course or subject name if it can be identified from context, otherwise "{course}"
4. The due date formatted as an ISO datetime: YYYY-MM-DDTHH:MM:SS
5. A priority level (high, medium or low) based on urgency and importance

Return ONLY a JSON array with the fields: title, description, course, date, priority

Example format:
[
    {{
        "title": "Submit Project Report",
        "description": "Final project report submission for CS101",
        "course": "Computer Science 101",
        "date": "2025-10-15T23:59:00",
        "priority": "high"
    }}
]

Text to analyze:
{text}
"#,
        course = DEFAULT_COURSE,
        text = document_text
    )
}

#[derive(Error, Debug)]
pub enum ExtractionParseError {
    #[error("Model response is not a JSON array of deadlines: {0}")]
    NotAnArray(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
enum RecordError {
    #[error("Missing or invalid field: {0}")]
    Field(String),
    #[error("Unparseable date: {0}")]
    Date(String),
}

#[derive(Deserialize)]
struct RawExtractedDeadline {
    title: String,
    description: String,
    #[serde(default)]
    course: Option<String>,
    date: String,
    priority: String,
}

/// Parses the raw text returned by the model into deadlines.
///
/// Fails only when the response as a whole is not a JSON array. Records
/// that are missing a field or carry a date that cannot be parsed are
/// skipped and the rest are kept.
pub fn parse_extraction_response(raw: &str) -> Result<Vec<ExtractedDeadline>, ExtractionParseError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(strip_code_fence(raw))?;

    Ok(records
        .into_iter()
        .filter_map(|record| match parse_record(record) {
            Ok(deadline) => Some(deadline),
            Err(e) => {
                tracing::debug!("Skipping extracted record: {}", e);
                None
            }
        })
        .collect())
}

fn parse_record(record: serde_json::Value) -> Result<ExtractedDeadline, RecordError> {
    let raw: RawExtractedDeadline =
        serde_json::from_value(record).map_err(|e| RecordError::Field(e.to_string()))?;

    let course = raw
        .course
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COURSE.to_string());

    Ok(ExtractedDeadline {
        due_at: parse_due_date(&raw.date)?,
        priority: Priority::parse_lenient(&raw.priority),
        title: raw.title,
        description: raw.description,
        course,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let content = raw.trim();
    let content = content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .unwrap_or(content);
    content.strip_suffix("```").unwrap_or(content).trim()
}

/// Date-only values mean end of that day. Values without an offset are UTC.
fn parse_due_date(date: &str) -> Result<DateTime<Utc>, RecordError> {
    let date = date.trim();
    let invalid = || RecordError::Date(date.to_string());

    if !date.contains('T') {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
        return day
            .and_hms_opt(23, 59, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(invalid);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
        .map(|dt| dt.and_utc())
        .ok_or_else(invalid)
}
