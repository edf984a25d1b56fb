//! Wire rows as the record store sends them.
//!
//! Link fields (a question's section, an answer's question, an audit's
//! auditor) arrive either as a bare id or as the linked object with an `id`
//! key, depending on the endpoint's view settings. Scores and sort orders may
//! be strings or numbers.

use audit_core::entities::{
    AnswerRecord, AuditSession, Employee, QuestionDefinition, Section, SubAnswer,
};
use audit_core::ports::ViolationRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

// ── Field decoders ─────────────────────────────────────────────────

/// Extract an id from a string, number, or `{ "id": ... }` object.
fn link_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("id").and_then(link_id),
        _ => None,
    }
}

fn de_link<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(link_id(&Value::deserialize(d)?))
}

fn de_required_link<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    de_link(d)?.ok_or_else(|| serde::de::Error::custom("missing id"))
}

fn de_score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn de_sort_order<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn de_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// First key of `keys` holding a usable id.
fn first_link(row: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| row.get(*key).and_then(link_id))
}

/// First key of `keys` holding a non-blank string.
fn first_text<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| row.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

// ── Rows ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QuestionRow {
    #[serde(deserialize_with = "de_required_link")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "de_sort_order")]
    pub sort_order: Option<i64>,
    #[serde(default, deserialize_with = "de_link")]
    pub section: Option<String>,
}

impl From<QuestionRow> for QuestionDefinition {
    fn from(row: QuestionRow) -> Self {
        Self {
            question_id: row.id,
            section_id: row.section,
            text: row.text,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerRow {
    #[serde(deserialize_with = "de_required_link")]
    pub id: String,
    #[serde(deserialize_with = "de_required_link")]
    pub question_id: String,
    #[serde(default, deserialize_with = "de_score")]
    pub score: Option<String>,
    #[serde(default)]
    pub question_text_snapshot: Option<String>,
}

impl From<AnswerRow> for AnswerRecord {
    fn from(row: AnswerRow) -> Self {
        Self {
            answer_id: row.id,
            question_id: row.question_id,
            score: row.score,
            question_text_snapshot: row.question_text_snapshot.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubAnswerRow {
    #[serde(deserialize_with = "de_required_link")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "question_id", deserialize_with = "de_link")]
    pub question: Option<String>,
}

impl From<SubAnswerRow> for SubAnswer {
    fn from(row: SubAnswerRow) -> Self {
        Self {
            sub_answer_id: row.id,
            question_id: row.question,
            text: row.text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditRow {
    #[serde(deserialize_with = "de_required_link")]
    pub id: String,
    #[serde(default, deserialize_with = "de_link")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "de_link")]
    pub auditor: Option<String>,
    #[serde(default, deserialize_with = "de_link")]
    pub auditee: Option<String>,
    #[serde(default, rename = "StartTime", deserialize_with = "de_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "EndTime", deserialize_with = "de_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
}

impl AuditRow {
    /// Convert to a session; `fallback_section` fills a section the endpoint
    /// did not echo back.
    pub fn into_session(self, fallback_section: &str) -> AuditSession {
        AuditSession {
            audit_id: self.id,
            section_id: self
                .section
                .unwrap_or_else(|| fallback_section.to_string()),
            auditor_id: self.auditor,
            auditee_id: self.auditee,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ViolationRow {
    #[serde(deserialize_with = "de_required_link")]
    pub id: String,
}

impl From<ViolationRow> for ViolationRecord {
    fn from(row: ViolationRow) -> Self {
        Self {
            violation_id: row.id,
        }
    }
}

/// Directory rows name their key and name fields differently per view, so
/// they are read from the raw object.
#[derive(Debug, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct EmployeeRow {
    pub id: String,
    pub display_name: String,
}

impl TryFrom<Map<String, Value>> for EmployeeRow {
    type Error = String;

    fn try_from(row: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = first_link(&row, &["id", "_id", "objId", "uuid"]).ok_or("missing id")?;
        let family = first_text(&row, &["second_name", "lastName"]).unwrap_or_default();
        let given = first_text(&row, &["name", "firstName"]).unwrap_or_default();
        Ok(Self {
            id,
            display_name: format!("{family} {given}").trim().to_string(),
        })
    }
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            employee_id: row.id,
            display_name: row.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct SectionRow {
    pub id: String,
    pub name: String,
}

impl TryFrom<Map<String, Value>> for SectionRow {
    type Error = String;

    fn try_from(row: Map<String, Value>) -> Result<Self, Self::Error> {
        let name = first_text(&row, &["name", "title", "sectionName"]).map(str::to_string);
        let id = first_link(&row, &["id", "_id", "value"])
            .or_else(|| name.clone())
            .ok_or("missing id")?;
        Ok(Self {
            name: name.unwrap_or_else(|| id.clone()),
            id,
        })
    }
}

impl From<SectionRow> for Section {
    fn from(row: SectionRow) -> Self {
        Self {
            section_id: row.id,
            name: row.name,
        }
    }
}

/// Body of the upload endpoint's answer.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub result: Option<UploadResult>,
}

#[derive(Debug, Deserialize)]
pub struct UploadResult {
    #[serde(default, rename = "finalFileName")]
    pub final_file_name: Option<String>,
}
