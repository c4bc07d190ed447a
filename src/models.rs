//! Record shapes exchanged with the teacher API. These stay plain data holders
//! so the client, the screens and the CLI can all pass them around freely. The
//! serde attributes pin the wire format: camelCase keys, ISO calendar dates and
//! optional fields left out entirely instead of being sent as `null`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single teacher record. `id` and `age` are owned by the server: new records
/// go out without them and come back filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Server-assigned identifier, absent until the record is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub full_name: String,
    /// Serialized as `YYYY-MM-DD` with no time component.
    pub date_of_birth: NaiveDate,
    pub number_of_classes: u32,
    /// Derived by the server from the date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl Teacher {
    /// Build an unsaved record ready to be posted.
    pub fn new(full_name: impl Into<String>, date_of_birth: NaiveDate, number_of_classes: u32) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            date_of_birth,
            number_of_classes,
            age: None,
        }
    }
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)
    }
}

/// Server-side filter request. Every dimension is optional; a missing field
/// places no constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_classes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_classes: Option<u32>,
}

impl FilterCriteria {
    /// True when no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.search_term.is_none()
            && self.min_age.is_none()
            && self.max_age.is_none()
            && self.min_classes.is_none()
            && self.max_classes.is_none()
    }
}

/// Read-only aggregate computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStatistics {
    pub total_teachers: u64,
    /// The server reports `0.0` for an empty roster; a missing value is read
    /// the same way.
    #[serde(default)]
    pub average_classes: f64,
}

/// Binary export flavours offered by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    /// Fixed download name for the exported file.
    pub fn filename(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "teachers.pdf",
            ExportFormat::Excel => "teachers.xlsx",
        }
    }

    /// Endpoint suffix below the teachers resource.
    pub fn path(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "/export/pdf",
            ExportFormat::Excel => "/export/excel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Excel => "Excel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_teacher_serializes_without_server_fields() {
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let json = serde_json::to_value(Teacher::new("Jane Doe", date, 5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fullName": "Jane Doe",
                "dateOfBirth": "1990-01-01",
                "numberOfClasses": 5
            })
        );
    }

    #[test]
    fn teacher_reads_server_fields() {
        let teacher: Teacher = serde_json::from_str(
            r#"{"id":3,"fullName":"John Doe","dateOfBirth":"1980-05-17","numberOfClasses":12,"age":46}"#,
        )
        .unwrap();
        assert_eq!(teacher.id, Some(3));
        assert_eq!(teacher.age, Some(46));
        assert_eq!(
            teacher.date_of_birth,
            NaiveDate::from_ymd_opt(1980, 5, 17).unwrap()
        );
    }

    #[test]
    fn filter_criteria_omits_unset_dimensions() {
        let criteria = FilterCriteria {
            min_age: Some(30),
            max_classes: Some(10),
            ..FilterCriteria::default()
        };
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json, serde_json::json!({"minAge": 30, "maxClasses": 10}));
        assert!(!criteria.is_empty());
        assert!(FilterCriteria::default().is_empty());
    }

    #[test]
    fn statistics_default_missing_average() {
        let stats: TeacherStatistics = serde_json::from_str(r#"{"totalTeachers":0}"#).unwrap();
        assert_eq!(stats.total_teachers, 0);
        assert_eq!(stats.average_classes, 0.0);
    }
}
