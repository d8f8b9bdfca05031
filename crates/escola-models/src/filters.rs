//! Filter criteria supplied by callers and the per-entity queries they resolve to.

use chrono::{DateTime, NaiveDate, Utc};
use escola_core::serde::{
    deserialize_optional_date, deserialize_optional_i64, deserialize_optional_string,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::{Validate, ValidationError};

use crate::status::{ActivityStatus, ClassStatus, StudentStatus};

/// Id no entity can have. Used in place of an empty allow-list so stores never
/// receive an empty `IN ()` list.
pub const IMPOSSIBLE_ID: i64 = -1;

/// Raw report filters as received from the caller.
///
/// Every field is optional here; which ones a report requires is decided by the
/// filter resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
#[validate(schema(function = "validate_date_order"))]
pub struct FilterCriteria {
    /// Inclusive lower bound (ISO-8601 date)
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound (ISO-8601 date)
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    #[validate(range(min = 1))]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    #[validate(range(min = 1))]
    pub class_id: Option<i64>,
    /// Interpreted per report: student, class or activity status
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    #[validate(range(min = 1))]
    pub instructor_id: Option<i64>,
}

fn validate_date_order(criteria: &FilterCriteria) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (criteria.start_date, criteria.end_date)
        && start > end
    {
        return Err(ValidationError::new("date_order")
            .with_message("startDate must not be after endDate".into()));
    }
    Ok(())
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// Inclusive calendar-day range; open on either side when a bound is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.contains(instant.date_naive())
    }
}

/// Relations a report needs loaded alongside the primary entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Student → current class
    Class,
    /// Class → course
    Course,
    /// Class → instructors
    Instructors,
    /// Class → enrollments
    Enrollments,
    /// Course / instructor → classes
    Classes,
    /// Attendance → student
    Student,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
    /// Allow-list of ids; `None` means unrestricted.
    pub ids: Option<Vec<i64>>,
    pub status: Option<StudentStatus>,
    pub created: DateRange,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassQuery {
    pub ids: Option<Vec<i64>>,
    pub course_id: Option<i64>,
    pub instructor_id: Option<i64>,
    pub status: Option<ClassStatus>,
    /// Applied to the class start date.
    pub starting: DateRange,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseQuery {
    pub ids: Option<Vec<i64>>,
    pub status: Option<ActivityStatus>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructorQuery {
    pub ids: Option<Vec<i64>>,
    pub status: Option<ActivityStatus>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentQuery {
    pub class_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceQuery {
    pub class_id: i64,
    pub dates: DateRange,
    pub relations: Vec<Relation>,
}

/// `true` when `ids` is unrestricted or contains `id`.
pub fn allows(ids: &Option<Vec<i64>>, id: i64) -> bool {
    ids.as_ref().is_none_or(|ids| ids.contains(&id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filter_criteria_from_query_json() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{"classId": "7", "startDate": "2026-01-01", "status": "", "courseId": ""}"#,
        )
        .unwrap();
        assert_eq!(criteria.class_id, Some(7));
        assert_eq!(criteria.start_date, Some(date(2026, 1, 1)));
        assert_eq!(criteria.status, None);
        assert_eq!(criteria.course_id, None);
    }

    #[test]
    fn test_filter_criteria_default_is_empty() {
        assert!(FilterCriteria::default().is_empty());
        let criteria = FilterCriteria {
            class_id: Some(1),
            ..Default::default()
        };
        assert!(!criteria.is_empty());
    }

    #[test]
    fn test_validation_rejects_non_positive_ids() {
        let criteria = FilterCriteria {
            class_id: Some(0),
            ..Default::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_inverted_range() {
        let criteria = FilterCriteria {
            start_date: Some(date(2026, 5, 1)),
            end_date: Some(date(2026, 4, 1)),
            ..Default::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_same_day_range() {
        let criteria = FilterCriteria {
            start_date: Some(date(2026, 5, 1)),
            end_date: Some(date(2026, 5, 1)),
            ..Default::default()
        };
        assert!(criteria.validate().is_ok());
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange {
            start: Some(date(2026, 1, 10)),
            end: Some(date(2026, 1, 20)),
        };
        assert!(range.contains(date(2026, 1, 10)));
        assert!(range.contains(date(2026, 1, 20)));
        assert!(!range.contains(date(2026, 1, 21)));
        assert!(!range.contains(date(2026, 1, 9)));
        assert!(DateRange::default().contains(date(1990, 1, 1)));
    }

    #[test]
    fn test_allows() {
        assert!(allows(&None, 5));
        assert!(allows(&Some(vec![1, 5]), 5));
        assert!(!allows(&Some(vec![IMPOSSIBLE_ID]), 5));
    }
}
