//! Dashboard snapshot and the tallies it is computed from.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::Course;
use crate::status::{CandidateStatus, ClassStatus, StudentStatus};

/// Row counts the aggregator reads, taken in one store session.
///
/// Tallies are `(key, count)` pairs. A status may appear more than once when
/// stored spellings differ, so consumers sum every pair with a matching key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSource {
    pub students_by_status: Vec<(StudentStatus, u64)>,
    pub classes_by_status: Vec<(ClassStatus, u64)>,
    pub candidates_by_status: Vec<(CandidateStatus, u64)>,
    /// Every course with its class references, by name.
    pub courses: Vec<Course>,
    pub total_instructors: u64,
    /// Enrollment count per class id.
    pub enrollments_by_class: Vec<(i64, u64)>,
    /// Enrollment count per UTC calendar month, keyed by [`month_of`].
    pub enrollments_by_month: Vec<(NaiveDate, u64)>,
}

/// First day of the UTC calendar month containing `at`.
pub fn month_of(at: DateTime<Utc>) -> NaiveDate {
    let day = at.date_naive();
    day.with_day(1).unwrap_or(day)
}

/// Sum of the counts whose key is `key`.
pub fn tally_of<K: PartialEq>(tally: &[(K, u64)], key: &K) -> u64 {
    tally
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, count)| count)
        .sum()
}

/// Sum of every count in the tally.
pub fn tally_total<K>(tally: &[(K, u64)]) -> u64 {
    tally.iter().map(|(_, count)| count).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollmentCount {
    pub course_id: i64,
    pub course_name: String,
    /// Sum of enrollments across every class of the course.
    pub students: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEnrollment {
    /// e.g. `"mar 2026"`
    pub label: String,
    pub month_start: NaiveDate,
    pub count: u64,
}

/// Aggregated counts and rates, computed fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub total_students: u64,
    pub active_students: u64,
    /// Percentage of active students, rounded; 0 when there are no students.
    pub activity_rate: u32,
    pub total_courses: u64,
    pub total_classes: u64,
    pub active_classes: u64,
    pub total_instructors: u64,
    pub total_enrollments: u64,
    pub total_candidates: u64,
    pub pending_candidates: u64,
    pub approved_candidates: u64,
    /// Percentage of approved candidates, rounded; 0 when there are no candidates.
    pub approval_rate: u32,
    pub students_per_course: Vec<CourseEnrollmentCount>,
    /// Always 12 entries, oldest month first.
    pub monthly_enrollments: Vec<MonthlyEnrollment>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_of_is_utc_calendar_month() {
        let first = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap();
        assert_eq!(month_of(first), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(month_of(last), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }

    #[test]
    fn test_tally_sums_repeated_keys() {
        let tally = vec![
            (StudentStatus::Ativo, 2),
            (StudentStatus::Inativo, 1),
            (StudentStatus::Ativo, 3),
        ];
        assert_eq!(tally_of(&tally, &StudentStatus::Ativo), 5);
        assert_eq!(tally_of(&tally, &StudentStatus::Concluido), 0);
        assert_eq!(tally_total(&tally), 6);
    }
}
