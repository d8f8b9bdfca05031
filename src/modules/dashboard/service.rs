use anyhow::anyhow;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use escola_config::ReportConfig;
use escola_core::{ReportError, StoreError};
use escola_db::EntityStore;
use escola_models::{
    CandidateStatus, ClassStatus, CourseEnrollmentCount, DashboardSnapshot, DashboardSource,
    MonthlyEnrollment, StudentStatus, tally_of, tally_total,
};
use tracing::{info, instrument};

use crate::metrics::track_dashboard_snapshot;

pub const HISTOGRAM_MONTHS: i32 = 12;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// `round(part / total * 100)`, or 0 when `total` is 0.
pub fn rate(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

/// First day of the month `offset` months away from `now` (negative = past).
fn month_start(now: DateTime<Utc>, offset: i32) -> Option<NaiveDate> {
    let index = now.year() * 12 + now.month0() as i32 + offset;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
}

fn month_label(date: NaiveDate) -> String {
    format!("{} {}", MONTH_ABBREVIATIONS[date.month0() as usize], date.year())
}

/// Pure computation of a [`DashboardSnapshot`] from one consistent read.
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn aggregate(
        source: &DashboardSource,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot, ReportError> {
        let total_students = tally_total(&source.students_by_status);
        let active_students = tally_of(&source.students_by_status, &StudentStatus::Ativo);

        let total_candidates = tally_total(&source.candidates_by_status);
        let pending_candidates = tally_of(&source.candidates_by_status, &CandidateStatus::Pendente);
        let approved_candidates =
            tally_of(&source.candidates_by_status, &CandidateStatus::Aprovado);

        Ok(DashboardSnapshot {
            total_students,
            active_students,
            activity_rate: rate(active_students, total_students),
            total_courses: source.courses.len() as u64,
            total_classes: tally_total(&source.classes_by_status),
            active_classes: tally_of(&source.classes_by_status, &ClassStatus::Ativa),
            total_instructors: source.total_instructors,
            total_enrollments: tally_total(&source.enrollments_by_class),
            total_candidates,
            pending_candidates,
            approved_candidates,
            approval_rate: rate(approved_candidates, total_candidates),
            students_per_course: Self::students_per_course(source),
            monthly_enrollments: Self::monthly_enrollments(source, now)?,
            generated_at: now,
        })
    }

    /// Course → classes → enrollments. Courses keep the store's name order.
    pub fn students_per_course(source: &DashboardSource) -> Vec<CourseEnrollmentCount> {
        source
            .courses
            .iter()
            .map(|course| CourseEnrollmentCount {
                course_id: course.id,
                course_name: course.name.clone(),
                students: course
                    .classes
                    .iter()
                    .map(|class| tally_of(&source.enrollments_by_class, &class.id))
                    .sum(),
            })
            .collect()
    }

    /// Twelve half-open month buckets, oldest first, ending with the current month.
    pub fn monthly_enrollments(
        source: &DashboardSource,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyEnrollment>, ReportError> {
        let mut buckets = Vec::with_capacity(HISTOGRAM_MONTHS as usize);

        for back in (0..HISTOGRAM_MONTHS).rev() {
            let (start, end) = month_start(now, -back)
                .zip(month_start(now, 1 - back))
                .ok_or_else(|| {
                    ReportError::internal(
                        "dashboard",
                        "histogram",
                        None,
                        anyhow!("month {} before {} is out of range", back, now),
                    )
                })?;

            let count = source
                .enrollments_by_month
                .iter()
                .filter(|(month, _)| *month >= start && *month < end)
                .map(|(_, count)| count)
                .sum();

            buckets.push(MonthlyEnrollment {
                label: month_label(start),
                month_start: start,
                count,
            });
        }

        Ok(buckets)
    }
}

pub struct DashboardService;

impl DashboardService {
    /// Reads one store session and aggregates it. Any failure aborts the
    /// whole snapshot.
    #[instrument(skip_all)]
    pub async fn snapshot(
        store: &dyn EntityStore,
        config: &ReportConfig,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot, ReportError> {
        let result = Self::fetch_and_aggregate(store, config, now).await;

        track_dashboard_snapshot(result.is_ok());
        if let Ok(snapshot) = &result {
            info!(
                students = snapshot.total_students,
                enrollments = snapshot.total_enrollments,
                "Dashboard snapshot computed"
            );
        }
        result
    }

    async fn fetch_and_aggregate(
        store: &dyn EntityStore,
        config: &ReportConfig,
        now: DateTime<Utc>,
    ) -> Result<DashboardSnapshot, ReportError> {
        let source = tokio::time::timeout(config.fetch_timeout, store.dashboard_source())
            .await
            .map_err(|_| StoreError::Timeout(config.fetch_timeout))??;
        StatisticsAggregator::aggregate(&source, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use escola_db::MemoryStore;
    use escola_models::{ActivityStatus, ClassRef, Course, Enrollment};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap()
    }

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn enrollment_at(id: i64, at: DateTime<Utc>) -> Enrollment {
        Enrollment {
            id,
            student_id: id,
            class_id: 1,
            created_at: at,
        }
    }

    async fn histogram(enrollments: Vec<Enrollment>) -> Vec<MonthlyEnrollment> {
        let mut store = MemoryStore::new();
        store.enrollments = enrollments;
        let snapshot = DashboardService::snapshot(&store, &ReportConfig::default(), now())
            .await
            .unwrap();
        snapshot.monthly_enrollments
    }

    #[test]
    fn test_rate_guards_zero_total() {
        assert_eq!(rate(0, 0), 0);
        assert_eq!(rate(5, 0), 0);
        assert_eq!(rate(1, 3), 33);
        assert_eq!(rate(2, 3), 67);
        assert_eq!(rate(3, 3), 100);
    }

    #[test]
    fn test_empty_source_gives_zero_rates() {
        let snapshot = StatisticsAggregator::aggregate(&DashboardSource::default(), now()).unwrap();
        assert_eq!(snapshot.total_students, 0);
        assert_eq!(snapshot.activity_rate, 0);
        assert_eq!(snapshot.approval_rate, 0);
        assert_eq!(snapshot.monthly_enrollments.len(), 12);
        assert!(snapshot.monthly_enrollments.iter().all(|m| m.count == 0));
        assert_eq!(snapshot.generated_at, now());
    }

    #[test]
    fn test_counts_and_rates() {
        let source = DashboardSource {
            students_by_status: vec![(StudentStatus::Ativo, 2), (StudentStatus::Inativo, 1)],
            classes_by_status: vec![(ClassStatus::Ativa, 1), (ClassStatus::Encerrada, 1)],
            candidates_by_status: vec![
                (CandidateStatus::Aprovado, 2),
                (CandidateStatus::Pendente, 1),
                (CandidateStatus::Reprovado, 1),
            ],
            total_instructors: 4,
            enrollments_by_class: vec![(1, 3), (2, 2)],
            ..Default::default()
        };
        let snapshot = StatisticsAggregator::aggregate(&source, now()).unwrap();
        assert_eq!(snapshot.total_students, 3);
        assert_eq!(snapshot.active_students, 2);
        assert_eq!(snapshot.activity_rate, 67);
        assert_eq!(snapshot.total_classes, 2);
        assert_eq!(snapshot.active_classes, 1);
        assert_eq!(snapshot.total_instructors, 4);
        assert_eq!(snapshot.total_enrollments, 5);
        assert_eq!(snapshot.pending_candidates, 1);
        assert_eq!(snapshot.approved_candidates, 2);
        assert_eq!(snapshot.approval_rate, 50);
    }

    #[test]
    fn test_active_count_ignores_stored_casing() {
        let source = DashboardSource {
            students_by_status: ["ativo", "ATIVO", " Ativo", "inativo"]
                .iter()
                .map(|raw| (raw.parse().unwrap(), 1))
                .collect(),
            ..Default::default()
        };
        let snapshot = StatisticsAggregator::aggregate(&source, now()).unwrap();
        assert_eq!(snapshot.active_students, 3);
        assert_eq!(snapshot.activity_rate, 75);
    }

    #[test]
    fn test_students_per_course_sums_class_enrollments() {
        let course = |id: i64, classes: Vec<i64>| Course {
            id,
            name: format!("Curso {}", id),
            workload_hours: 100,
            level: "Técnico".to_string(),
            status: ActivityStatus::Ativo,
            classes: classes
                .into_iter()
                .map(|id| ClassRef {
                    id,
                    name: format!("Turma {}", id),
                })
                .collect(),
        };

        let source = DashboardSource {
            courses: vec![course(1, vec![10, 11]), course(2, vec![12]), course(3, vec![])],
            enrollments_by_class: vec![(10, 5), (11, 3), (12, 1)],
            ..Default::default()
        };

        let counts = StatisticsAggregator::students_per_course(&source);
        let by_course: Vec<(i64, u64)> = counts.iter().map(|c| (c.course_id, c.students)).collect();
        assert_eq!(by_course, vec![(1, 8), (2, 1), (3, 0)]);
    }

    #[test]
    fn test_histogram_has_twelve_buckets_oldest_first() {
        let months =
            StatisticsAggregator::monthly_enrollments(&DashboardSource::default(), now()).unwrap();
        let labels: Vec<&str> = months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "nov 2025", "dez 2025", "jan 2026", "fev 2026", "mar 2026", "abr 2026",
                "mai 2026", "jun 2026", "jul 2026", "ago 2026", "set 2026", "out 2026",
            ]
        );
        assert!(months.windows(2).all(|w| w[0].month_start < w[1].month_start));
    }

    #[test]
    fn test_histogram_reads_monthly_tally() {
        let source = DashboardSource {
            enrollments_by_month: vec![
                (month(2025, 10), 7),
                (month(2025, 11), 2),
                (month(2026, 3), 4),
                (month(2026, 10), 1),
                (month(2026, 11), 9),
            ],
            ..Default::default()
        };
        let months = StatisticsAggregator::monthly_enrollments(&source, now()).unwrap();
        let total: u64 = months.iter().map(|m| m.count).sum();
        assert_eq!(total, 7);
        assert_eq!(months[0].count, 2);
        assert_eq!(months[4].count, 4);
        assert_eq!(months[11].count, 1);
    }

    #[tokio::test]
    async fn test_month_boundary_belongs_to_new_month() {
        let months = histogram(vec![
            enrollment_at(1, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()),
            enrollment_at(2, Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap()),
        ])
        .await;
        let count = |label: &str| months.iter().find(|m| m.label == label).unwrap().count;
        assert_eq!(count("mar 2026"), 1);
        assert_eq!(count("fev 2026"), 1);
    }

    #[tokio::test]
    async fn test_histogram_sum_matches_window() {
        let months = histogram(vec![
            // before the window
            enrollment_at(1, Utc.with_ymd_and_hms(2025, 10, 31, 23, 0, 0).unwrap()),
            // first instant of the window
            enrollment_at(2, Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap()),
            enrollment_at(3, Utc.with_ymd_and_hms(2026, 6, 15, 10, 0, 0).unwrap()),
            enrollment_at(4, Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()),
            // after the window
            enrollment_at(5, Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()),
        ])
        .await;
        let total: u64 = months.iter().map(|m| m.count).sum();
        assert_eq!(total, 3);
        assert_eq!(months[0].count, 1);
        assert_eq!(months[11].count, 1);
    }

    #[test]
    fn test_histogram_across_year_start() {
        let january = Utc.with_ymd_and_hms(2027, 1, 10, 0, 0, 0).unwrap();
        let months =
            StatisticsAggregator::monthly_enrollments(&DashboardSource::default(), january)
                .unwrap();
        assert_eq!(months[0].label, "fev 2026");
        assert_eq!(months[11].label, "jan 2027");
        assert_eq!(months[10].month_start, month(2026, 12));
    }
}
