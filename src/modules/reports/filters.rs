//! Turns caller [`FilterCriteria`] into the per-entity query a report needs.
//!
//! Derived filters are resolved here, against the store: a class or course
//! filter on the student report becomes a student-id allow-list read from the
//! enrollments. An allow-list that matched nothing is replaced by
//! `[IMPOSSIBLE_ID]` so every downstream fetch stays a plain, well-formed query.

use std::collections::BTreeSet;
use std::str::FromStr;

use escola_core::ReportError;
use escola_db::EntityStore;
use escola_models::{
    ActivityStatus, AttendanceQuery, ClassQuery, ClassStatus, CourseQuery, DateRange,
    EnrollmentQuery, FilterCriteria, IMPOSSIBLE_ID, InstructorQuery, Relation, ReportKind,
    StudentQuery, StudentStatus,
};
use tracing::{debug, instrument};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedQuery {
    Students(StudentQuery),
    Classes(ClassQuery),
    Courses(CourseQuery),
    Instructors(InstructorQuery),
    Attendance(AttendanceQuery),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilters {
    pub query: ResolvedQuery,
    /// Text of the "filters applied" line; `None` when the report applies no filter.
    pub summary: Option<String>,
}

pub struct FilterResolver;

impl FilterResolver {
    #[instrument(skip(store))]
    pub async fn resolve(
        store: &dyn EntityStore,
        kind: ReportKind,
        criteria: &FilterCriteria,
    ) -> Result<ResolvedFilters, ReportError> {
        criteria
            .validate()
            .map_err(|e| ReportError::validation(e.to_string()))?;

        let mut summary = Summary::default();

        let query = match kind {
            ReportKind::Students => {
                ResolvedQuery::Students(Self::students(store, criteria, &mut summary).await?)
            }
            ReportKind::Classes => {
                ResolvedQuery::Classes(Self::classes(store, criteria, &mut summary).await?)
            }
            ReportKind::Courses => {
                ResolvedQuery::Courses(Self::courses(store, criteria, &mut summary).await?)
            }
            ReportKind::Instructors => {
                ResolvedQuery::Instructors(Self::instructors(store, criteria, &mut summary).await?)
            }
            ReportKind::Attendance => {
                ResolvedQuery::Attendance(Self::attendance(store, criteria, &mut summary).await?)
            }
        };

        Ok(ResolvedFilters {
            query,
            summary: summary.render(),
        })
    }

    async fn students(
        store: &dyn EntityStore,
        criteria: &FilterCriteria,
        summary: &mut Summary,
    ) -> Result<StudentQuery, ReportError> {
        let created = criteria.date_range();
        summary.period(created);

        let mut ids: Option<BTreeSet<i64>> = None;

        if let Some(course_id) = criteria.course_id {
            ensure_course(store, course_id).await?;
            summary.course(course_id);

            let classes = store
                .find_classes(&ClassQuery {
                    course_id: Some(course_id),
                    ..Default::default()
                })
                .await?;
            let class_ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
            let enrolled = enrolled_students(store, with_sentinel(class_ids)).await?;
            ids = Some(intersect(ids, enrolled));
        }

        if let Some(class_id) = criteria.class_id {
            let name = class_name(store, class_id).await?;
            summary.class(&name);

            let enrolled = enrolled_students(store, vec![class_id]).await?;
            ids = Some(intersect(ids, enrolled));
        }

        let status = parse_status::<StudentStatus>(&criteria.status)?;
        if let Some(status) = status {
            summary.status(status.label());
        }

        let ids = ids.map(|set| with_sentinel(set.into_iter().collect()));
        debug!(allow_list = ?ids, "resolved student filters");

        Ok(StudentQuery {
            ids,
            status,
            created,
            relations: vec![Relation::Class],
        })
    }

    async fn classes(
        store: &dyn EntityStore,
        criteria: &FilterCriteria,
        summary: &mut Summary,
    ) -> Result<ClassQuery, ReportError> {
        let starting = criteria.date_range();
        summary.period(starting);

        if let Some(course_id) = criteria.course_id {
            ensure_course(store, course_id).await?;
            summary.course(course_id);
        }

        let mut ids = None;
        if let Some(class_id) = criteria.class_id {
            let name = class_name(store, class_id).await?;
            summary.class(&name);
            ids = Some(vec![class_id]);
        }

        let status = parse_status::<ClassStatus>(&criteria.status)?;
        if let Some(status) = status {
            summary.status(status.label());
        }

        if let Some(instructor_id) = criteria.instructor_id {
            ensure_instructor(store, instructor_id).await?;
            summary.instructor(instructor_id);
        }

        Ok(ClassQuery {
            ids,
            course_id: criteria.course_id,
            instructor_id: criteria.instructor_id,
            status,
            starting,
            relations: vec![Relation::Course, Relation::Instructors, Relation::Enrollments],
        })
    }

    async fn courses(
        store: &dyn EntityStore,
        criteria: &FilterCriteria,
        summary: &mut Summary,
    ) -> Result<CourseQuery, ReportError> {
        let mut ids = None;
        if let Some(course_id) = criteria.course_id {
            ensure_course(store, course_id).await?;
            summary.course(course_id);
            ids = Some(vec![course_id]);
        }

        let status = parse_status::<ActivityStatus>(&criteria.status)?;
        if let Some(status) = status {
            summary.status(status.label());
        }

        Ok(CourseQuery {
            ids,
            status,
            relations: vec![Relation::Classes],
        })
    }

    async fn instructors(
        store: &dyn EntityStore,
        criteria: &FilterCriteria,
        summary: &mut Summary,
    ) -> Result<InstructorQuery, ReportError> {
        let status = parse_status::<ActivityStatus>(&criteria.status)?;
        if let Some(status) = status {
            summary.status(status.label());
        }

        let mut ids = None;
        if let Some(instructor_id) = criteria.instructor_id {
            ensure_instructor(store, instructor_id).await?;
            summary.instructor(instructor_id);
            ids = Some(vec![instructor_id]);
        }

        Ok(InstructorQuery {
            ids,
            status,
            relations: vec![Relation::Classes],
        })
    }

    async fn attendance(
        store: &dyn EntityStore,
        criteria: &FilterCriteria,
        summary: &mut Summary,
    ) -> Result<AttendanceQuery, ReportError> {
        let class_id = criteria
            .class_id
            .ok_or_else(|| ReportError::validation("attendance report requires classId"))?;

        let dates = criteria.date_range();
        summary.period(dates);

        let name = class_name(store, class_id).await?;
        summary.class(&name);

        Ok(AttendanceQuery {
            class_id,
            dates,
            relations: vec![Relation::Student],
        })
    }
}

/// Replaces an empty allow-list with the unsatisfiable sentinel.
pub fn with_sentinel(ids: Vec<i64>) -> Vec<i64> {
    if ids.is_empty() {
        vec![IMPOSSIBLE_ID]
    } else {
        ids
    }
}

fn intersect(current: Option<BTreeSet<i64>>, next: BTreeSet<i64>) -> BTreeSet<i64> {
    match current {
        Some(current) => current.intersection(&next).copied().collect(),
        None => next,
    }
}

async fn enrolled_students(
    store: &dyn EntityStore,
    class_ids: Vec<i64>,
) -> Result<BTreeSet<i64>, ReportError> {
    let enrollments = store
        .find_enrollments(&EnrollmentQuery {
            class_ids: Some(class_ids),
        })
        .await?;
    Ok(enrollments.into_iter().map(|e| e.student_id).collect())
}

async fn class_name(store: &dyn EntityStore, class_id: i64) -> Result<String, ReportError> {
    store
        .class_ref(class_id)
        .await?
        .map(|class| class.name)
        .ok_or_else(|| ReportError::not_found("class", class_id))
}

async fn ensure_course(store: &dyn EntityStore, course_id: i64) -> Result<(), ReportError> {
    if store.course_exists(course_id).await? {
        Ok(())
    } else {
        Err(ReportError::not_found("course", course_id))
    }
}

async fn ensure_instructor(store: &dyn EntityStore, instructor_id: i64) -> Result<(), ReportError> {
    if store.instructor_exists(instructor_id).await? {
        Ok(())
    } else {
        Err(ReportError::not_found("instructor", instructor_id))
    }
}

fn parse_status<S>(raw: &Option<String>) -> Result<Option<S>, ReportError>
where
    S: FromStr,
    S::Err: std::fmt::Display,
{
    raw.as_deref()
        .map(|value| value.parse::<S>())
        .transpose()
        .map_err(|e| ReportError::validation(e.to_string()))
}

/// Collects active filters and renders them in a fixed order, whatever order
/// the resolver visits them in.
#[derive(Debug, Default)]
struct Summary {
    period: Option<String>,
    course: Option<String>,
    class: Option<String>,
    status: Option<String>,
    instructor: Option<String>,
}

impl Summary {
    fn period(&mut self, range: DateRange) {
        let fmt = |d: chrono::NaiveDate| d.format("%d/%m/%Y").to_string();
        self.period = match (range.start, range.end) {
            (Some(start), Some(end)) => Some(format!("Período: {} a {}", fmt(start), fmt(end))),
            (Some(start), None) => Some(format!("Período: a partir de {}", fmt(start))),
            (None, Some(end)) => Some(format!("Período: até {}", fmt(end))),
            (None, None) => None,
        };
    }

    fn course(&mut self, id: i64) {
        self.course = Some(format!("Curso: #{}", id));
    }

    fn class(&mut self, name: &str) {
        self.class = Some(format!("Turma: {}", name));
    }

    fn status(&mut self, label: &str) {
        self.status = Some(format!("Status: {}", label));
    }

    fn instructor(&mut self, id: i64) {
        self.instructor = Some(format!("Instrutor: #{}", id));
    }

    fn render(self) -> Option<String> {
        let parts: Vec<String> = [
            self.period,
            self.course,
            self.class,
            self.status,
            self.instructor,
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(format!("Filtros aplicados: {}", parts.join("; ")))
        }
    }
}
