//! In-process [`EntityStore`] for tests.
//!
//! Relations are derived from the stored collections on every read, the same
//! way the SQL store joins them: a class's enrollments come from the
//! enrollment list, a course's classes from the class list, and so on.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use escola_core::StoreError;
use escola_models::{
    Attendance, AttendanceQuery, Candidate, Class, ClassQuery, ClassRef, Course, CourseQuery,
    DashboardSource, Enrollment, EnrollmentQuery, Instructor, InstructorQuery, Relation, Student,
    StudentQuery, allows, month_of,
};

use crate::store::EntityStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub students: Vec<Student>,
    pub classes: Vec<Class>,
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub enrollments: Vec<Enrollment>,
    pub attendance: Vec<Attendance>,
    pub candidates: Vec<Candidate>,
    delay: Option<Duration>,
    fail_with: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every read sleeps for `delay` first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every read fails with [`StoreError::Query`].
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    async fn gate(&self) -> Result<(), StoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(message) => Err(StoreError::query(std::io::Error::other(message.clone()))),
            None => Ok(()),
        }
    }

    fn enrollment_ids_of(&self, class_id: i64) -> Vec<i64> {
        let mut enrollments: Vec<&Enrollment> = self
            .enrollments
            .iter()
            .filter(|e| e.class_id == class_id)
            .collect();
        enrollments.sort_by_key(|e| (e.created_at, e.id));
        enrollments.into_iter().map(|e| e.id).collect()
    }

    fn class_refs(&self, predicate: impl Fn(&Class) -> bool) -> Vec<ClassRef> {
        let mut refs: Vec<ClassRef> = self
            .classes
            .iter()
            .filter(|c| predicate(c))
            .map(|c| ClassRef {
                id: c.id,
                name: c.name.clone(),
            })
            .collect();
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        refs
    }

    fn students_matching(&self, query: &StudentQuery) -> Vec<Student> {
        let mut students: Vec<Student> = self
            .students
            .iter()
            .filter(|s| allows(&query.ids, s.id))
            .filter(|s| query.status.is_none_or(|status| s.status == status))
            .filter(|s| query.created.contains_instant(s.created_at))
            .cloned()
            .map(|mut s| {
                if !query.relations.contains(&Relation::Class) {
                    s.class = None;
                }
                s
            })
            .collect();
        students.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        students
    }

    fn classes_matching(&self, query: &ClassQuery) -> Vec<Class> {
        let mut classes: Vec<Class> = self
            .classes
            .iter()
            .filter(|c| allows(&query.ids, c.id))
            .filter(|c| query.course_id.is_none_or(|id| c.course.id == id))
            .filter(|c| {
                query
                    .instructor_id
                    .is_none_or(|id| c.instructors.iter().any(|i| i.id == id))
            })
            .filter(|c| query.status.is_none_or(|status| c.status == status))
            .filter(|c| query.starting.contains(c.start_date))
            .cloned()
            .map(|mut c| {
                c.enrollment_ids = if query.relations.contains(&Relation::Enrollments) {
                    self.enrollment_ids_of(c.id)
                } else {
                    Vec::new()
                };
                if query.relations.contains(&Relation::Instructors) {
                    c.instructors.sort_by(|a, b| a.name.cmp(&b.name));
                } else {
                    c.instructors.clear();
                }
                c
            })
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        classes
    }

    fn courses_matching(&self, query: &CourseQuery) -> Vec<Course> {
        let mut courses: Vec<Course> = self
            .courses
            .iter()
            .filter(|c| allows(&query.ids, c.id))
            .filter(|c| query.status.is_none_or(|status| c.status == status))
            .cloned()
            .map(|mut c| {
                c.classes = if query.relations.contains(&Relation::Classes) {
                    self.class_refs(|class| class.course.id == c.id)
                } else {
                    Vec::new()
                };
                c
            })
            .collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        courses
    }

    fn instructors_matching(&self, query: &InstructorQuery) -> Vec<Instructor> {
        let mut instructors: Vec<Instructor> = self
            .instructors
            .iter()
            .filter(|i| allows(&query.ids, i.id))
            .filter(|i| query.status.is_none_or(|status| i.status == status))
            .cloned()
            .map(|mut i| {
                i.classes = if query.relations.contains(&Relation::Classes) {
                    self.class_refs(|class| class.instructors.iter().any(|r| r.id == i.id))
                } else {
                    Vec::new()
                };
                i
            })
            .collect();
        instructors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        instructors
    }

    fn enrollments_matching(&self, query: &EnrollmentQuery) -> Vec<Enrollment> {
        let mut enrollments: Vec<Enrollment> = self
            .enrollments
            .iter()
            .filter(|e| allows(&query.class_ids, e.class_id))
            .cloned()
            .collect();
        enrollments.sort_by_key(|e| (e.created_at, e.id));
        enrollments
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_students(&self, query: &StudentQuery) -> Result<Vec<Student>, StoreError> {
        self.gate().await?;
        Ok(self.students_matching(query))
    }

    async fn find_classes(&self, query: &ClassQuery) -> Result<Vec<Class>, StoreError> {
        self.gate().await?;
        Ok(self.classes_matching(query))
    }

    async fn find_courses(&self, query: &CourseQuery) -> Result<Vec<Course>, StoreError> {
        self.gate().await?;
        Ok(self.courses_matching(query))
    }

    async fn find_instructors(
        &self,
        query: &InstructorQuery,
    ) -> Result<Vec<Instructor>, StoreError> {
        self.gate().await?;
        Ok(self.instructors_matching(query))
    }

    async fn find_enrollments(
        &self,
        query: &EnrollmentQuery,
    ) -> Result<Vec<Enrollment>, StoreError> {
        self.gate().await?;
        Ok(self.enrollments_matching(query))
    }

    async fn find_attendance(
        &self,
        query: &AttendanceQuery,
    ) -> Result<Vec<Attendance>, StoreError> {
        self.gate().await?;
        let mut records: Vec<Attendance> = self
            .attendance
            .iter()
            .filter(|a| a.class.id == query.class_id)
            .filter(|a| query.dates.contains(a.date))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn class_ref(&self, id: i64) -> Result<Option<ClassRef>, StoreError> {
        self.gate().await?;
        Ok(self.classes.iter().find(|c| c.id == id).map(|c| ClassRef {
            id: c.id,
            name: c.name.clone(),
        }))
    }

    async fn course_exists(&self, id: i64) -> Result<bool, StoreError> {
        self.gate().await?;
        Ok(self.courses.iter().any(|c| c.id == id))
    }

    async fn instructor_exists(&self, id: i64) -> Result<bool, StoreError> {
        self.gate().await?;
        Ok(self.instructors.iter().any(|i| i.id == id))
    }

    async fn dashboard_source(&self) -> Result<DashboardSource, StoreError> {
        self.gate().await?;
        let by_month: BTreeMap<NaiveDate, u64> =
            self.enrollments.iter().fold(BTreeMap::new(), |mut months, e| {
                *months.entry(month_of(e.created_at)).or_default() += 1;
                months
            });
        Ok(DashboardSource {
            students_by_status: tally(&self.students, |s| s.status),
            classes_by_status: tally(&self.classes, |c| c.status),
            candidates_by_status: tally(&self.candidates, |c| c.status),
            courses: self.courses_matching(&CourseQuery {
                relations: vec![Relation::Classes],
                ..Default::default()
            }),
            total_instructors: self.instructors.len() as u64,
            enrollments_by_class: tally(&self.enrollments, |e| e.class_id),
            enrollments_by_month: by_month.into_iter().collect(),
        })
    }
}

/// Counts items per key, keys in first-seen order.
fn tally<T, K: PartialEq>(items: &[T], key: impl Fn(&T) -> K) -> Vec<(K, u64)> {
    let mut counts: Vec<(K, u64)> = Vec::new();
    for item in items {
        let k = key(item);
        match counts.iter_mut().find(|(seen, _)| *seen == k) {
            Some((_, count)) => *count += 1,
            None => counts.push((k, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use escola_models::{
        ActivityStatus, ClassStatus, CourseRef, DateRange, InstructorRef, Shift, StudentStatus,
    };

    fn class(id: i64, name: &str, course_id: i64, instructors: Vec<InstructorRef>) -> Class {
        Class {
            id,
            name: name.to_string(),
            shift: Shift::Noite,
            status: ClassStatus::Ativa,
            course: CourseRef {
                id: course_id,
                name: format!("Curso {}", course_id),
            },
            capacity: 30,
            start_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            instructors,
            enrollment_ids: vec![],
        }
    }

    fn student(id: i64, name: &str, status: StudentStatus) -> Student {
        Student {
            id,
            name: name.to_string(),
            cpf: format!("000.000.000-{:02}", id),
            email: format!("aluno{}@escola.test", id),
            matricula: format!("M{:04}", id),
            status,
            class: Some(ClassRef {
                id: 1,
                name: "Turma A".to_string(),
            }),
            created_at: Utc.with_ymd_and_hms(2026, 3, id as u32, 12, 0, 0).unwrap(),
        }
    }

    fn enrollment(id: i64, student_id: i64, class_id: i64) -> Enrollment {
        Enrollment {
            id,
            student_id,
            class_id,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, id as u32).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_students_filtered_and_sorted_by_name() {
        let store = MemoryStore {
            students: vec![
                student(1, "Carla", StudentStatus::Ativo),
                student(2, "Ana", StudentStatus::Ativo),
                student(3, "Bruno", StudentStatus::Inativo),
            ],
            ..Default::default()
        };

        let all = store.find_students(&StudentQuery::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);
        assert!(all.iter().all(|s| s.class.is_none()));

        let active = store
            .find_students(&StudentQuery {
                status: Some(StudentStatus::Ativo),
                ids: Some(vec![1, 3]),
                relations: vec![Relation::Class],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 1);
        assert!(active[0].class.is_some());
    }

    #[tokio::test]
    async fn test_student_created_range_is_inclusive() {
        let store = MemoryStore {
            students: vec![
                student(1, "A", StudentStatus::Ativo),
                student(2, "B", StudentStatus::Ativo),
                student(3, "C", StudentStatus::Ativo),
            ],
            ..Default::default()
        };
        let found = store
            .find_students(&StudentQuery {
                created: DateRange {
                    start: NaiveDate::from_ymd_opt(2026, 3, 2),
                    end: NaiveDate::from_ymd_opt(2026, 3, 3),
                },
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = found.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_class_relations_derived_from_collections() {
        let maria = InstructorRef {
            id: 9,
            name: "Maria".to_string(),
        };
        let store = MemoryStore {
            classes: vec![
                class(1, "Turma B", 1, vec![maria.clone()]),
                class(2, "Turma A", 1, vec![]),
            ],
            courses: vec![Course {
                id: 1,
                name: "Informática".to_string(),
                workload_hours: 800,
                level: "Técnico".to_string(),
                status: ActivityStatus::Ativo,
                classes: vec![],
            }],
            instructors: vec![Instructor {
                id: 9,
                name: "Maria".to_string(),
                cpf: "1".to_string(),
                email: "maria@escola.test".to_string(),
                specialty: "Redes".to_string(),
                status: ActivityStatus::Ativo,
                classes: vec![],
            }],
            enrollments: vec![enrollment(2, 1, 1), enrollment(1, 2, 1), enrollment(3, 3, 2)],
            ..Default::default()
        };

        let classes = store
            .find_classes(&ClassQuery {
                instructor_id: Some(9),
                relations: vec![Relation::Enrollments, Relation::Instructors],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].enrollment_ids, vec![1, 2]);
        assert_eq!(classes[0].instructors, vec![maria]);

        let courses = store
            .find_courses(&CourseQuery {
                relations: vec![Relation::Classes],
                ..Default::default()
            })
            .await
            .unwrap();
        let class_names: Vec<&str> = courses[0].classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(class_names, vec!["Turma A", "Turma B"]);

        let instructors = store
            .find_instructors(&InstructorQuery {
                relations: vec![Relation::Classes],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(instructors[0].classes.len(), 1);
        assert_eq!(instructors[0].classes[0].id, 1);
    }

    #[tokio::test]
    async fn test_failing_store_reports_query_error() {
        let store = MemoryStore::new().failing("connection refused");
        let err = store.course_exists(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[tokio::test]
    async fn test_dashboard_source_tallies_collections() {
        let mut first = enrollment(1, 1, 1);
        first.created_at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut second = enrollment(2, 2, 1);
        second.created_at = Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap();
        let mut third = enrollment(3, 3, 2);
        third.created_at = Utc.with_ymd_and_hms(2026, 3, 20, 8, 0, 0).unwrap();

        let store = MemoryStore {
            students: vec![
                student(1, "A", StudentStatus::Ativo),
                student(2, "B", StudentStatus::Inativo),
                student(3, "C", StudentStatus::Ativo),
            ],
            classes: vec![class(1, "Turma A", 1, vec![]), class(2, "Turma B", 1, vec![])],
            enrollments: vec![first, second, third],
            ..Default::default()
        };

        let source = store.dashboard_source().await.unwrap();
        assert_eq!(
            source.students_by_status,
            vec![(StudentStatus::Ativo, 2), (StudentStatus::Inativo, 1)]
        );
        assert_eq!(source.classes_by_status, vec![(ClassStatus::Ativa, 2)]);
        assert_eq!(source.enrollments_by_class, vec![(1, 2), (2, 1)]);
        assert_eq!(
            source.enrollments_by_month,
            vec![
                (NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 2),
            ]
        );
    }
}
