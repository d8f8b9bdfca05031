//! PostgreSQL implementation of [`EntityStore`].
//!
//! Rows are decoded into private `*Record` structs and converted into the
//! model DTOs with `TryFrom`, which is where stored status strings are
//! normalised. A status the models do not know is reported as
//! [`StoreError::InvalidRecord`] rather than silently mapped.
//!
//! The dashboard read is a handful of `GROUP BY` counts taken inside one
//! `REPEATABLE READ READ ONLY` transaction.
//!
//! Expected schema: see `migrations/` at the workspace root.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use escola_core::StoreError;
use escola_models::{
    Attendance, AttendanceQuery, Class, ClassQuery, ClassRef, Course, CourseQuery,
    CourseRef, DashboardSource, Enrollment, EnrollmentQuery, Instructor, InstructorQuery,
    InstructorRef, Relation, Student, StudentQuery, StudentRef,
};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use crate::store::EntityStore;

#[derive(Clone, Debug)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn invalid(entity: &'static str, id: i64, reason: impl ToString) -> StoreError {
    StoreError::InvalidRecord {
        entity,
        id,
        reason: reason.to_string(),
    }
}

fn non_negative(entity: &'static str, id: i64, field: &str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| invalid(entity, id, format!("negative {}: {}", field, value)))
}

#[derive(FromRow)]
struct StudentRecord {
    id: i64,
    name: String,
    cpf: String,
    email: String,
    matricula: String,
    status: String,
    class_id: Option<i64>,
    class_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<StudentRecord> for Student {
    type Error = StoreError;

    fn try_from(r: StudentRecord) -> Result<Self, Self::Error> {
        Ok(Student {
            status: r.status.parse().map_err(|e| invalid("student", r.id, e))?,
            class: match (r.class_id, r.class_name) {
                (Some(id), Some(name)) => Some(ClassRef { id, name }),
                _ => None,
            },
            id: r.id,
            name: r.name,
            cpf: r.cpf,
            email: r.email,
            matricula: r.matricula,
            created_at: r.created_at,
        })
    }
}

#[derive(FromRow)]
struct ClassRecord {
    id: i64,
    name: String,
    shift: String,
    status: String,
    course_id: i64,
    course_name: String,
    capacity: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<ClassRecord> for Class {
    type Error = StoreError;

    fn try_from(r: ClassRecord) -> Result<Self, Self::Error> {
        Ok(Class {
            shift: r.shift.parse().map_err(|e| invalid("class", r.id, e))?,
            status: r.status.parse().map_err(|e| invalid("class", r.id, e))?,
            capacity: non_negative("class", r.id, "capacity", r.capacity)?,
            course: CourseRef {
                id: r.course_id,
                name: r.course_name,
            },
            id: r.id,
            name: r.name,
            start_date: r.start_date,
            end_date: r.end_date,
            instructors: Vec::new(),
            enrollment_ids: Vec::new(),
        })
    }
}

#[derive(FromRow)]
struct CourseRecord {
    id: i64,
    name: String,
    workload_hours: i32,
    level: String,
    status: String,
}

impl TryFrom<CourseRecord> for Course {
    type Error = StoreError;

    fn try_from(r: CourseRecord) -> Result<Self, Self::Error> {
        Ok(Course {
            status: r.status.parse().map_err(|e| invalid("course", r.id, e))?,
            workload_hours: non_negative("course", r.id, "workload_hours", r.workload_hours)?,
            id: r.id,
            name: r.name,
            level: r.level,
            classes: Vec::new(),
        })
    }
}

#[derive(FromRow)]
struct InstructorRecord {
    id: i64,
    name: String,
    cpf: String,
    email: String,
    specialty: String,
    status: String,
}

impl TryFrom<InstructorRecord> for Instructor {
    type Error = StoreError;

    fn try_from(r: InstructorRecord) -> Result<Self, Self::Error> {
        Ok(Instructor {
            status: r.status.parse().map_err(|e| invalid("instructor", r.id, e))?,
            id: r.id,
            name: r.name,
            cpf: r.cpf,
            email: r.email,
            specialty: r.specialty,
            classes: Vec::new(),
        })
    }
}

#[derive(FromRow)]
struct AttendanceRecord {
    id: i64,
    student_id: i64,
    student_name: String,
    matricula: String,
    class_id: i64,
    class_name: String,
    date: NaiveDate,
    status: String,
    notes: Option<String>,
}

impl TryFrom<AttendanceRecord> for Attendance {
    type Error = StoreError;

    fn try_from(r: AttendanceRecord) -> Result<Self, Self::Error> {
        Ok(Attendance {
            status: r.status.parse().map_err(|e| invalid("attendance", r.id, e))?,
            id: r.id,
            student: StudentRef {
                id: r.student_id,
                name: r.student_name,
                matricula: r.matricula,
            },
            class: ClassRef {
                id: r.class_id,
                name: r.class_name,
            },
            date: r.date,
            notes: r.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

fn convert<R, T>(records: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    records.into_iter().map(T::try_from).collect()
}

fn push_id_filter(qb: &mut QueryBuilder<'_, Postgres>, column: &str, ids: &Option<Vec<i64>>) {
    if let Some(ids) = ids {
        qb.push(format!(" AND {} = ANY(", column))
            .push_bind(ids.clone())
            .push(")");
    }
}

fn push_date_range(
    qb: &mut QueryBuilder<'_, Postgres>,
    column: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) {
    if let Some(start) = start {
        qb.push(format!(" AND {} >= ", column)).push_bind(start);
    }
    if let Some(end) = end {
        qb.push(format!(" AND {} <= ", column)).push_bind(end);
    }
}

/// Status filters run on the parsed enums, after [`convert`], so a stored
/// spelling such as `"Concluído"` matches its canonical status.
fn retain_status<T, S: PartialEq + Copy>(
    rows: &mut Vec<T>,
    wanted: Option<S>,
    status: impl Fn(&T) -> S,
) {
    if let Some(wanted) = wanted {
        rows.retain(|row| status(row) == wanted);
    }
}

/// Creation dates compare on the UTC calendar day, whatever the session
/// time zone is.
fn students_query(query: &StudentQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(
        r#"SELECT s.id, s.name, s.cpf, s.email, s.matricula, s.status,
                  c.id AS class_id, c.name AS class_name, s.created_at
           FROM students s
           LEFT JOIN classes c ON c.id = s.class_id
           WHERE 1 = 1"#,
    );
    push_id_filter(&mut qb, "s.id", &query.ids);
    push_date_range(
        &mut qb,
        "(s.created_at AT TIME ZONE 'UTC')::date",
        query.created.start,
        query.created.end,
    );
    qb.push(" ORDER BY s.name ASC, s.id ASC");
    qb
}

async fn fetch_students(
    conn: &mut PgConnection,
    query: &StudentQuery,
) -> Result<Vec<Student>, StoreError> {
    let records: Vec<StudentRecord> = students_query(query)
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;

    let mut students: Vec<Student> = convert(records)?;
    retain_status(&mut students, query.status, |s| s.status);
    if !query.relations.contains(&Relation::Class) {
        for student in &mut students {
            student.class = None;
        }
    }
    Ok(students)
}

async fn fetch_classes(
    conn: &mut PgConnection,
    query: &ClassQuery,
) -> Result<Vec<Class>, StoreError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        r#"SELECT c.id, c.name, c.shift, c.status, c.course_id, co.name AS course_name,
                  c.capacity, c.start_date, c.end_date
           FROM classes c
           JOIN courses co ON co.id = c.course_id
           WHERE 1 = 1"#,
    );
    push_id_filter(&mut qb, "c.id", &query.ids);
    if let Some(course_id) = query.course_id {
        qb.push(" AND c.course_id = ").push_bind(course_id);
    }
    if let Some(instructor_id) = query.instructor_id {
        qb.push(
            " AND EXISTS (SELECT 1 FROM class_instructors ci WHERE ci.class_id = c.id AND ci.instructor_id = ",
        )
        .push_bind(instructor_id)
        .push(")");
    }
    push_date_range(&mut qb, "c.start_date", query.starting.start, query.starting.end);
    qb.push(" ORDER BY c.name ASC, c.id ASC");

    let records: Vec<ClassRecord> = qb
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;

    let mut classes: Vec<Class> = convert(records)?;
    retain_status(&mut classes, query.status, |c| c.status);
    let ids: Vec<i64> = classes.iter().map(|c| c.id).collect();

    if query.relations.contains(&Relation::Instructors) {
        let mut by_class = instructors_by_class(conn, &ids).await?;
        for class in &mut classes {
            class.instructors = by_class.remove(&class.id).unwrap_or_default();
        }
    }
    if query.relations.contains(&Relation::Enrollments) {
        let mut by_class = enrollments_by_class(conn, &ids).await?;
        for class in &mut classes {
            class.enrollment_ids = by_class.remove(&class.id).unwrap_or_default();
        }
    }
    Ok(classes)
}

async fn instructors_by_class(
    conn: &mut PgConnection,
    class_ids: &[i64],
) -> Result<HashMap<i64, Vec<InstructorRef>>, StoreError> {
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        r#"SELECT ci.class_id, i.id, i.name
           FROM class_instructors ci
           JOIN instructors i ON i.id = ci.instructor_id
           WHERE ci.class_id = ANY($1)
           ORDER BY i.name ASC"#,
    )
    .bind(class_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(StoreError::query)?;

    let mut map: HashMap<i64, Vec<InstructorRef>> = HashMap::new();
    for (class_id, id, name) in rows {
        map.entry(class_id).or_default().push(InstructorRef { id, name });
    }
    Ok(map)
}

async fn enrollments_by_class(
    conn: &mut PgConnection,
    class_ids: &[i64],
) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        r#"SELECT class_id, id FROM enrollments
           WHERE class_id = ANY($1)
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(class_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(StoreError::query)?;

    let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
    for (class_id, id) in rows {
        map.entry(class_id).or_default().push(id);
    }
    Ok(map)
}

async fn fetch_courses(
    conn: &mut PgConnection,
    query: &CourseQuery,
) -> Result<Vec<Course>, StoreError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT id, name, workload_hours, level, status FROM courses WHERE 1 = 1",
    );
    push_id_filter(&mut qb, "id", &query.ids);
    qb.push(" ORDER BY name ASC, id ASC");

    let records: Vec<CourseRecord> = qb
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;
    let mut courses: Vec<Course> = convert(records)?;
    retain_status(&mut courses, query.status, |c| c.status);

    if query.relations.contains(&Relation::Classes) {
        let ids: Vec<i64> = courses.iter().map(|c| c.id).collect();
        let rows: Vec<(i64, i64, String)> = sqlx::query_as(
            r#"SELECT course_id, id, name FROM classes
               WHERE course_id = ANY($1)
               ORDER BY name ASC"#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;

        let mut by_course: HashMap<i64, Vec<ClassRef>> = HashMap::new();
        for (course_id, id, name) in rows {
            by_course.entry(course_id).or_default().push(ClassRef { id, name });
        }
        for course in &mut courses {
            course.classes = by_course.remove(&course.id).unwrap_or_default();
        }
    }
    Ok(courses)
}

async fn fetch_instructors(
    conn: &mut PgConnection,
    query: &InstructorQuery,
) -> Result<Vec<Instructor>, StoreError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT id, name, cpf, email, specialty, status FROM instructors WHERE 1 = 1",
    );
    push_id_filter(&mut qb, "id", &query.ids);
    qb.push(" ORDER BY name ASC, id ASC");

    let records: Vec<InstructorRecord> = qb
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;
    let mut instructors: Vec<Instructor> = convert(records)?;
    retain_status(&mut instructors, query.status, |i| i.status);

    if query.relations.contains(&Relation::Classes) {
        let ids: Vec<i64> = instructors.iter().map(|i| i.id).collect();
        let rows: Vec<(i64, i64, String)> = sqlx::query_as(
            r#"SELECT ci.instructor_id, c.id, c.name
               FROM class_instructors ci
               JOIN classes c ON c.id = ci.class_id
               WHERE ci.instructor_id = ANY($1)
               ORDER BY c.name ASC"#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;

        let mut by_instructor: HashMap<i64, Vec<ClassRef>> = HashMap::new();
        for (instructor_id, id, name) in rows {
            by_instructor
                .entry(instructor_id)
                .or_default()
                .push(ClassRef { id, name });
        }
        for instructor in &mut instructors {
            instructor.classes = by_instructor.remove(&instructor.id).unwrap_or_default();
        }
    }
    Ok(instructors)
}

async fn fetch_enrollments(
    conn: &mut PgConnection,
    query: &EnrollmentQuery,
) -> Result<Vec<Enrollment>, StoreError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT id, student_id, class_id, created_at FROM enrollments WHERE 1 = 1",
    );
    push_id_filter(&mut qb, "class_id", &query.class_ids);
    qb.push(" ORDER BY created_at ASC, id ASC");

    let rows: Vec<(i64, i64, i64, DateTime<Utc>)> = qb
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;

    Ok(rows
        .into_iter()
        .map(|(id, student_id, class_id, created_at)| Enrollment {
            id,
            student_id,
            class_id,
            created_at,
        })
        .collect())
}

async fn fetch_attendance(
    conn: &mut PgConnection,
    query: &AttendanceQuery,
) -> Result<Vec<Attendance>, StoreError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        r#"SELECT a.id, a.student_id, s.name AS student_name, s.matricula,
                  a.class_id, c.name AS class_name, a.date, a.status, a.notes
           FROM attendances a
           JOIN students s ON s.id = a.student_id
           JOIN classes c ON c.id = a.class_id
           WHERE a.class_id = "#,
    );
    qb.push_bind(query.class_id);
    push_date_range(&mut qb, "a.date", query.dates.start, query.dates.end);
    qb.push(" ORDER BY a.date DESC, a.id ASC");

    let records: Vec<AttendanceRecord> = qb
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;
    convert(records)
}

/// Parses grouped `(status, count, min id)` rows. The smallest id of a
/// group names the offending row when a stored status is unknown.
fn parse_tally<S>(
    entity: &'static str,
    rows: Vec<(String, i64, i64)>,
) -> Result<Vec<(S, u64)>, StoreError>
where
    S: FromStr,
    S::Err: ToString,
{
    rows.into_iter()
        .map(|(status, count, id)| {
            let status: S = status.parse().map_err(|e| invalid(entity, id, e))?;
            Ok((status, count.max(0) as u64))
        })
        .collect()
}

async fn status_tally<S>(
    conn: &mut PgConnection,
    entity: &'static str,
    table: &str,
) -> Result<Vec<(S, u64)>, StoreError>
where
    S: FromStr,
    S::Err: ToString,
{
    let sql = format!(
        "SELECT status, COUNT(*), MIN(id) FROM {} GROUP BY status ORDER BY MIN(id)",
        table
    );
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query)?;
    parse_tally(entity, rows)
}

fn counts<K>(rows: Vec<(K, i64)>) -> Vec<(K, u64)> {
    rows.into_iter()
        .map(|(key, count)| (key, count.max(0) as u64))
        .collect()
}

#[async_trait]
impl EntityStore for PgEntityStore {
    #[instrument(skip(self))]
    async fn find_students(&self, query: &StudentQuery) -> Result<Vec<Student>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::query)?;
        fetch_students(&mut conn, query).await
    }

    #[instrument(skip(self))]
    async fn find_classes(&self, query: &ClassQuery) -> Result<Vec<Class>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::query)?;
        fetch_classes(&mut conn, query).await
    }

    #[instrument(skip(self))]
    async fn find_courses(&self, query: &CourseQuery) -> Result<Vec<Course>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::query)?;
        fetch_courses(&mut conn, query).await
    }

    #[instrument(skip(self))]
    async fn find_instructors(
        &self,
        query: &InstructorQuery,
    ) -> Result<Vec<Instructor>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::query)?;
        fetch_instructors(&mut conn, query).await
    }

    #[instrument(skip(self))]
    async fn find_enrollments(
        &self,
        query: &EnrollmentQuery,
    ) -> Result<Vec<Enrollment>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::query)?;
        fetch_enrollments(&mut conn, query).await
    }

    #[instrument(skip(self))]
    async fn find_attendance(
        &self,
        query: &AttendanceQuery,
    ) -> Result<Vec<Attendance>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::query)?;
        fetch_attendance(&mut conn, query).await
    }

    #[instrument(skip(self))]
    async fn class_ref(&self, id: i64) -> Result<Option<ClassRef>, StoreError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM classes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::query)?;
        Ok(row.map(|(id, name)| ClassRef { id, name }))
    }

    #[instrument(skip(self))]
    async fn course_exists(&self, id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::query)
    }

    #[instrument(skip(self))]
    async fn instructor_exists(&self, id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM instructors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::query)
    }

    #[instrument(skip(self))]
    async fn dashboard_source(&self) -> Result<DashboardSource, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::query)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(StoreError::query)?;

        let students_by_status = status_tally(&mut tx, "student", "students").await?;
        let classes_by_status = status_tally(&mut tx, "class", "classes").await?;
        let candidates_by_status = status_tally(&mut tx, "candidate", "candidates").await?;
        let courses = fetch_courses(
            &mut tx,
            &CourseQuery {
                relations: vec![Relation::Classes],
                ..Default::default()
            },
        )
        .await?;
        let total_instructors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM instructors")
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::query)?;
        let by_class: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT class_id, COUNT(*) FROM enrollments GROUP BY class_id ORDER BY class_id",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::query)?;
        let by_month: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"SELECT date_trunc('month', created_at AT TIME ZONE 'UTC')::date AS month, COUNT(*)
               FROM enrollments
               GROUP BY month
               ORDER BY month"#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::query)?;

        tx.commit().await.map_err(StoreError::query)?;

        Ok(DashboardSource {
            students_by_status,
            classes_by_status,
            candidates_by_status,
            courses,
            total_instructors: total_instructors.max(0) as u64,
            enrollments_by_class: counts(by_class),
            enrollments_by_month: counts(by_month),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use escola_models::{CandidateStatus, DateRange, StudentStatus};

    fn record(id: i64, status: &str) -> StudentRecord {
        StudentRecord {
            id,
            name: format!("Aluno {}", id),
            cpf: String::new(),
            email: String::new(),
            matricula: format!("M{}", id),
            status: status.to_string(),
            class_id: None,
            class_name: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 2, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_accented_status_matches_its_filter() {
        let mut students: Vec<Student> =
            convert(vec![record(1, "Concluído"), record(2, "ativo"), record(3, " CONCLUIDO ")])
                .unwrap();
        retain_status(&mut students, Some(StudentStatus::Concluido), |s| s.status);
        let ids: Vec<i64> = students.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_no_status_filter_keeps_every_row() {
        let mut students: Vec<Student> =
            convert(vec![record(1, "Concluído"), record(2, "ativo")]).unwrap();
        retain_status(&mut students, None, |s| s.status);
        assert_eq!(students.len(), 2);
    }

    #[test]
    fn test_student_sql_compares_utc_days_without_status_predicate() {
        let query = StudentQuery {
            status: Some(StudentStatus::Concluido),
            created: DateRange {
                start: NaiveDate::from_ymd_opt(2026, 3, 1),
                end: NaiveDate::from_ymd_opt(2026, 3, 31),
            },
            ..Default::default()
        };
        let qb = students_query(&query);
        let sql = qb.sql();
        assert!(sql.contains("(s.created_at AT TIME ZONE 'UTC')::date >= "));
        assert!(sql.contains("(s.created_at AT TIME ZONE 'UTC')::date <= "));
        assert!(!sql.contains("LOWER("));
        assert!(!sql.contains("s.status ="));
    }

    #[test]
    fn test_grouped_statuses_merge_spellings() {
        let tally: Vec<(CandidateStatus, u64)> = parse_tally(
            "candidate",
            vec![
                ("aprovado".to_string(), 2, 1),
                ("Aprovado".to_string(), 1, 4),
                ("pendente".to_string(), 3, 2),
            ],
        )
        .unwrap();
        assert_eq!(
            tally,
            vec![
                (CandidateStatus::Aprovado, 2),
                (CandidateStatus::Aprovado, 1),
                (CandidateStatus::Pendente, 3),
            ]
        );
    }

    #[test]
    fn test_unknown_grouped_status_names_a_row() {
        let err = parse_tally::<StudentStatus>("student", vec![("matriculado".to_string(), 4, 17)])
            .unwrap_err();
        match err {
            StoreError::InvalidRecord { entity, id, .. } => {
                assert_eq!(entity, "student");
                assert_eq!(id, 17);
            }
            other => panic!("expected invalid record, got {:?}", other),
        }
    }
}
