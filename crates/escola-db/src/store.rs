//! The entity store boundary.
//!
//! The reporting engine never builds queries itself. It hands a resolved query
//! (constraints plus the [`Relation`](escola_models::Relation)s it needs) to an
//! [`EntityStore`] and receives flat DTOs back.
//!
//! # Ordering contract
//!
//! - students, classes, courses and instructors: by name, ascending
//! - attendance: by date descending, then id ascending
//! - enrollments: by creation time, ascending

use async_trait::async_trait;
use escola_core::StoreError;
use escola_models::{
    Attendance, AttendanceQuery, Class, ClassQuery, ClassRef, Course, CourseQuery,
    DashboardSource, Enrollment, EnrollmentQuery, Instructor, InstructorQuery, Student,
    StudentQuery,
};

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_students(&self, query: &StudentQuery) -> Result<Vec<Student>, StoreError>;

    async fn find_classes(&self, query: &ClassQuery) -> Result<Vec<Class>, StoreError>;

    async fn find_courses(&self, query: &CourseQuery) -> Result<Vec<Course>, StoreError>;

    async fn find_instructors(
        &self,
        query: &InstructorQuery,
    ) -> Result<Vec<Instructor>, StoreError>;

    async fn find_enrollments(
        &self,
        query: &EnrollmentQuery,
    ) -> Result<Vec<Enrollment>, StoreError>;

    async fn find_attendance(&self, query: &AttendanceQuery)
    -> Result<Vec<Attendance>, StoreError>;

    /// Looks up a class by id; `None` when it does not exist.
    async fn class_ref(&self, id: i64) -> Result<Option<ClassRef>, StoreError>;

    async fn course_exists(&self, id: i64) -> Result<bool, StoreError>;

    async fn instructor_exists(&self, id: i64) -> Result<bool, StoreError>;

    /// Counts everything the dashboard needs within one read session, so all
    /// tallies reflect (as nearly as the store allows) a single point in time.
    async fn dashboard_source(&self) -> Result<DashboardSource, StoreError>;
}
