//! Entity DTOs handed to the reporting engine by the fetch boundary.
//!
//! These are point-in-time, read-only views. Relations are represented by the
//! `*Ref` structs (id + display fields) so the graph stays acyclic; a relation
//! that was not requested in the query arrives empty.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{
    ActivityStatus, AttendanceStatus, CandidateStatus, ClassStatus, Shift, StudentStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub id: i64,
    pub name: String,
    pub matricula: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub email: String,
    /// Registration number, unrelated to [`Enrollment`].
    pub matricula: String,
    pub status: StudentStatus,
    pub class: Option<ClassRef>,
    pub created_at: DateTime<Utc>,
}

/// A turma: a scheduled offering of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub shift: Shift,
    pub status: ClassStatus,
    pub course: CourseRef,
    pub capacity: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub instructors: Vec<InstructorRef>,
    pub enrollment_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub workload_hours: u32,
    pub level: String,
    pub status: ActivityStatus,
    pub classes: Vec<ClassRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub specialty: String,
    pub status: ActivityStatus,
    pub classes: Vec<ClassRef>,
}

/// Join record: exactly one student in exactly one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub created_at: DateTime<Utc>,
}

/// One dated attendance event, unique per (student, class, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub student: StudentRef,
    pub class: ClassRef,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: CandidateStatus,
    pub course: CourseRef,
    pub created_at: DateTime<Utc>,
}
