//! # Escola Models
//!
//! Read-only data structures consumed and produced by the reporting engine.
//! Every entity arrives as a flat, acyclic DTO assembled by the fetch boundary;
//! relations are carried as small reference structs, never as back-linked objects.
//!
//! # Modules
//!
//! - [`status`]: Normalised status enums (student, class, shift, attendance, ...)
//! - [`entities`]: Entity DTOs and reference structs
//! - [`filters`]: Caller filter criteria and per-entity store queries
//! - [`reports`]: Report kinds, formats, artifacts and row models
//! - [`dashboard`]: Dashboard snapshot and its inputs

pub mod dashboard;
pub mod entities;
pub mod filters;
pub mod reports;
pub mod status;

pub use dashboard::{
    CourseEnrollmentCount, DashboardSnapshot, DashboardSource, MonthlyEnrollment, month_of,
    tally_of, tally_total,
};
pub use entities::{
    Attendance, Candidate, Class, ClassRef, Course, CourseRef, Enrollment, Instructor,
    InstructorRef, Student, StudentRef,
};
pub use filters::{
    AttendanceQuery, ClassQuery, CourseQuery, DateRange, EnrollmentQuery, FilterCriteria,
    IMPOSSIBLE_ID, InstructorQuery, Relation, StudentQuery, allows,
};
pub use reports::{
    AttendanceEntry, AttendanceStat, ClassRow, CourseRow, InstructorRow, ReportArtifact,
    ReportData, ReportFormat, ReportKind, ReportRows, StudentRow,
};
pub use status::{
    ActivityStatus, AttendanceStatus, CandidateStatus, ClassStatus, Shift, StatusParseError,
    StudentStatus,
};
