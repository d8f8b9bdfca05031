//! Report kinds, output formats and the row model shared by every output format.
//!
//! [`ReportData`] is built once per request from the fetched entities. Both the
//! document layout and the workbook builder read from it, so the two artifacts
//! always carry the same rows in the same order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::{Class, Course, Instructor, Student};
use crate::status::{ActivityStatus, AttendanceStatus, ClassStatus, Shift, StudentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Students,
    Classes,
    Courses,
    Instructors,
    Attendance,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Students,
        ReportKind::Classes,
        ReportKind::Courses,
        ReportKind::Instructors,
        ReportKind::Attendance,
    ];

    /// Used in file names, routes and metric labels.
    pub const fn slug(&self) -> &'static str {
        match self {
            ReportKind::Students => "students",
            ReportKind::Classes => "classes",
            ReportKind::Courses => "courses",
            ReportKind::Instructors => "instructors",
            ReportKind::Attendance => "attendance",
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            ReportKind::Students => "Relatório de Alunos",
            ReportKind::Classes => "Relatório de Turmas",
            ReportKind::Courses => "Relatório de Cursos",
            ReportKind::Instructors => "Relatório de Instrutores",
            ReportKind::Attendance => "Relatório de Frequência",
        }
    }

    /// Worksheet name for the single sheet of the workbook.
    pub const fn sheet_name(&self) -> &'static str {
        match self {
            ReportKind::Students => "Alunos",
            ReportKind::Classes => "Turmas",
            ReportKind::Courses => "Cursos",
            ReportKind::Instructors => "Instrutores",
            ReportKind::Attendance => "Frequência",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| format!("unknown report type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Xlsx,
}

impl ReportFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Xlsx => "xlsx",
        }
    }

    pub const fn media_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// A finished, fully in-memory report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub kind: ReportKind,
    pub format: ReportFormat,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    /// `<report-type>-<YYYY-MM-DD>.<ext>`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!(
            "{}-{}.{}",
            self.kind.slug(),
            date.format("%Y-%m-%d"),
            self.format.extension()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRow {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub matricula: String,
    pub email: String,
    pub status: StudentStatus,
    pub class_name: Option<String>,
}

impl From<&Student> for StudentRow {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            cpf: student.cpf.clone(),
            matricula: student.matricula.clone(),
            email: student.email.clone(),
            status: student.status,
            class_name: student.class.as_ref().map(|c| c.name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRow {
    pub id: i64,
    pub name: String,
    pub course_name: String,
    pub shift: Shift,
    pub status: ClassStatus,
    pub capacity: u32,
    pub enrolled: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub instructors: Vec<String>,
}

impl From<&Class> for ClassRow {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            course_name: class.course.name.clone(),
            shift: class.shift,
            status: class.status,
            capacity: class.capacity,
            enrolled: class.enrollment_ids.len(),
            start_date: class.start_date,
            end_date: class.end_date,
            instructors: class.instructors.iter().map(|i| i.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow {
    pub id: i64,
    pub name: String,
    pub workload_hours: u32,
    pub level: String,
    pub status: ActivityStatus,
    pub class_names: Vec<String>,
}

impl From<&Course> for CourseRow {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            name: course.name.clone(),
            workload_hours: course.workload_hours,
            level: course.level.clone(),
            status: course.status,
            class_names: course.classes.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorRow {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub specialty: String,
    pub status: ActivityStatus,
    pub class_names: Vec<String>,
}

impl From<&Instructor> for InstructorRow {
    fn from(instructor: &Instructor) -> Self {
        Self {
            id: instructor.id,
            name: instructor.name.clone(),
            cpf: instructor.cpf.clone(),
            email: instructor.email.clone(),
            specialty: instructor.specialty.clone(),
            status: instructor.status,
            class_names: instructor.classes.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

/// One attendance event inside a student's group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Attendance summary for one student within the filtered class.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceStat {
    pub student_id: i64,
    pub student_name: String,
    pub matricula: String,
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub justified: u32,
    /// `present / total * 100` rounded to one decimal; `0.0` when `total` is 0.
    pub percentage: f64,
    pub entries: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportRows {
    Students(Vec<StudentRow>),
    Classes(Vec<ClassRow>),
    Courses(Vec<CourseRow>),
    Instructors(Vec<InstructorRow>),
    Attendance(Vec<AttendanceStat>),
}

impl ReportRows {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRows::Students(_) => ReportKind::Students,
            ReportRows::Classes(_) => ReportKind::Classes,
            ReportRows::Courses(_) => ReportKind::Courses,
            ReportRows::Instructors(_) => ReportKind::Instructors,
            ReportRows::Attendance(_) => ReportKind::Attendance,
        }
    }

    /// Number of records. For attendance this counts events, not student groups.
    pub fn record_count(&self) -> usize {
        match self {
            ReportRows::Students(rows) => rows.len(),
            ReportRows::Classes(rows) => rows.len(),
            ReportRows::Courses(rows) => rows.len(),
            ReportRows::Instructors(rows) => rows.len(),
            ReportRows::Attendance(groups) => groups.iter().map(|g| g.entries.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Record identifiers in output order.
    pub fn record_ids(&self) -> Vec<i64> {
        match self {
            ReportRows::Students(rows) => rows.iter().map(|r| r.id).collect(),
            ReportRows::Classes(rows) => rows.iter().map(|r| r.id).collect(),
            ReportRows::Courses(rows) => rows.iter().map(|r| r.id).collect(),
            ReportRows::Instructors(rows) => rows.iter().map(|r| r.id).collect(),
            ReportRows::Attendance(groups) => groups
                .iter()
                .flat_map(|g| g.entries.iter().map(|e| e.id))
                .collect(),
        }
    }
}

/// Everything needed to render one report, independent of output format.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub kind: ReportKind,
    /// Human-readable description of the active filters, if any.
    pub filter_summary: Option<String>,
    pub rows: ReportRows,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_parse() {
        assert_eq!("students".parse::<ReportKind>().unwrap(), ReportKind::Students);
        assert_eq!(" Attendance ".parse::<ReportKind>().unwrap(), ReportKind::Attendance);
        assert!("grades".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!("PDF".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert_eq!("xlsx".parse::<ReportFormat>().unwrap(), ReportFormat::Xlsx);
        assert!("csv".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_artifact_file_name_and_media_type() {
        let artifact = ReportArtifact {
            kind: ReportKind::Attendance,
            format: ReportFormat::Xlsx,
            bytes: vec![],
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(artifact.file_name(date), "attendance-2026-10-16.xlsx");
        assert_eq!(
            artifact.media_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn test_attendance_record_ids_flatten_groups() {
        let entry = |id| AttendanceEntry {
            id,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            status: AttendanceStatus::Presente,
            notes: None,
        };
        let group = |student_id, entries| AttendanceStat {
            student_id,
            student_name: "Aluno".to_string(),
            matricula: "M".to_string(),
            total: 0,
            present: 0,
            absent: 0,
            justified: 0,
            percentage: 0.0,
            entries,
        };
        let rows = ReportRows::Attendance(vec![
            group(2, vec![entry(10), entry(8)]),
            group(1, vec![entry(9)]),
        ]);
        assert_eq!(rows.record_ids(), vec![10, 8, 9]);
        assert_eq!(rows.record_count(), 3);
        assert_eq!(rows.kind(), ReportKind::Attendance);
    }
}
