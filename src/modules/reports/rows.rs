//! Builds the shared row model from fetched entities.

use std::collections::HashMap;

use escola_models::{
    Attendance, AttendanceEntry, AttendanceStat, AttendanceStatus, Class, ClassRow, Course,
    CourseRow, Instructor, InstructorRow, ReportRows, Student, StudentRow,
};

pub fn student_rows(students: &[Student]) -> ReportRows {
    ReportRows::Students(students.iter().map(StudentRow::from).collect())
}

pub fn class_rows(classes: &[Class]) -> ReportRows {
    ReportRows::Classes(classes.iter().map(ClassRow::from).collect())
}

pub fn course_rows(courses: &[Course]) -> ReportRows {
    ReportRows::Courses(courses.iter().map(CourseRow::from).collect())
}

pub fn instructor_rows(instructors: &[Instructor]) -> ReportRows {
    ReportRows::Instructors(instructors.iter().map(InstructorRow::from).collect())
}

/// Present share of `total`, as a percentage rounded to one decimal place.
pub fn attendance_percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(present) / f64::from(total) * 1000.0).round() / 10.0
}

/// Groups attendance events by student.
///
/// Groups keep the order in which each student first appears in `records`;
/// events keep their order inside each group.
pub fn group_attendance(records: &[Attendance]) -> Vec<AttendanceStat> {
    let mut groups: Vec<AttendanceStat> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.student.id).or_insert_with(|| {
            groups.push(AttendanceStat {
                student_id: record.student.id,
                student_name: record.student.name.clone(),
                matricula: record.student.matricula.clone(),
                total: 0,
                present: 0,
                absent: 0,
                justified: 0,
                percentage: 0.0,
                entries: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total += 1;
        match record.status {
            AttendanceStatus::Presente => group.present += 1,
            AttendanceStatus::Ausente => group.absent += 1,
            AttendanceStatus::Justificado => group.justified += 1,
        }
        group.entries.push(AttendanceEntry {
            id: record.id,
            date: record.date,
            status: record.status,
            notes: record.notes.clone(),
        });
    }

    for group in &mut groups {
        group.percentage = attendance_percentage(group.present, group.total);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use escola_models::{ClassRef, StudentRef};

    fn record(id: i64, student_id: i64, day: u32, status: AttendanceStatus) -> Attendance {
        Attendance {
            id,
            student: StudentRef {
                id: student_id,
                name: format!("Aluno {}", student_id),
                matricula: format!("M{}", student_id),
            },
            class: ClassRef {
                id: 7,
                name: "Turma 7".to_string(),
            },
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            status,
            notes: None,
        }
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(attendance_percentage(2, 3), 66.7);
        assert_eq!(attendance_percentage(1, 3), 33.3);
        assert_eq!(attendance_percentage(3, 3), 100.0);
        assert_eq!(attendance_percentage(0, 4), 0.0);
    }

    #[test]
    fn test_percentage_zero_total_is_zero() {
        let pct = attendance_percentage(0, 0);
        assert_eq!(pct, 0.0);
        assert!(!pct.is_nan());
    }

    #[test]
    fn test_groups_follow_first_appearance_order() {
        // date-descending input, as the store returns it
        let records = vec![
            record(1, 30, 20, AttendanceStatus::Presente),
            record(2, 10, 20, AttendanceStatus::Ausente),
            record(3, 30, 19, AttendanceStatus::Justificado),
            record(4, 20, 19, AttendanceStatus::Presente),
            record(5, 10, 18, AttendanceStatus::Presente),
        ];

        let groups = group_attendance(&records);
        let order: Vec<i64> = groups.iter().map(|g| g.student_id).collect();
        assert_eq!(order, vec![30, 10, 20]);

        let first = &groups[0];
        assert_eq!(first.total, 2);
        assert_eq!(first.present, 1);
        assert_eq!(first.justified, 1);
        assert_eq!(first.percentage, 50.0);
        let entry_ids: Vec<i64> = first.entries.iter().map(|e| e.id).collect();
        assert_eq!(entry_ids, vec![1, 3]);

        let second = &groups[1];
        assert_eq!((second.present, second.absent), (1, 1));
        assert_eq!(second.percentage, 50.0);
    }

    #[test]
    fn test_counts_add_up_per_group() {
        let records = vec![
            record(1, 1, 3, AttendanceStatus::Presente),
            record(2, 1, 2, AttendanceStatus::Presente),
            record(3, 1, 1, AttendanceStatus::Ausente),
        ];
        let groups = group_attendance(&records);
        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.present + g.absent + g.justified, g.total);
        assert_eq!(g.percentage, 66.7);
    }

    #[test]
    fn test_no_records_no_groups() {
        assert!(group_attendance(&[]).is_empty());
    }
}
