//! Single-sheet workbook output.
//!
//! The sheet is a projection of the same [`ReportData`] the document is laid
//! out from: one header row, then one row per record in record order, then a
//! total line. Column A always holds the record id.

use escola_config::ReportConfig;
use escola_core::ReportError;
use escola_models::{AttendanceStatus, ReportData, ReportRows};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use tracing::debug;

const DATE_FORMAT: &str = "%d/%m/%Y";

const PRESENT_FILL: u32 = 0xC6EFCE;
const ABSENT_FILL: u32 = 0xFFC7CE;
const JUSTIFIED_FILL: u32 = 0xFFEB9C;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Percent(f64),
    /// Attendance status, rendered with its fill color.
    Status(AttendanceStatus),
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn id(value: i64) -> Self {
        Cell::Number(value as f64)
    }

    fn count(value: impl Into<f64>) -> Self {
        Cell::Number(value.into())
    }
}

/// Column header and width, in character units.
pub type Column = (&'static str, f64);

pub fn columns(rows: &ReportRows) -> &'static [Column] {
    match rows {
        ReportRows::Students(_) => &[
            ("ID", 8.0),
            ("Nome", 30.0),
            ("CPF", 16.0),
            ("Matrícula", 14.0),
            ("E-mail", 30.0),
            ("Status", 12.0),
            ("Turma", 20.0),
        ],
        ReportRows::Classes(_) => &[
            ("ID", 8.0),
            ("Turma", 24.0),
            ("Curso", 28.0),
            ("Turno", 12.0),
            ("Status", 12.0),
            ("Capacidade", 12.0),
            ("Matriculados", 13.0),
            ("Início", 12.0),
            ("Término", 12.0),
            ("Instrutores", 40.0),
        ],
        ReportRows::Courses(_) => &[
            ("ID", 8.0),
            ("Curso", 30.0),
            ("Carga Horária", 14.0),
            ("Nível", 16.0),
            ("Status", 12.0),
            ("Turmas", 40.0),
        ],
        ReportRows::Instructors(_) => &[
            ("ID", 8.0),
            ("Nome", 30.0),
            ("CPF", 16.0),
            ("E-mail", 30.0),
            ("Especialidade", 20.0),
            ("Status", 12.0),
            ("Turmas", 40.0),
        ],
        ReportRows::Attendance(_) => &[
            ("ID", 8.0),
            ("Aluno", 30.0),
            ("Matrícula", 14.0),
            ("Data", 12.0),
            ("Status", 14.0),
            ("Observações", 36.0),
            ("Frequência (%)", 15.0),
        ],
    }
}

/// Data rows in record order, one per record (one per event for attendance).
pub fn table(rows: &ReportRows) -> Vec<Vec<Cell>> {
    match rows {
        ReportRows::Students(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    Cell::id(r.id),
                    Cell::text(&r.name),
                    Cell::text(&r.cpf),
                    Cell::text(&r.matricula),
                    Cell::text(&r.email),
                    Cell::text(r.status.label()),
                    Cell::text(r.class_name.as_deref().unwrap_or("")),
                ]
            })
            .collect(),
        ReportRows::Classes(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    Cell::id(r.id),
                    Cell::text(&r.name),
                    Cell::text(&r.course_name),
                    Cell::text(r.shift.label()),
                    Cell::text(r.status.label()),
                    Cell::count(r.capacity),
                    Cell::Number(r.enrolled as f64),
                    Cell::text(r.start_date.format(DATE_FORMAT).to_string()),
                    Cell::text(r.end_date.format(DATE_FORMAT).to_string()),
                    Cell::text(r.instructors.join(", ")),
                ]
            })
            .collect(),
        ReportRows::Courses(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    Cell::id(r.id),
                    Cell::text(&r.name),
                    Cell::count(r.workload_hours),
                    Cell::text(&r.level),
                    Cell::text(r.status.label()),
                    Cell::text(r.class_names.join(", ")),
                ]
            })
            .collect(),
        ReportRows::Instructors(rows) => rows
            .iter()
            .map(|r| {
                vec![
                    Cell::id(r.id),
                    Cell::text(&r.name),
                    Cell::text(&r.cpf),
                    Cell::text(&r.email),
                    Cell::text(&r.specialty),
                    Cell::text(r.status.label()),
                    Cell::text(r.class_names.join(", ")),
                ]
            })
            .collect(),
        ReportRows::Attendance(groups) => groups
            .iter()
            .flat_map(|group| {
                group.entries.iter().map(move |entry| {
                    vec![
                        Cell::id(entry.id),
                        Cell::text(&group.student_name),
                        Cell::text(&group.matricula),
                        Cell::text(entry.date.format(DATE_FORMAT).to_string()),
                        Cell::Status(entry.status),
                        Cell::text(entry.notes.as_deref().unwrap_or("")),
                        Cell::Percent(group.percentage),
                    ]
                })
            })
            .collect(),
    }
}

struct Styles {
    header: Format,
    cell: Format,
    percent: Format,
    total: Format,
    present: Format,
    absent: Format,
    justified: Format,
}

impl Styles {
    fn new(brand_color: u32) -> Self {
        let cell = Format::new().set_border(FormatBorder::Thin);
        let status = |fill: u32| {
            Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(fill))
        };

        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(brand_color))
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin),
            percent: Format::new()
                .set_num_format("0.0")
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin),
            total: Format::new().set_bold().set_border(FormatBorder::Thin),
            present: status(PRESENT_FILL),
            absent: status(ABSENT_FILL),
            justified: status(JUSTIFIED_FILL),
            cell,
        }
    }

    fn status(&self, status: AttendanceStatus) -> &Format {
        match status {
            AttendanceStatus::Presente => &self.present,
            AttendanceStatus::Ausente => &self.absent,
            AttendanceStatus::Justificado => &self.justified,
        }
    }
}

pub struct WorkbookBuilder<'a> {
    config: &'a ReportConfig,
}

impl<'a> WorkbookBuilder<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, data: &ReportData) -> Result<Vec<u8>, ReportError> {
        self.write(data)
            .map_err(|e| ReportError::internal(data.kind.slug(), "workbook", None, e))
    }

    fn write(&self, data: &ReportData) -> Result<Vec<u8>, XlsxError> {
        let styles = Styles::new(self.config.brand_color);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(data.kind.sheet_name())?;

        for (col, (header, width)) in columns(&data.rows).iter().enumerate() {
            let col = col as u16;
            worksheet.write_with_format(0, col, *header, &styles.header)?;
            worksheet.set_column_width(col, *width)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        let table = table(&data.rows);
        for (idx, cells) in table.iter().enumerate() {
            let row = 1 + idx as u32;
            for (col, cell) in cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(value) => {
                        worksheet.write_with_format(row, col, value, &styles.cell)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_with_format(row, col, *value, &styles.cell)?;
                    }
                    Cell::Percent(value) => {
                        worksheet.write_with_format(row, col, *value, &styles.percent)?;
                    }
                    Cell::Status(status) => {
                        worksheet.write_with_format(row, col, status.label(), styles.status(*status))?;
                    }
                }
            }
        }

        let total_row = table.len() as u32 + 2;
        worksheet.write_with_format(
            total_row,
            0,
            format!("Total de registros: {}", data.rows.record_count()),
            &styles.total,
        )?;

        debug!(report = %data.kind, rows = table.len(), "workbook written");

        workbook.save_to_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use escola_models::{AttendanceEntry, AttendanceStat, ClassRow, ClassStatus, ReportKind, Shift};

    #[test]
    fn test_every_row_matches_header_width() {
        let rows = ReportRows::Classes(vec![ClassRow {
            id: 4,
            name: "Turma A".to_string(),
            course_name: "Informática".to_string(),
            shift: Shift::Noite,
            status: ClassStatus::Ativa,
            capacity: 30,
            enrolled: 2,
            start_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 15).unwrap(),
            instructors: vec!["Maria".to_string(), "João".to_string()],
        }]);
        let table = table(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].len(), columns(&rows).len());
        assert_eq!(table[0][0], Cell::Number(4.0));
        assert_eq!(table[0][3], Cell::Text("Noite".to_string()));
        assert_eq!(table[0][7], Cell::Text("01/02/2026".to_string()));
        assert_eq!(table[0][9], Cell::Text("Maria, João".to_string()));
    }

    #[test]
    fn test_attendance_rows_carry_group_percentage() {
        let entry = |id, status| AttendanceEntry {
            id,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            status,
            notes: None,
        };
        let rows = ReportRows::Attendance(vec![AttendanceStat {
            student_id: 1,
            student_name: "Ana".to_string(),
            matricula: "M1".to_string(),
            total: 3,
            present: 2,
            absent: 0,
            justified: 1,
            percentage: 66.7,
            entries: vec![
                entry(5, AttendanceStatus::Presente),
                entry(3, AttendanceStatus::Justificado),
                entry(2, AttendanceStatus::Presente),
            ],
        }]);

        let table = table(&rows);
        assert_eq!(table.len(), 3);
        let ids: Vec<&Cell> = table.iter().map(|r| &r[0]).collect();
        assert_eq!(ids, vec![&Cell::Number(5.0), &Cell::Number(3.0), &Cell::Number(2.0)]);
        assert!(table.iter().all(|r| r[6] == Cell::Percent(66.7)));
        assert_eq!(table[1][4], Cell::Status(AttendanceStatus::Justificado));
    }

    #[test]
    fn test_total_line_is_bold_with_thin_border() {
        let styles = Styles::new(ReportConfig::default().brand_color);
        assert_eq!(
            styles.total,
            Format::new().set_bold().set_border(FormatBorder::Thin)
        );
        assert_ne!(styles.total, Format::new().set_bold());
    }

    #[test]
    fn test_build_writes_xlsx_container() {
        let config = ReportConfig::default();
        let data = ReportData {
            kind: ReportKind::Students,
            filter_summary: None,
            rows: ReportRows::Students(vec![]),
        };
        let bytes = WorkbookBuilder::new(&config).build(&data).unwrap();
        // xlsx is a zip archive
        assert!(bytes.starts_with(b"PK"));
    }
}
