//! Paginated document layout.
//!
//! Layout runs in two passes over an ordered list of [`Page`]s:
//!
//! 1. [`DocumentLayoutEngine::layout`] streams the header and one block per
//!    record onto pages, starting a new page whenever the cursor has passed the
//!    report's threshold (or the next block would run into the footer band).
//! 2. [`DocumentLayoutEngine::stamp_footers`] runs once the page count is known
//!    and writes `Página i de N | ...` on every page.
//!
//! Coordinates are PDF points measured from the top-left corner of an A4 page.
//! The byte encoding lives in [`super::pdf`].

use chrono::{DateTime, Utc};
use escola_config::ReportConfig;
use escola_core::ReportError;
use escola_models::{
    AttendanceEntry, AttendanceStat, ClassRow, CourseRow, InstructorRow, ReportData, ReportKind, ReportRows,
    StudentRow,
};
use tracing::debug;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN_TOP: f32 = 50.0;
pub const MARGIN_LEFT: f32 = 50.0;
/// Lowest point content may reach. The footer band lies below it.
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - 50.0;
/// Distance of the footer baseline from the bottom edge.
pub const FOOTER_OFFSET: f32 = 30.0;

const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 9.0;
const FOOTER_SIZE: f32 = 8.0;
const LINE_SPACING: f32 = 4.0;
const BLOCK_GAP: f32 = 8.0;
const HEADER_GAP: f32 = 15.0;
const BODY_INDENT: f32 = 15.0;
/// Average Helvetica glyph width as a share of the font size.
const GLYPH_WIDTH: f32 = 0.5;

pub const NO_RECORDS: &str = "Nenhum registro encontrado.";

/// Cursor position past which a record block starts on a new page.
pub const fn page_threshold(kind: ReportKind) -> f32 {
    match kind {
        ReportKind::Students | ReportKind::Attendance => 700.0,
        ReportKind::Classes | ReportKind::Courses | ReportKind::Instructors => 650.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f32,
    /// Baseline, from the top edge.
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    /// Id of the record this line opens, if any.
    pub record: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
    pub footer: Option<TextLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Record ids in the order their blocks appear.
    pub fn record_ids(&self) -> Vec<i64> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter().filter_map(|line| line.record))
            .collect()
    }

    pub fn footers(&self) -> Vec<&str> {
        self.pages
            .iter()
            .filter_map(|page| page.footer.as_ref().map(|f| f.text.as_str()))
            .collect()
    }

    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }
}

#[derive(Debug, Clone)]
struct LineSpec {
    text: String,
    size: f32,
    bold: bool,
    indent: f32,
}

impl LineSpec {
    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: HEADING_SIZE,
            bold: true,
            indent: 0.0,
        }
    }

    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: BODY_SIZE,
            bold: false,
            indent: BODY_INDENT,
        }
    }

    fn advance(&self) -> f32 {
        self.size + LINE_SPACING
    }
}

/// Lines that stay together on one page unless the block is taller than a
/// page body.
#[derive(Debug)]
struct Block {
    record: Option<i64>,
    /// Index of the line that carries `record`.
    record_line: usize,
    lines: Vec<LineSpec>,
    gap_after: f32,
}

impl Block {
    fn new(record: Option<i64>) -> Self {
        Self {
            record,
            record_line: 0,
            lines: Vec::new(),
            gap_after: BLOCK_GAP,
        }
    }

    /// Appends `spec` and marks its first line as the block's record.
    fn record_entry(mut self, record: i64, spec: LineSpec) -> Self {
        self.record = Some(record);
        self.record_line = self.lines.len();
        self.line(spec)
    }

    fn gap_after(mut self, gap: f32) -> Self {
        self.gap_after = gap;
        self
    }

    fn line(mut self, spec: LineSpec) -> Self {
        let width = PAGE_WIDTH - 2.0 * MARGIN_LEFT - spec.indent;
        let max_chars = (width / (spec.size * GLYPH_WIDTH)) as usize;
        for text in wrap(&spec.text, max_chars) {
            self.lines.push(LineSpec {
                text,
                ..spec.clone()
            });
        }
        self
    }

    fn height(&self) -> f32 {
        self.lines.iter().map(LineSpec::advance).sum()
    }
}

/// Greedy word wrap on character count. Words longer than `max_chars` are
/// split into `max_chars` pieces.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            if current_len > 0 && current_len + 1 + piece.len() > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece.len();
        }
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn centered_x(text: &str, size: f32) -> f32 {
    let width = text.chars().count() as f32 * size * GLYPH_WIDTH;
    ((PAGE_WIDTH - width) / 2.0).max(MARGIN_LEFT)
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Pass-one state: finished pages plus the page being filled.
struct Layout {
    threshold: f32,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl Layout {
    fn new(kind: ReportKind) -> Self {
        Self {
            threshold: page_threshold(kind),
            pages: Vec::new(),
            current: Page::default(),
            cursor: MARGIN_TOP,
        }
    }

    fn emit(&mut self, spec: &LineSpec, x: f32, record: Option<i64>) {
        self.current.lines.push(TextLine {
            text: spec.text.clone(),
            x,
            y: self.cursor + spec.size,
            size: spec.size,
            bold: spec.bold,
            record,
        });
        self.cursor += spec.advance();
    }

    fn centered(&mut self, spec: LineSpec) {
        let x = centered_x(&spec.text, spec.size);
        self.emit(&spec, x, None);
    }

    fn gap(&mut self, gap: f32) {
        self.cursor += gap;
    }

    fn break_page(&mut self) {
        let full = std::mem::take(&mut self.current);
        self.pages.push(full);
        self.cursor = MARGIN_TOP;
    }

    /// Places a block, breaking the page first when the cursor is past the
    /// threshold or the block would reach the footer band. A block taller
    /// than a page body flows on line by line, breaking pages as it goes.
    fn place(&mut self, block: Block) {
        let height = block.height();
        let fits_page = height <= CONTENT_BOTTOM - MARGIN_TOP;
        let started = !self.current.lines.is_empty();
        if started
            && (self.cursor > self.threshold
                || (fits_page && self.cursor + height > CONTENT_BOTTOM))
        {
            self.break_page();
        }

        for (i, spec) in block.lines.iter().enumerate() {
            if self.cursor + spec.advance() > CONTENT_BOTTOM && !self.current.lines.is_empty() {
                self.break_page();
            }
            let record = if i == block.record_line { block.record } else { None };
            self.emit(spec, MARGIN_LEFT + spec.indent, record);
        }
        self.gap(block.gap_after);
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }
}

pub struct DocumentLayoutEngine<'a> {
    config: &'a ReportConfig,
}

impl<'a> DocumentLayoutEngine<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Runs both passes.
    pub fn render(
        &self,
        data: &ReportData,
        generated_at: DateTime<Utc>,
    ) -> Result<Document, ReportError> {
        let mut pages = self.layout(data, generated_at)?;
        self.stamp_footers(&mut pages);

        debug!(
            report = %data.kind,
            pages = pages.len(),
            records = data.rows.record_count(),
            "document laid out"
        );

        Ok(Document {
            title: format!("{} - {}", data.kind.title(), self.config.organization),
            pages,
        })
    }

    /// Pass one. Pages come back without footers.
    pub fn layout(
        &self,
        data: &ReportData,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<Page>, ReportError> {
        let mut layout = Layout::new(data.kind);
        self.header(&mut layout, data, generated_at);

        if data.rows.is_empty() {
            layout.emit(&LineSpec::heading(NO_RECORDS), MARGIN_LEFT, None);
            return Ok(layout.finish());
        }

        match &data.rows {
            ReportRows::Students(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    layout.place(student_block(i, row));
                }
            }
            ReportRows::Classes(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    layout.place(class_block(i, row));
                }
            }
            ReportRows::Courses(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    layout.place(course_block(i, row));
                }
            }
            ReportRows::Instructors(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    layout.place(instructor_block(i, row));
                }
            }
            ReportRows::Attendance(groups) => attendance_blocks(&mut layout, groups),
        }

        Ok(layout.finish())
    }

    /// Pass two. Must only run on the complete page list.
    pub fn stamp_footers(&self, pages: &mut [Page]) {
        let total = pages.len();
        for (i, page) in pages.iter_mut().enumerate() {
            let text = self.config.footer(i + 1, total);
            page.footer = Some(TextLine {
                x: centered_x(&text, FOOTER_SIZE),
                y: PAGE_HEIGHT - FOOTER_OFFSET,
                size: FOOTER_SIZE,
                bold: false,
                record: None,
                text,
            });
        }
    }

    fn header(&self, layout: &mut Layout, data: &ReportData, generated_at: DateTime<Utc>) {
        layout.centered(LineSpec {
            text: data.kind.title().to_string(),
            size: TITLE_SIZE,
            bold: true,
            indent: 0.0,
        });
        layout.centered(LineSpec {
            text: self.config.organization.clone(),
            size: SUBTITLE_SIZE,
            bold: false,
            indent: 0.0,
        });

        let mut meta = Block::new(None).gap_after(HEADER_GAP).line(LineSpec {
            indent: 0.0,
            ..LineSpec::body(format!(
                "Gerado em: {}",
                generated_at.format("%d/%m/%Y %H:%M")
            ))
        });
        if let Some(summary) = &data.filter_summary {
            meta = meta.line(LineSpec {
                indent: 0.0,
                ..LineSpec::body(summary.clone())
            });
        }
        meta = meta.line(LineSpec {
            indent: 0.0,
            ..LineSpec::body(format!(
                "Total de registros: {}",
                data.rows.record_count()
            ))
        });

        for spec in &meta.lines {
            layout.emit(spec, MARGIN_LEFT, None);
        }
        layout.gap(meta.gap_after);
    }
}

fn student_block(i: usize, row: &StudentRow) -> Block {
    Block::new(Some(row.id))
        .line(LineSpec::heading(format!("{}. {}", i + 1, row.name)))
        .line(LineSpec::body(format!(
            "ID: {} | CPF: {} | Matrícula: {}",
            row.id, row.cpf, row.matricula
        )))
        .line(LineSpec::body(format!("E-mail: {}", row.email)))
        .line(LineSpec::body(format!(
            "Status: {} | Turma: {}",
            row.status.label(),
            row.class_name.as_deref().unwrap_or("Sem turma")
        )))
}

fn class_block(i: usize, row: &ClassRow) -> Block {
    Block::new(Some(row.id))
        .line(LineSpec::heading(format!("{}. {}", i + 1, row.name)))
        .line(LineSpec::body(format!(
            "ID: {} | Curso: {} | Turno: {} | Status: {}",
            row.id,
            row.course_name,
            row.shift.label(),
            row.status.label()
        )))
        .line(LineSpec::body(format!(
            "Capacidade: {} | Matriculados: {}",
            row.capacity, row.enrolled
        )))
        .line(LineSpec::body(format!(
            "Período: {} a {}",
            row.start_date.format("%d/%m/%Y"),
            row.end_date.format("%d/%m/%Y")
        )))
        .line(LineSpec::body(format!(
            "Instrutores: {}",
            join_or(&row.instructors, "Nenhum")
        )))
}

fn course_block(i: usize, row: &CourseRow) -> Block {
    Block::new(Some(row.id))
        .line(LineSpec::heading(format!("{}. {}", i + 1, row.name)))
        .line(LineSpec::body(format!(
            "ID: {} | Carga Horária: {}h | Nível: {} | Status: {}",
            row.id,
            row.workload_hours,
            row.level,
            row.status.label()
        )))
        .line(LineSpec::body(format!(
            "Turmas: {}",
            join_or(&row.class_names, "Nenhuma")
        )))
}

fn instructor_block(i: usize, row: &InstructorRow) -> Block {
    Block::new(Some(row.id))
        .line(LineSpec::heading(format!("{}. {}", i + 1, row.name)))
        .line(LineSpec::body(format!(
            "ID: {} | CPF: {} | E-mail: {}",
            row.id, row.cpf, row.email
        )))
        .line(LineSpec::body(format!(
            "Especialidade: {} | Status: {}",
            row.specialty,
            row.status.label()
        )))
        .line(LineSpec::body(format!(
            "Turmas: {}",
            join_or(&row.class_names, "Nenhuma")
        )))
}

fn entry_line(entry: &AttendanceEntry) -> LineSpec {
    let mut text = format!(
        "{} - {}",
        entry.date.format("%d/%m/%Y"),
        entry.status.label()
    );
    if let Some(notes) = &entry.notes {
        text.push_str(" - ");
        text.push_str(notes);
    }
    LineSpec {
        indent: BODY_INDENT * 2.0,
        ..LineSpec::body(text)
    }
}

/// Per student: the heading and stats share a block with the first event,
/// then one single-line block per remaining event. The threshold is checked
/// before each block.
fn attendance_blocks(layout: &mut Layout, groups: &[AttendanceStat]) {
    for (gi, group) in groups.iter().enumerate() {
        let mut heading = Block::new(None)
            .line(LineSpec::heading(format!(
                "{}. {} (Matrícula: {})",
                gi + 1,
                group.student_name,
                group.matricula
            )))
            .line(LineSpec::body(format!(
                "Total: {} | Presenças: {} | Faltas: {} | Justificadas: {} | Frequência: {:.1}%",
                group.total, group.present, group.absent, group.justified, group.percentage
            )));

        let mut entries = group.entries.iter().peekable();
        if let Some(first) = entries.next() {
            heading = heading.record_entry(first.id, entry_line(first));
        }
        if entries.peek().is_some() {
            heading = heading.gap_after(0.0);
        }
        layout.place(heading);

        while let Some(entry) = entries.next() {
            let last = entries.peek().is_none();
            let block = Block::new(Some(entry.id))
                .gap_after(if last { BLOCK_GAP } else { 0.0 })
                .line(entry_line(entry));
            layout.place(block);
        }
    }
}
