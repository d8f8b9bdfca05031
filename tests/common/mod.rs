use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use escola::router::init_router;
use escola::state::AppState;
use escola_config::ReportConfig;
use escola_db::MemoryStore;
use escola_models::{
    ActivityStatus, Attendance, AttendanceStatus, Candidate, CandidateStatus, Class, ClassRef,
    ClassStatus, Course, CourseRef, Enrollment, Instructor, InstructorRef, Shift, Student,
    StudentRef, StudentStatus,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const ORGANIZATION: &str = "Escola Técnica Modelo";

pub fn test_config() -> ReportConfig {
    ReportConfig {
        organization: ORGANIZATION.to_string(),
        ..ReportConfig::default()
    }
}

pub fn setup_test_app(store: MemoryStore) -> axum::Router {
    init_router(AppState::new(Arc::new(store), test_config()))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).unwrap().to_str().unwrap()
    }
}

pub async fn get(app: axum::Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        body: body.to_vec(),
    }
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn course(id: i64, name: &str) -> Course {
    Course {
        id,
        name: name.to_string(),
        workload_hours: 1200,
        level: "Técnico".to_string(),
        status: ActivityStatus::Ativo,
        classes: vec![],
    }
}

pub fn instructor(id: i64, name: &str, specialty: &str) -> Instructor {
    Instructor {
        id,
        name: name.to_string(),
        cpf: format!("000.000.000-{:02}", id),
        email: format!("instrutor{}@escola.test", id),
        specialty: specialty.to_string(),
        status: ActivityStatus::Ativo,
        classes: vec![],
    }
}

pub fn class(
    id: i64,
    name: &str,
    course: &Course,
    status: ClassStatus,
    instructors: &[&Instructor],
) -> Class {
    Class {
        id,
        name: name.to_string(),
        shift: Shift::Noite,
        status,
        course: CourseRef {
            id: course.id,
            name: course.name.clone(),
        },
        capacity: 30,
        start_date: date(2026, 2, 2),
        end_date: date(2026, 12, 18),
        instructors: instructors
            .iter()
            .map(|i| InstructorRef {
                id: i.id,
                name: i.name.clone(),
            })
            .collect(),
        enrollment_ids: vec![],
    }
}

pub fn student(id: i64, name: &str, status: StudentStatus, class: Option<&Class>) -> Student {
    Student {
        id,
        name: name.to_string(),
        cpf: format!("111.222.333-{:02}", id % 100),
        email: format!("aluno{}@escola.test", id),
        matricula: format!("2026{:04}", id),
        status,
        class: class.map(|c| ClassRef {
            id: c.id,
            name: c.name.clone(),
        }),
        created_at: at(2026, 1, 15),
    }
}

pub fn enrollment(id: i64, student: &Student, class: &Class, created_at: DateTime<Utc>) -> Enrollment {
    Enrollment {
        id,
        student_id: student.id,
        class_id: class.id,
        created_at,
    }
}

pub fn attendance(
    id: i64,
    student: &Student,
    class: &Class,
    day: NaiveDate,
    status: AttendanceStatus,
) -> Attendance {
    Attendance {
        id,
        student: StudentRef {
            id: student.id,
            name: student.name.clone(),
            matricula: student.matricula.clone(),
        },
        class: ClassRef {
            id: class.id,
            name: class.name.clone(),
        },
        date: day,
        status,
        notes: None,
    }
}

pub fn candidate(id: i64, course: &Course, status: CandidateStatus) -> Candidate {
    Candidate {
        id,
        name: format!("Candidato {}", id),
        cpf: format!("999.888.777-{:02}", id),
        email: format!("candidato{}@escola.test", id),
        phone: None,
        status,
        course: CourseRef {
            id: course.id,
            name: course.name.clone(),
        },
        created_at: at(2026, 1, 10),
    }
}

/// Two courses, four classes (7 and 8 in Informática, 9 and 10 in
/// Eletrotécnica), five students with enrollments made a day ago, and
/// attendance for classes 7 and 9. Class 10 has no students or attendance.
pub fn school_store() -> MemoryStore {
    let eletro = course(1, "Eletrotécnica");
    let info = course(2, "Informática");

    let carlos = instructor(1, "Carlos Mendes", "Redes");
    let beatriz = instructor(2, "Beatriz Lima", "Programação");

    let noite = class(7, "Turma Noite", &info, ClassStatus::Ativa, &[&carlos]);
    let tarde = class(8, "Turma Tarde", &info, ClassStatus::Planejada, &[&beatriz]);
    let manha = class(9, "Turma Manhã", &eletro, ClassStatus::Ativa, &[&carlos, &beatriz]);
    let sabado = class(10, "Turma Sábado", &eletro, ClassStatus::Planejada, &[]);

    let ana = student(100, "Ana Souza", StudentStatus::Ativo, Some(&noite));
    let bruno = student(101, "Bruno Alves", StudentStatus::Ativo, Some(&noite));
    let carla = student(102, "Carla Dias", StudentStatus::Inativo, Some(&tarde));
    let daniel = student(103, "Daniel Rocha", StudentStatus::Ativo, Some(&manha));
    let eduarda = student(104, "Eduarda Reis", StudentStatus::Concluido, Some(&manha));

    let recently = Utc::now() - Duration::days(1);
    let enrollments = vec![
        enrollment(1, &ana, &noite, recently),
        enrollment(2, &bruno, &noite, recently),
        enrollment(3, &carla, &tarde, recently),
        enrollment(4, &daniel, &manha, recently),
        enrollment(5, &eduarda, &manha, recently),
    ];

    let mut late = attendance(504, &ana, &noite, date(2026, 3, 3), AttendanceStatus::Justificado);
    late.notes = Some("Atestado médico".to_string());
    let records = vec![
        attendance(500, &bruno, &noite, date(2026, 3, 2), AttendanceStatus::Presente),
        attendance(501, &ana, &noite, date(2026, 3, 2), AttendanceStatus::Presente),
        attendance(502, &bruno, &noite, date(2026, 3, 3), AttendanceStatus::Ausente),
        attendance(503, &ana, &noite, date(2026, 3, 4), AttendanceStatus::Presente),
        late,
        attendance(505, &daniel, &manha, date(2026, 3, 4), AttendanceStatus::Presente),
    ];

    let candidates = vec![
        candidate(1, &info, CandidateStatus::Aprovado),
        candidate(2, &info, CandidateStatus::Pendente),
        candidate(3, &eletro, CandidateStatus::Pendente),
        candidate(4, &eletro, CandidateStatus::Reprovado),
    ];

    let mut store = MemoryStore::new();
    store.students = vec![ana, bruno, carla, daniel, eduarda];
    store.classes = vec![noite, tarde, manha, sabado];
    store.courses = vec![eletro, info];
    store.instructors = vec![carlos, beatriz];
    store.enrollments = enrollments;
    store.attendance = records;
    store.candidates = candidates;
    store
}
