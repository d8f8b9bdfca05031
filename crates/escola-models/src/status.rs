//! Status enums shared by entities, filters and reports.
//!
//! Stored status strings are not guaranteed to share one casing, so every enum
//! parses case-insensitively, ignores surrounding whitespace and folds the
//! Portuguese accents used in labels (`"Concluído"` parses as [`StudentStatus::Concluido`]).
//! Serialization always emits the canonical lowercase value.
//!
//! # Example
//!
//! ```ignore
//! use escola_models::status::StudentStatus;
//!
//! assert_eq!("ATIVO".parse::<StudentStatus>().unwrap(), StudentStatus::Ativo);
//! assert_eq!(StudentStatus::Concluido.label(), "Concluído");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusParseError {
    pub kind: &'static str,
    pub value: String,
}

impl std::error::Error for StatusParseError {}

impl fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {}", self.value, self.kind)
    }
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Defines a status enum with canonical values, display labels and normalising parsing.
macro_rules! define_status {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $value:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase", try_from = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical stored value.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            /// Human-readable label used in documents and workbooks.
            pub const fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match normalize(s).as_str() {
                    $($value => Ok($name::$variant),)+
                    _ => Err(StatusParseError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = StatusParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status! {
    /// Enrollment state of a student.
    StudentStatus, "student status" {
        Ativo => "ativo", "Ativo";
        Inativo => "inativo", "Inativo";
        Concluido => "concluido", "Concluído";
    }
}

define_status! {
    /// Lifecycle state of a turma.
    ClassStatus, "class status" {
        Ativa => "ativa", "Ativa";
        Planejada => "planejada", "Planejada";
        Encerrada => "encerrada", "Encerrada";
        Cancelada => "cancelada", "Cancelada";
    }
}

define_status! {
    Shift, "shift" {
        Manha => "manha", "Manhã";
        Tarde => "tarde", "Tarde";
        Noite => "noite", "Noite";
        Integral => "integral", "Integral";
    }
}

define_status! {
    /// Status of courses and instructors.
    ActivityStatus, "activity status" {
        Ativo => "ativo", "Ativo";
        Inativo => "inativo", "Inativo";
    }
}

define_status! {
    AttendanceStatus, "attendance status" {
        Presente => "presente", "Presente";
        Ausente => "ausente", "Ausente";
        Justificado => "justificado", "Justificado";
    }
}

define_status! {
    CandidateStatus, "candidate status" {
        Pendente => "pendente", "Pendente";
        Aprovado => "aprovado", "Aprovado";
        Reprovado => "reprovado", "Reprovado";
    }
}
