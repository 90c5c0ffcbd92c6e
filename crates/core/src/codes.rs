//! Enumerated codes stored as `TEXT` columns.
//!
//! Every code enum serializes to the same upper-case string that the
//! database `CHECK` constraints accept, so rows can carry plain `String`s and
//! the API layer parses them at the boundary.

use crate::error::CoreError;

macro_rules! define_code_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored string code.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            /// Parse a stored code. Matching is exact (upper-case).
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value).ok_or_else(|| {
                    $crate::error::CoreError::Validation(format!(
                        "Invalid {}: '{value}'",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

pub(crate) use define_code_enum;

define_code_enum! {
    /// Patient sex as recorded on the request form.
    Sex {
        Male = "MASCULINO",
        Female = "FEMENINO",
        Other = "OTRO",
    }
}

define_code_enum! {
    /// Triage colour code assigned by the requesting professional.
    TriageCode {
        /// Urgent.
        Red = "ROJO",
        /// Scheduled.
        Yellow = "AMARILLO",
        /// Not urgent.
        Green = "VERDE",
    }
}

define_code_enum! {
    /// Clinical complexity of the transport.
    Complexity {
        Low = "BAJA",
        Medium = "MEDIANA",
        High = "ALTA",
    }
}

define_code_enum! {
    PatientCategory {
        Neonatal = "NEONATAL",
        Pediatric = "PEDIATRICO",
        Adult = "ADULTO",
    }
}

define_code_enum! {
    /// Dispatch priority. New requests default to [`Priority::Normal`].
    Priority {
        Low = "BAJA",
        Normal = "NORMAL",
        High = "ALTA",
        Urgent = "URGENTE",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

define_code_enum! {
    /// Administration route for a medication entry.
    MedicationRoute {
        Oral = "ORAL",
        Intravenous = "INTRAVENOSA",
        Intramuscular = "INTRAMUSCULAR",
        Subcutaneous = "SUBCUTANEA",
        Inhaled = "INHALATORIA",
        Topical = "TOPICA",
        Other = "OTRA",
    }
}

define_code_enum! {
    HospitalKind {
        Public = "PUBLICO",
        Private = "PRIVADO",
    }
}

define_code_enum! {
    /// Professional function of a staff member (independent of their role).
    StaffFunction {
        Doctor = "MEDICO",
        Nurse = "ENFERMERO",
        Paramedic = "PARAMEDICO",
        Pilot = "PILOTO",
        Administrative = "ADMINISTRATIVO",
        Other = "OTRO",
    }
}

/// Parse an optional code, treating `None` as absent and anything invalid as
/// a validation error.
pub fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, CoreError>
where
    T: std::str::FromStr<Err = CoreError>,
{
    value.map(str::parse).transpose()
}
