//! Tracking log entries.
//!
//! Every mutation of a transport writes one tracking entry describing what
//! happened. The texts are shown verbatim to dispatch and crews, so they are
//! built here in one place.

use crate::clinical::VitalSigns;
use crate::codes::define_code_enum;
use crate::transport::TransportStatus;

/// Placeholder for an unassigned crew member.
const UNASSIGNED: &str = "No asignado";

/// Placeholder for an unassigned aircraft.
const UNASSIGNED_AIRCRAFT: &str = "No asignada";

define_code_enum! {
    /// Category of a tracking entry.
    TrackingKind {
        StatusChange = "CAMBIO_ESTADO",
        TechnicalEvent = "EVENTO_TECNICO",
        MedicalNote = "OBSERVACION_MEDICA",
        Procedure = "PROCEDIMIENTO",
        Medication = "MEDICACION",
        VitalSigns = "SIGNOS_VITALES",
        PatientCondition = "ESTADO_PACIENTE",
    }
}

/// A tracking entry ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingNote {
    pub kind: TrackingKind,
    pub description: String,
    pub observations: Option<String>,
}

impl TrackingNote {
    pub fn new(kind: TrackingKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            observations: None,
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }
}

/// Status moved from `previous` to `next`.
pub fn status_change(previous: TransportStatus, next: TransportStatus) -> TrackingNote {
    TrackingNote::new(
        TrackingKind::StatusChange,
        format!("Estado cambiado a: {next}"),
    )
    .with_observations(format!("Estado anterior: {previous}"))
}

/// Crew and aircraft assignment. Absent members are reported as unassigned.
pub fn team_assigned(
    doctor: Option<&str>,
    nurse: Option<&str>,
    pilot: Option<&str>,
    aircraft: Option<&str>,
) -> TrackingNote {
    TrackingNote::new(TrackingKind::TechnicalEvent, "Equipo médico asignado").with_observations(
        format!(
            "Médico: {}, Enfermero: {}, Piloto: {}, Aeronave: {}",
            doctor.unwrap_or(UNASSIGNED),
            nurse.unwrap_or(UNASSIGNED),
            pilot.unwrap_or(UNASSIGNED),
            aircraft.unwrap_or(UNASSIGNED_AIRCRAFT),
        ),
    )
}

/// Request data edited by a coordinator.
pub fn transport_edited() -> TrackingNote {
    TrackingNote::new(TrackingKind::MedicalNote, "Traslado editado")
        .with_observations("Datos del traslado actualizados por coordinador")
}

pub fn epicrisis_updated() -> TrackingNote {
    TrackingNote::new(TrackingKind::MedicalNote, "Epicrisis actualizada")
        .with_observations("Resumen final del traslado completado")
}

pub fn procedure_recorded(kind: &str, description: &str) -> TrackingNote {
    TrackingNote::new(
        TrackingKind::Procedure,
        format!("Procedimiento creado: {kind}"),
    )
    .with_observations(description)
}

pub fn medication_recorded(drug: &str, dose: &str, route: &str) -> TrackingNote {
    TrackingNote::new(
        TrackingKind::Medication,
        format!("Medicación administrada: {drug}"),
    )
    .with_observations(format!("Dosis: {dose}, Vía: {route}"))
}

pub fn vital_signs_recorded(reading: &VitalSigns) -> TrackingNote {
    TrackingNote::new(TrackingKind::VitalSigns, "Control de signos vitales")
        .with_observations(reading.summary())
}
