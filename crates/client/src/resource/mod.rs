//! Typed CRUD access to the backend collections.
//!
//! One [`ResourceClient`] serves every collection; the [`ResourceKind`] it is
//! built with supplies the path, the required fields for creation, and which
//! supplementary endpoints exist.
//!
//! | Kind | Collection | Extra endpoints |
//! |------|------------|-----------------|
//! | Staff | `/staffs` | |
//! | Patient | `/patients` | `/patients/my-patients`, `/patients/total` |
//! | MedicalRecord | `/medic-records` | `/medic-records/totalMedicalRecords` |
//! | Vital | `/vitals` | `/vitals/patient/:id` |

mod client;
pub mod normalize;
mod record;
pub mod validate;

pub use client::{RecordSource, ResourceClient};
pub use record::ResourceRecord;

use std::fmt;
use std::str::FromStr;

/// Fields a vitals reading must carry before it is sent.
pub const VITAL_REQUIRED_FIELDS: [&str; 5] =
    ["patient_id", "temperature", "blood_pressure", "pulse", "resp_rate"];

/// The backend collections this client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Hospital staff members.
    Staff,
    /// Patients.
    Patient,
    /// Medical records.
    MedicalRecord,
    /// Vitals readings.
    Vital,
}

impl ResourceKind {
    /// Every kind, in display order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Staff,
        ResourceKind::Patient,
        ResourceKind::MedicalRecord,
        ResourceKind::Vital,
    ];

    /// The collection path segment, e.g. `medic-records`.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Staff => "staffs",
            ResourceKind::Patient => "patients",
            ResourceKind::MedicalRecord => "medic-records",
            ResourceKind::Vital => "vitals",
        }
    }

    /// Fields that must be present and non-empty on create.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Vital => &VITAL_REQUIRED_FIELDS,
            _ => &[],
        }
    }

    /// Dedicated count endpoint and the response field holding the count.
    pub fn total_endpoint(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ResourceKind::Patient => Some(("patients/total", "totalPatient")),
            ResourceKind::MedicalRecord => {
                Some(("medic-records/totalMedicalRecords", "totalMedicRecord"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "staff" | "staffs" => Ok(ResourceKind::Staff),
            "patient" | "patients" => Ok(ResourceKind::Patient),
            "record" | "records" | "medic-records" | "medical-records" => {
                Ok(ResourceKind::MedicalRecord)
            }
            "vital" | "vitals" => Ok(ResourceKind::Vital),
            other => Err(format!("unknown resource '{}'", other)),
        }
    }
}
