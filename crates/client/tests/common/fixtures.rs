//! Backend payloads shared by the integration tests.

use hospitex_client::ResourceRecord;
use serde_json::{Value, json};

/// Three staff members as the backend lists them.
pub fn staff_list() -> Value {
    json!([
        {"id": 1, "name": "Meredith Grey", "email": "mgrey@seattle.org", "role": "doctor", "department": "surgery", "status": "active"},
        {"id": 2, "name": "Olivia Harper", "email": "oharper@seattle.org", "role": "nurse", "department": "surgery", "status": "active"},
        {"id": 3, "name": "Richard Webber", "email": "rwebber@seattle.org", "role": "admin", "department": "general", "status": "inactive"}
    ])
}

/// Two patients.
pub fn patient_list() -> Value {
    json!([
        {"id": "p-1", "name": "Denny Duquette", "ward": "cardio"},
        {"id": "p-2", "name": "Jane Doe", "ward": "trauma"}
    ])
}

/// A complete vitals reading for patient `p-1`.
pub fn vitals_reading() -> ResourceRecord {
    ResourceRecord::new()
        .with("patient_id", "p-1")
        .with("temperature", "37.2")
        .with("blood_pressure", "120/80")
        .with("pulse", "72")
        .with("resp_rate", "16")
}

/// Login response for a doctor.
pub fn login_response() -> Value {
    json!({
        "token": "tok-meredith",
        "role": "doctor",
        "staff_id": 1,
        "staff_name": "Meredith Grey"
    })
}
