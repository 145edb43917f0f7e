//! Lookup tools exposed to the Realtime API
//!
//! Fetching hospital data on demand keeps the system prompt small; the
//! model calls these instead of carrying the dataset in its instructions.

mod dispatch;

use std::sync::OnceLock;

use serde_json::{Value, json};

pub use dispatch::{ToolReply, dispatch};

/// A tool definition advertised to the model at session configure time
#[derive(Debug)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON-schema object for the tool's arguments
    pub parameters: Value,
    /// Required string-typed argument names, validated at dispatch time
    pub required: &'static [&'static str],
}

impl ToolDef {
    /// Render as a Realtime API `session.update` tool entry
    #[must_use]
    pub fn to_schema(&self) -> Value {
        json!({
            "type": "function",
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters,
        })
    }
}

/// No-argument JSON schema
fn no_args() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

/// The fixed tool catalog. Read-only after first use.
pub fn catalog() -> &'static [ToolDef] {
    static CATALOG: OnceLock<Vec<ToolDef>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            ToolDef {
                name: "get_hospital_info",
                description: "Get hospital contact details including address, phone numbers, \
                              email, website, and operating hours. Use this when caller asks \
                              about hospital location, contact, or timings.",
                parameters: no_args(),
                required: &[],
            },
            ToolDef {
                name: "get_facilities",
                description: "Get list of hospital facilities and services like ICU, lab, \
                              pharmacy, ambulance, operation theatres. Use when caller asks \
                              what services are available.",
                parameters: no_args(),
                required: &[],
            },
            ToolDef {
                name: "get_all_doctors",
                description: "Get a summary list of all doctors with their departments. Use \
                              when caller asks to know available doctors or wants an overview.",
                parameters: no_args(),
                required: &[],
            },
            ToolDef {
                name: "get_doctor_details",
                description: "Get detailed information about a specific doctor including \
                              specialization, department, and timing. Use when caller asks \
                              about a specific doctor by name.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "doctor_name": {
                            "type": "string",
                            "description": "Name or partial name of the doctor to look up"
                        }
                    },
                    "required": ["doctor_name"]
                }),
                required: &["doctor_name"],
            },
            ToolDef {
                name: "get_department_info",
                description: "Get information about a specific department including doctors \
                              and conditions treated. Use when caller asks about a specialty \
                              like orthopedics, gynecology, etc.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "department": {
                            "type": "string",
                            "description": "Department name like 'orthopedics', 'ent', 'eye', \
                                            'gynecology', 'pediatrics', 'urology', etc."
                        }
                    },
                    "required": ["department"]
                }),
                required: &["department"],
            },
            ToolDef {
                name: "get_specialties",
                description: "Get ALL hospital departments with what conditions each handles. \
                              Use this to intelligently recommend the best specialty for a \
                              patient's symptoms. YOU decide which department fits best based \
                              on their symptoms.",
                parameters: no_args(),
                required: &[],
            },
            ToolDef {
                name: "get_second_opinion_info",
                description: "Get details about the hospital's FREE online second opinion \
                              service at secondopinion.org. Use when caller asks about second \
                              opinion, wants to verify if surgery is needed, mentions being \
                              confused about diagnosis, or wants expert review of their case \
                              before deciding on treatment.",
                parameters: no_args(),
                required: &[],
            },
        ]
    })
}

/// Find a tool definition by name
#[must_use]
pub fn find(name: &str) -> Option<&'static ToolDef> {
    catalog().iter().find(|t| t.name == name)
}

/// Tool schemas for the `session.update` payload
#[must_use]
pub fn schemas() -> Vec<Value> {
    catalog().iter().map(ToolDef::to_schema).collect()
}
