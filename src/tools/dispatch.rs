//! Tool dispatcher
//!
//! Every outcome is a structured reply relayed back to the model as the
//! function's return value, so the AI can respond conversationally.
//! Nothing here propagates an error to the caller.

use serde_json::Value;

use crate::directory::directory;

/// Outcome of a tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolReply {
    /// Lookup succeeded; payload goes back to the model verbatim
    Ok(String),
    /// Known tool, but the lookup found nothing
    NotFound(String),
    /// Arguments missing or ill-typed for the named tool
    InvalidArguments(String),
    /// Name not present in the catalog
    UnknownTool(String),
}

impl ToolReply {
    /// Whether the lookup produced a hit
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The text relayed to the transport as the function output
    #[must_use]
    pub fn into_output(self) -> String {
        match self {
            Self::Ok(text) | Self::NotFound(text) | Self::InvalidArguments(text) => text,
            Self::UnknownTool(name) => format!("Unknown tool: {name}"),
        }
    }
}

/// Dispatch a tool call against the hospital directory.
///
/// Arguments arrive as the JSON object the model produced; string fields
/// listed in the tool's `required` set are validated before the lookup
/// runs (fail closed on mismatch).
#[must_use]
pub fn dispatch(name: &str, args: &Value) -> ToolReply {
    let Some(tool) = super::find(name) else {
        tracing::warn!(tool = name, "unknown tool requested");
        return ToolReply::UnknownTool(name.to_string());
    };

    for &param in tool.required {
        match args.get(param) {
            Some(v) if v.is_string() => {}
            Some(_) => {
                return ToolReply::InvalidArguments(format!(
                    "Argument '{param}' for {name} must be a string."
                ));
            }
            None => {
                return ToolReply::InvalidArguments(format!(
                    "Missing required argument '{param}' for {name}."
                ));
            }
        }
    }

    let dir = directory();
    match name {
        "get_hospital_info" => ToolReply::Ok(dir.hospital_info()),
        "get_facilities" => ToolReply::Ok(dir.facilities()),
        "get_all_doctors" => ToolReply::Ok(dir.doctors_summary()),
        "get_specialties" => ToolReply::Ok(dir.specialties_for_routing()),
        "get_second_opinion_info" => ToolReply::Ok(dir.second_opinion_info()),
        "get_doctor_details" => {
            let query = args["doctor_name"].as_str().unwrap_or_default();
            dir.find_doctor(query).map_or_else(
                || {
                    ToolReply::NotFound(
                        "Doctor not found. Please check the name or ask reception.".to_string(),
                    )
                },
                |(dept, doc)| ToolReply::Ok(dir.doctor_details(dept, doc)),
            )
        }
        "get_department_info" => {
            let query = args["department"].as_str().unwrap_or_default();
            dir.find_department(query).map_or_else(
                || ToolReply::NotFound("Department not found.".to_string()),
                |dept| ToolReply::Ok(dir.department_info(dept)),
            )
        }
        _ => ToolReply::UnknownTool(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn known_doctor_returns_full_record() {
        let reply = dispatch("get_doctor_details", &json!({"doctor_name": "sharma"}));
        match reply {
            ToolReply::Ok(text) => {
                assert!(text.contains("Dr. Anil Sharma"));
                assert!(text.contains("Orthopedics"));
            }
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_doctor_is_not_found() {
        let reply = dispatch("get_doctor_details", &json!({"doctor_name": "nobody"}));
        assert!(matches!(reply, ToolReply::NotFound(_)));
    }

    #[test]
    fn missing_argument_fails_closed() {
        let reply = dispatch("get_doctor_details", &json!({}));
        assert!(matches!(reply, ToolReply::InvalidArguments(_)));
    }

    #[test]
    fn non_string_argument_fails_closed() {
        let reply = dispatch("get_doctor_details", &json!({"doctor_name": 42}));
        assert!(matches!(reply, ToolReply::InvalidArguments(_)));
    }

    #[test]
    fn unknown_tool_is_structured() {
        let reply = dispatch("book_appointment", &json!({}));
        assert_eq!(reply, ToolReply::UnknownTool("book_appointment".to_string()));
        assert_eq!(
            reply.into_output(),
            "Unknown tool: book_appointment".to_string()
        );
    }

    #[test]
    fn no_arg_tools_ignore_extra_args() {
        let reply = dispatch("get_facilities", &json!({"stray": true}));
        assert!(reply.is_ok());
    }
}
