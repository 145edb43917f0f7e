//! Tool catalog and dispatch integration tests

use serde_json::json;

use frontdesk::tools::{ToolReply, catalog, dispatch, schemas};

#[test]
fn catalog_matches_advertised_schemas() {
    let defs = catalog();
    let advertised = schemas();
    assert_eq!(defs.len(), advertised.len());

    for (def, schema) in defs.iter().zip(&advertised) {
        assert_eq!(schema["name"], def.name);
        assert_eq!(schema["type"], "function");
    }
}

#[test]
fn doctor_lookup_tolerates_transcription_noise() {
    // Case-insensitive partial match, as speech transcripts arrive
    for query in ["sharma", "SHARMA", "Anil Sharma", "dr. anil sharma"] {
        let reply = dispatch("get_doctor_details", &json!({ "doctor_name": query }));
        match reply {
            ToolReply::Ok(text) => assert!(text.contains("Dr. Anil Sharma"), "query {query}"),
            other => panic!("query {query}: expected Ok, got {other:?}"),
        }
    }
}

#[test]
fn department_lookup_is_fuzzy() {
    let reply = dispatch("get_department_info", &json!({ "department": "ortho" }));
    match reply {
        ToolReply::Ok(text) => {
            assert!(text.contains("Orthopedics"));
            assert!(text.contains("joint pain"));
            assert!(text.contains("Dr. Anil Sharma"));
        }
        other => panic!("expected Ok, got {other:?}"),
    }
}

#[test]
fn misses_are_replies_never_panics() {
    assert!(matches!(
        dispatch("get_doctor_details", &json!({ "doctor_name": "strange" })),
        ToolReply::NotFound(_)
    ));
    assert!(matches!(
        dispatch("get_department_info", &json!({ "department": "neurosurgery" })),
        ToolReply::NotFound(_)
    ));
    assert!(matches!(
        dispatch("no_such_tool", &json!({})),
        ToolReply::UnknownTool(_)
    ));
}

#[test]
fn argument_validation_fails_closed() {
    assert!(matches!(
        dispatch("get_doctor_details", &json!({})),
        ToolReply::InvalidArguments(_)
    ));
    assert!(matches!(
        dispatch("get_department_info", &json!({ "department": ["ent"] })),
        ToolReply::InvalidArguments(_)
    ));
    // Replies always carry relayable text
    let text = dispatch("get_doctor_details", &json!({})).into_output();
    assert!(text.contains("doctor_name"));
}

#[test]
fn zero_arg_tools_return_hospital_data() {
    let info = dispatch("get_hospital_info", &json!({})).into_output();
    assert!(info.contains("Delhi Hospital"));
    assert!(info.contains("Kharkhoda"));

    let facilities = dispatch("get_facilities", &json!({})).into_output();
    assert!(facilities.contains("ICU"));
    assert!(facilities.contains("Ambulance"));

    let doctors = dispatch("get_all_doctors", &json!({})).into_output();
    assert!(doctors.contains("Dr. Ravi Shankar"));

    let specialties = dispatch("get_specialties", &json!({})).into_output();
    assert!(specialties.contains("EMERGENCIES"));
    assert!(specialties.contains("Urology"));

    let second_opinion = dispatch("get_second_opinion_info", &json!({})).into_output();
    assert!(second_opinion.contains("secondopinion.org"));
    assert!(second_opinion.contains("FREE"));
}
