//! Static hospital directory
//!
//! Read-only tables the lookup tools query: hospital contact info,
//! departments with their doctors, facilities, and the free
//! second-opinion service. Data lives in `data.rs`; this module owns the
//! types and the lookup/rendering logic.

mod data;

use std::fmt::Write as _;
use std::sync::OnceLock;

pub use data::directory_data;

/// Hospital contact and operating information
#[derive(Debug)]
pub struct HospitalInfo {
    pub name: &'static str,
    pub kind: &'static str,
    pub address: &'static str,
    pub landmark: &'static str,
    pub primary_phone: &'static str,
    pub other_phones: &'static [&'static str],
    pub email: &'static str,
    pub website: &'static str,
    pub emergency_hours: &'static str,
    pub opd_hours: &'static str,
    pub accreditation: &'static [&'static str],
    pub facilities: &'static [&'static str],
}

/// A doctor record within a department
#[derive(Debug)]
pub struct Doctor {
    pub name: &'static str,
    pub designation: &'static str,
    pub specialization: &'static str,
    pub timings: &'static str,
    pub consultation_fee: &'static str,
}

/// A department with the conditions it handles and its doctors
///
/// Departments with an empty `handles` list are internal (e.g.
/// anaesthesia) and excluded from caller-facing summaries.
#[derive(Debug)]
pub struct Department {
    pub key: &'static str,
    pub name: &'static str,
    pub handles: &'static [&'static str],
    pub doctors: &'static [Doctor],
}

impl Department {
    /// Whether callers can be routed to this department directly
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        !self.handles.is_empty()
    }
}

/// The free second-opinion service offered by the hospital
#[derive(Debug)]
pub struct SecondOpinionService {
    pub name: &'static str,
    pub website: &'static str,
    pub cost: &'static str,
    pub description: &'static str,
    pub how_it_works: &'static [&'static str],
    pub benefits: &'static [&'static str],
    pub who_should_use: &'static [&'static str],
    pub documents: &'static [&'static str],
    pub documents_note: &'static str,
    pub phone: &'static str,
}

/// The complete static dataset
#[derive(Debug)]
pub struct Directory {
    pub hospital: HospitalInfo,
    pub departments: &'static [Department],
    pub emergency_symptoms: &'static [&'static str],
    pub second_opinion: SecondOpinionService,
}

/// Global directory instance
pub fn directory() -> &'static Directory {
    static DIRECTORY: OnceLock<Directory> = OnceLock::new();
    DIRECTORY.get_or_init(directory_data)
}

impl Directory {
    /// Find a doctor by (partial, case-insensitive) name.
    ///
    /// Input comes from speech transcription, so matching is tolerant:
    /// the query may be a substring of the name ("sharma"), or a set of
    /// tokens that all appear in it ("anil sharma").
    #[must_use]
    pub fn find_doctor(&self, query: &str) -> Option<(&Department, &Doctor)> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }

        for dept in self.departments {
            for doc in dept.doctors {
                let name = doc.name.to_lowercase();
                if name.contains(&q) || q.split_whitespace().all(|tok| name.contains(tok)) {
                    return Some((dept, doc));
                }
            }
        }
        None
    }

    /// Find a department by (partial, case-insensitive) key or name
    #[must_use]
    pub fn find_department(&self, query: &str) -> Option<&Department> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }

        self.departments.iter().find(|dept| {
            let name = dept.name.to_lowercase();
            dept.key.contains(&q)
                || name.contains(&q)
                || q.split_whitespace().any(|tok| tok == dept.key)
        })
    }

    /// One line per bookable doctor, for the overview tool
    #[must_use]
    pub fn doctors_summary(&self) -> String {
        let mut out = String::new();
        for dept in self.departments.iter().filter(|d| d.is_bookable()) {
            for doc in dept.doctors {
                let _ = writeln!(out, "- {} - {}", doc.name, dept.name);
            }
        }
        out
    }

    /// Full record for one doctor
    #[must_use]
    pub fn doctor_details(&self, dept: &Department, doc: &Doctor) -> String {
        format!(
            "Doctor: {}\nDepartment: {}\nDesignation: {}\nSpecialization: {}\nTimings: {}\nFee: {}",
            doc.name, dept.name, doc.designation, doc.specialization, doc.timings,
            doc.consultation_fee,
        )
    }

    /// Department record: conditions treated plus its doctors
    #[must_use]
    pub fn department_info(&self, dept: &Department) -> String {
        let doctors = dept
            .doctors
            .iter()
            .map(|d| format!("  - {} - {}", d.name, d.designation))
            .collect::<Vec<_>>()
            .join("\n");
        let conditions = if dept.handles.is_empty() {
            "N/A".to_string()
        } else {
            dept.handles.join(", ")
        };
        format!(
            "Department: {}\nConditions Treated: {conditions}\nDoctors:\n{doctors}",
            dept.name,
        )
    }

    /// Hospital contact and timing info
    #[must_use]
    pub fn hospital_info(&self) -> String {
        let h = &self.hospital;
        format!(
            "Hospital: {}\nType: {}\nAddress: {}\nLandmark: {}\nPhone: {}\nAlt Phones: {}\n\
             Email: {}\nWebsite: {}\nEmergency: {}\nOPD: {}\nAccreditation: {}",
            h.name,
            h.kind,
            h.address,
            h.landmark,
            h.primary_phone,
            h.other_phones.join(", "),
            h.email,
            h.website,
            h.emergency_hours,
            h.opd_hours,
            h.accreditation.join(", "),
        )
    }

    /// Facilities list
    #[must_use]
    pub fn facilities(&self) -> String {
        let mut out = String::from("Hospital Facilities:\n");
        for f in self.hospital.facilities {
            let _ = writeln!(out, "- {f}");
        }
        out
    }

    /// All bookable departments with what they handle, for symptom routing.
    ///
    /// The model picks the department itself; this payload just lays out
    /// the options, emergencies first.
    #[must_use]
    pub fn specialties_for_routing(&self) -> String {
        let emergencies = self
            .emergency_symptoms
            .iter()
            .take(8)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = format!(
            "HOSPITAL SPECIALTIES - Use this to recommend the right doctor\n\n\
             EMERGENCIES (send to ER immediately): {emergencies}...\nER Phone: {}\n\nDEPARTMENTS:\n",
            self.hospital.primary_phone,
        );

        for dept in self.departments.iter().filter(|d| d.is_bookable()) {
            let doctor = dept.doctors.first().map_or("Specialist", |d| d.name);
            let _ = writeln!(
                out,
                "\n- {}\n  Handles: {}\n  Doctor: {doctor}",
                dept.name,
                dept.handles.join(", "),
            );
        }

        let _ = write!(
            out,
            "\nSECOND OPINION SERVICE ({}):\nIf patient mentions surgery/operation was advised \
             by another doctor, suggest our FREE Second Opinion service. They can upload reports \
             online for specialist review.\n\nReception for appointments: {}",
            self.second_opinion.website, self.hospital.primary_phone,
        );
        out
    }

    /// Second-opinion service description
    #[must_use]
    pub fn second_opinion_info(&self) -> String {
        let s = &self.second_opinion;
        let how = s.how_it_works.join("\n");
        let benefits = s
            .benefits
            .iter()
            .map(|b| format!("- {b}"))
            .collect::<Vec<_>>()
            .join("\n");
        let who = s
            .who_should_use
            .iter()
            .map(|w| format!("- {w}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\nWebsite: {}\nCost: {}\n\n{}\n\nHOW IT WORKS:\n{how}\n\nBENEFITS:\n{benefits}\n\n\
             WHO SHOULD USE:\n{who}\n\nDOCUMENTS (optional, but recommended):\n{}\nNote: {}\n\n\
             CONTACT:\nWhatsApp/Phone: {}\nWebsite: {}",
            s.name,
            s.website,
            s.cost,
            s.description,
            s.documents.join(", "),
            s.documents_note,
            s.phone,
            s.website,
        )
    }
}
