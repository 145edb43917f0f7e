//! Hospital data tables
//!
//! Edit this file to customize hospital information. Everything here is
//! served to callers through the lookup tools.

use super::{Department, Directory, Doctor, HospitalInfo, SecondOpinionService};

/// Build the static dataset
#[must_use]
pub fn directory_data() -> Directory {
    Directory {
        hospital: HospitalInfo {
            name: "Delhi Hospital",
            kind: "NABH Accredited Multispecialty Hospital",
            address: "Sampla Road, Near Prince Hotel, Kharkhoda, Sonipat, Haryana 131402",
            landmark: "Near Prince Hotel, on Sampla/Kharkhoda Main Road",
            primary_phone: "+91 99849 41611",
            other_phones: &["+91 97290 17553", "+91 98133 79592"],
            email: "delhihospitalkkd@gmail.com",
            website: "delhihospital.co.in",
            emergency_hours: "24x7",
            opd_hours: "Daytime hours - confirm with reception for specific doctor",
            accreditation: &["NABH Accredited", "CGHS Delhi/NCR Empanelled"],
            facilities: &[
                "24x7 Emergency & Trauma Services",
                "Fully Equipped ICU & Critical Care",
                "Advanced Pathology Lab",
                "Digital X-ray & Ultrasound",
                "Modern Operation Theatres",
                "In-house Pharmacy",
                "Private & Semi-private Rooms",
                "24x7 Ambulance Service",
            ],
        },
        departments: DEPARTMENTS,
        emergency_symptoms: &[
            "severe chest pain",
            "difficulty breathing",
            "breathlessness with sweating",
            "stroke symptoms",
            "sudden weakness one side",
            "slurred speech",
            "uncontrolled bleeding",
            "major injury",
            "loss of consciousness",
            "severe burns",
            "chemical in eye",
            "sudden vision loss",
            "pregnant with bleeding",
            "severe abdominal pain with vomiting",
            "high fever with confusion",
            "seizure",
            "poisoning",
        ],
        second_opinion: SecondOpinionService {
            name: "Free Second Opinion Service",
            website: "secondopinion.org",
            cost: "Completely FREE (online + offline appointment)",
            description: "Delhi Hospital offers a FREE Second Opinion Service. Start online by \
                          uploading your reports, and get a FREE in-person appointment at the \
                          hospital. Senior specialists review your case and guide you on whether \
                          surgery or treatment is actually needed. No charges at any step.",
            how_it_works: &[
                "1. Visit secondopinion.org or WhatsApp your reports to +91 99849 41611",
                "2. Upload your medical reports (X-ray, MRI, prescriptions, etc.)",
                "3. Senior doctors review your case within 24-48 hours",
                "4. You get a FREE offline appointment at Delhi Hospital",
                "5. Meet the specialist in-person for final consultation - absolutely free",
            ],
            benefits: &[
                "100% FREE - Online review + Offline appointment, no hidden costs",
                "Start from home - just upload reports online",
                "Expert review by senior specialists",
                "Get FREE in-person consultation at hospital",
                "Avoid unnecessary surgeries - get honest opinion",
                "No obligation - decide after meeting the doctor",
            ],
            who_should_use: &[
                "Patients advised for surgery who want confirmation",
                "People with joint, spine, or arthritis issues",
                "Cases with confusing or conflicting reports",
                "Anyone wanting expert opinion before starting treatment",
            ],
            documents: &[
                "X-ray",
                "MRI",
                "CT Scan",
                "Blood reports",
                "Previous prescriptions",
                "Surgery recommendation notes",
            ],
            documents_note: "Documents help but are optional - you can discuss even without reports",
            phone: "+91 99849 41611",
        },
    }
}

static DEPARTMENTS: &[Department] = &[
    Department {
        key: "orthopedics",
        name: "Orthopedics & Joint Replacement",
        handles: &[
            "fractures",
            "joint pain",
            "arthritis",
            "ligament injuries",
            "knee pain",
            "hip pain",
            "back pain",
            "spine issues",
            "sports injury",
        ],
        doctors: &[Doctor {
            name: "Dr. Anil Sharma",
            designation: "Joint Replacement & Orthopaedics Specialist",
            specialization: "Joint Replacement, Fractures, Arthritis, Sports Injuries",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "ent",
        name: "ENT (Ear, Nose, Throat)",
        handles: &[
            "ear pain",
            "ear discharge",
            "hearing loss",
            "sinus",
            "sore throat",
            "tonsils",
            "vertigo",
            "nose block",
        ],
        doctors: &[Doctor {
            name: "Dr. Ravi Shankar",
            designation: "ENT Specialist",
            specialization: "Ear, Nose, Throat disorders, Sinus, Vertigo",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "eye",
        name: "Ophthalmology (Eye)",
        handles: &[
            "eye redness",
            "eye pain",
            "blurred vision",
            "itching",
            "eye infection",
            "vision checkup",
        ],
        doctors: &[Doctor {
            name: "Dr. Divya Dhingra",
            designation: "Eye Specialist",
            specialization: "Eye Care, Vision Problems, Eye Infections",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "gynecology",
        name: "Gynaecology & Obstetrics",
        handles: &[
            "pregnancy",
            "periods problem",
            "menstrual issues",
            "white discharge",
            "PCOS",
            "fertility",
            "women health",
        ],
        doctors: &[Doctor {
            name: "Dr. Mamta Sharma",
            designation: "Gynaecologist",
            specialization: "Pregnancy Care, Menstrual Problems, PCOS, Women's Health",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "pediatrics",
        name: "Pediatrics (Child Care)",
        handles: &[
            "child fever",
            "baby health",
            "vaccination",
            "child cough",
            "growth issues",
            "newborn care",
        ],
        doctors: &[Doctor {
            name: "Dr. S Kumar",
            designation: "Paediatrician",
            specialization: "Child Health, Vaccinations, Growth & Development",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "urology",
        name: "Urology",
        handles: &[
            "kidney stone",
            "burning urination",
            "urine problem",
            "prostate",
            "blood in urine",
        ],
        doctors: &[Doctor {
            name: "Dr. Anil Aggarwal",
            designation: "Urologist",
            specialization: "Kidney Stones, Urinary Problems, Prostate Issues",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "plastic_surgery",
        name: "Plastic, Cosmetic & Burn Surgery",
        handles: &["burns", "scars", "cosmetic surgery", "reconstructive surgery"],
        doctors: &[Doctor {
            name: "Dr. Tapeshwar Shegal",
            designation: "Burn, Cosmetic & Plastic Surgeon",
            specialization: "Burns, Scar Revision, Cosmetic & Reconstructive Surgery",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "general_surgery",
        name: "General & Laparoscopic Surgery",
        handles: &["hernia", "gallbladder", "appendix", "piles", "fissure", "surgery"],
        doctors: &[Doctor {
            name: "Dr. Shushant Verma",
            designation: "General & Laparoscopic Surgeon",
            specialization: "Hernia, Gallbladder, Appendix, Piles, Laparoscopic Surgery",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "physiotherapy",
        name: "Physiotherapy & Rehabilitation",
        handles: &[
            "physio",
            "rehab",
            "exercise",
            "stiffness",
            "post surgery rehab",
            "stroke rehab",
        ],
        doctors: &[Doctor {
            name: "Dr. Vinay Chand",
            designation: "Physiotherapist",
            specialization: "Post-surgery Rehab, Joint Stiffness, Sports Rehab",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "radiology",
        name: "Radiology & Imaging",
        handles: &["xray", "ultrasound", "imaging", "scan"],
        doctors: &[Doctor {
            name: "Dr. Ruchi Sharma",
            designation: "Radiologist",
            specialization: "X-ray, Ultrasound, Diagnostic Imaging",
            timings: "Please confirm with reception",
            consultation_fee: "On prescription from doctor",
        }],
    },
    Department {
        key: "diet",
        name: "Diet & Nutrition",
        handles: &["diet", "weight", "nutrition", "diabetes diet", "heart diet"],
        doctors: &[Doctor {
            name: "Vanshika Dahiya",
            designation: "Dietician",
            specialization: "Weight Management, Diabetes Diet, Heart-healthy Diet",
            timings: "Please confirm with reception",
            consultation_fee: "Confirm with reception",
        }],
    },
    Department {
        key: "anaesthesia",
        name: "Anaesthesia (Internal)",
        // Not for direct booking
        handles: &[],
        doctors: &[Doctor {
            name: "Dr. Amit Sahu",
            designation: "Anaesthetist",
            specialization: "Surgery Support, ICU, Procedures",
            timings: "Part of surgical/ICU team",
            consultation_fee: "N/A - Internal use only",
        }],
    },
];
