use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Benefit categories a caller can ask about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKey {
    PrimaryCare,
    SpecialistVisit,
    UrgentCare,
    EmergencyRoom,
    LabWork,
    Xray,
    Mri,
    CtScan,
    PhysicalTherapy,
    MentalHealth,
    Chiropractic,
    SurgeryOutpatient,
    SurgeryInpatient,
    PrescriptionGeneric,
    PrescriptionBrand,
}

impl ServiceKey {
    /// Key used in plan benefit tables
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKey::PrimaryCare => "primary_care",
            ServiceKey::SpecialistVisit => "specialist_visit",
            ServiceKey::UrgentCare => "urgent_care",
            ServiceKey::EmergencyRoom => "emergency_room",
            ServiceKey::LabWork => "lab_work",
            ServiceKey::Xray => "xray",
            ServiceKey::Mri => "mri",
            ServiceKey::CtScan => "ct_scan",
            ServiceKey::PhysicalTherapy => "physical_therapy",
            ServiceKey::MentalHealth => "mental_health",
            ServiceKey::Chiropractic => "chiropractic",
            ServiceKey::SurgeryOutpatient => "surgery_outpatient",
            ServiceKey::SurgeryInpatient => "surgery_inpatient",
            ServiceKey::PrescriptionGeneric => "prescription_generic",
            ServiceKey::PrescriptionBrand => "prescription_brand",
        }
    }

    /// Name the voice agent reads back to the caller
    pub fn display_name(self) -> &'static str {
        match self {
            ServiceKey::PrimaryCare => "Primary Care Visit",
            ServiceKey::SpecialistVisit => "Specialist Visit",
            ServiceKey::UrgentCare => "Urgent Care",
            ServiceKey::EmergencyRoom => "Emergency Room",
            ServiceKey::LabWork => "Lab Work / Blood Tests",
            ServiceKey::Xray => "X-Ray",
            ServiceKey::Mri => "MRI",
            ServiceKey::CtScan => "CT Scan",
            ServiceKey::PhysicalTherapy => "Physical Therapy",
            ServiceKey::MentalHealth => "Mental / Behavioral Health",
            ServiceKey::Chiropractic => "Chiropractic Care",
            ServiceKey::SurgeryOutpatient => "Outpatient Surgery",
            ServiceKey::SurgeryInpatient => "Inpatient Surgery",
            ServiceKey::PrescriptionGeneric => "Prescription (Generic)",
            ServiceKey::PrescriptionBrand => "Prescription (Brand Name)",
        }
    }
}

impl std::fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller phrasings for each benefit category
pub const SERVICE_ALIASES: &[(&str, ServiceKey)] = &[
    ("primary care", ServiceKey::PrimaryCare),
    ("pcp", ServiceKey::PrimaryCare),
    ("pcp visit", ServiceKey::PrimaryCare),
    ("office visit", ServiceKey::PrimaryCare),
    ("doctor visit", ServiceKey::PrimaryCare),
    ("checkup", ServiceKey::PrimaryCare),
    ("annual physical", ServiceKey::PrimaryCare),
    ("wellness visit", ServiceKey::PrimaryCare),
    ("specialist", ServiceKey::SpecialistVisit),
    ("specialist visit", ServiceKey::SpecialistVisit),
    ("referral", ServiceKey::SpecialistVisit),
    ("consultation", ServiceKey::SpecialistVisit),
    ("urgent care", ServiceKey::UrgentCare),
    ("walk-in", ServiceKey::UrgentCare),
    ("walk in", ServiceKey::UrgentCare),
    ("emergency", ServiceKey::EmergencyRoom),
    ("emergency room", ServiceKey::EmergencyRoom),
    ("er", ServiceKey::EmergencyRoom),
    ("er visit", ServiceKey::EmergencyRoom),
    ("e.r.", ServiceKey::EmergencyRoom),
    ("lab", ServiceKey::LabWork),
    ("labs", ServiceKey::LabWork),
    ("lab work", ServiceKey::LabWork),
    ("blood work", ServiceKey::LabWork),
    ("bloodwork", ServiceKey::LabWork),
    ("blood test", ServiceKey::LabWork),
    ("laboratory", ServiceKey::LabWork),
    ("x-ray", ServiceKey::Xray),
    ("xray", ServiceKey::Xray),
    ("x ray", ServiceKey::Xray),
    ("mri", ServiceKey::Mri),
    ("m.r.i.", ServiceKey::Mri),
    ("magnetic resonance", ServiceKey::Mri),
    ("ct scan", ServiceKey::CtScan),
    ("ct", ServiceKey::CtScan),
    ("cat scan", ServiceKey::CtScan),
    ("c.t.", ServiceKey::CtScan),
    ("physical therapy", ServiceKey::PhysicalTherapy),
    ("pt", ServiceKey::PhysicalTherapy),
    ("physio", ServiceKey::PhysicalTherapy),
    ("physiotherapy", ServiceKey::PhysicalTherapy),
    ("rehab", ServiceKey::PhysicalTherapy),
    ("rehabilitation", ServiceKey::PhysicalTherapy),
    ("mental health", ServiceKey::MentalHealth),
    ("counseling", ServiceKey::MentalHealth),
    ("therapy", ServiceKey::MentalHealth),
    ("behavioral health", ServiceKey::MentalHealth),
    ("psychiatry", ServiceKey::MentalHealth),
    ("psychologist", ServiceKey::MentalHealth),
    ("therapist", ServiceKey::MentalHealth),
    ("chiropractic", ServiceKey::Chiropractic),
    ("chiropractor", ServiceKey::Chiropractic),
    ("chiro", ServiceKey::Chiropractic),
    ("outpatient surgery", ServiceKey::SurgeryOutpatient),
    ("ambulatory surgery", ServiceKey::SurgeryOutpatient),
    ("day surgery", ServiceKey::SurgeryOutpatient),
    ("surgery", ServiceKey::SurgeryOutpatient),
    ("inpatient surgery", ServiceKey::SurgeryInpatient),
    ("hospital surgery", ServiceKey::SurgeryInpatient),
    ("generic prescription", ServiceKey::PrescriptionGeneric),
    ("generic", ServiceKey::PrescriptionGeneric),
    ("generic drug", ServiceKey::PrescriptionGeneric),
    ("generic medication", ServiceKey::PrescriptionGeneric),
    ("prescription", ServiceKey::PrescriptionGeneric),
    ("medication", ServiceKey::PrescriptionGeneric),
    ("rx", ServiceKey::PrescriptionGeneric),
    ("brand prescription", ServiceKey::PrescriptionBrand),
    ("brand name", ServiceKey::PrescriptionBrand),
    ("brand drug", ServiceKey::PrescriptionBrand),
    ("brand medication", ServiceKey::PrescriptionBrand),
];

lazy_static! {
    // Stable sort keeps table order among aliases of equal length.
    static ref ALIASES_LONGEST_FIRST: Vec<(&'static str, ServiceKey)> = {
        let mut aliases = SERVICE_ALIASES.to_vec();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        aliases
    };
}

/// Resolve a spoken service description to a benefit category.
///
/// Exact alias matches win. Otherwise the longest alias contained in the
/// phrase decides, so "physical therapy session" resolves through
/// "physical therapy" rather than "pt" or "therapy".
pub fn normalize_service_phrase(raw: &str) -> Option<ServiceKey> {
    let phrase = raw.trim().to_lowercase();
    if phrase.is_empty() {
        return None;
    }

    if let Some((_, key)) = SERVICE_ALIASES.iter().find(|(alias, _)| *alias == phrase) {
        return Some(*key);
    }

    ALIASES_LONGEST_FIRST
        .iter()
        .find(|(alias, _)| phrase.contains(alias))
        .map(|(_, key)| *key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_aliases() {
        assert_eq!(normalize_service_phrase("physio"), Some(ServiceKey::PhysicalTherapy));
        assert_eq!(normalize_service_phrase("  MRI "), Some(ServiceKey::Mri));
        assert_eq!(normalize_service_phrase("pt"), Some(ServiceKey::PhysicalTherapy));
        assert_eq!(normalize_service_phrase("rx"), Some(ServiceKey::PrescriptionGeneric));
    }

    #[test]
    fn test_longest_alias_wins_inside_phrase() {
        assert_eq!(
            normalize_service_phrase("physical therapy sessions"),
            Some(ServiceKey::PhysicalTherapy)
        );
        assert_eq!(
            normalize_service_phrase("outpatient surgery on the knee"),
            Some(ServiceKey::SurgeryOutpatient)
        );
        assert_eq!(
            normalize_service_phrase("an inpatient surgery"),
            Some(ServiceKey::SurgeryInpatient)
        );
        assert_eq!(
            normalize_service_phrase("brand name drug"),
            Some(ServiceKey::PrescriptionBrand)
        );
    }

    #[test]
    fn test_unknown_phrase() {
        assert_eq!(normalize_service_phrase("dental cleaning"), None);
        assert_eq!(normalize_service_phrase(""), None);
    }

    #[test]
    fn test_keys_serialize_as_table_keys() {
        let json = serde_json::to_string(&ServiceKey::CtScan).unwrap();
        assert_eq!(json, "\"ct_scan\"");
        assert_eq!(ServiceKey::PhysicalTherapy.display_name(), "Physical Therapy");
    }

    proptest! {
        #[test]
        fn prop_resolution_always_comes_from_alias_table(raw in "\\PC{0,30}") {
            if let Some(key) = normalize_service_phrase(&raw) {
                prop_assert!(SERVICE_ALIASES.iter().any(|(_, k)| *k == key));
            }
        }
    }
}
