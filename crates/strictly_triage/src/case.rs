//! Patient case model.
//!
//! A [`Case`] is fetched once per session and never mutated afterwards. The
//! true diagnosis travels with the case but is only revealed through the
//! diagnosis entry appended when the player submits.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// Number of candidate diagnoses offered with every case.
pub const DIFFERENTIAL_COUNT: usize = 5;

/// Initial bedside observations recorded at admission.
#[derive(Debug, Clone, PartialEq, Default, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    /// Heart rate (beats per minute).
    hr: u32,
    /// Blood pressure as free text, e.g. `"150/95"`.
    bp: String,
    /// Respiratory rate (breaths per minute).
    rr: u32,
    /// Oxygen saturation (percent).
    o2: u32,
    /// Temperature (degrees Celsius).
    temp: f64,
    /// Glasgow Coma Scale score.
    gcs: u32,
}

impl Vitals {
    /// Creates a vitals snapshot.
    pub fn new(hr: u32, bp: impl Into<String>, rr: u32, o2: u32, temp: f64, gcs: u32) -> Self {
        Self {
            hr,
            bp: bp.into(),
            rr,
            o2,
            temp,
            gcs,
        }
    }
}

/// A generated patient scenario.
///
/// Field names follow the camelCase JSON schema the case generator is asked
/// to produce, so a provider reply deserializes straight into this type.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Patient's full name.
    patient_name: String,
    /// Age in years.
    age: u32,
    /// Patient's sex as reported.
    gender: String,
    /// One-line reason for attendance.
    #[serde(default)]
    presenting_complaint: String,
    /// Narrative elaboration of the presenting complaint.
    #[serde(default)]
    history_of_presenting_complaint: String,
    /// Past medical history.
    #[serde(default)]
    past_medical_history: String,
    /// Current medications.
    #[serde(default)]
    drug_history: String,
    /// Known allergies.
    #[serde(default)]
    allergies: String,
    /// Social history.
    #[serde(default)]
    social_history: String,
    /// Hidden from the player until the case is closed.
    true_diagnosis: String,
    /// Candidate diagnoses offered to the player.
    differentials: Vec<String>,
    /// Observations at admission.
    initial_vitals: Vitals,
}

impl Case {
    /// Returns the deterministic case used whenever generation fails.
    #[instrument]
    pub fn fallback() -> Self {
        Self {
            patient_name: "John Doe".to_string(),
            age: 45,
            gender: "Male".to_string(),
            presenting_complaint: "Chest Pain".to_string(),
            history_of_presenting_complaint:
                "Sudden onset central chest pain radiating to left arm.".to_string(),
            past_medical_history: "Hypertension".to_string(),
            drug_history: "Amlodipine 5mg OD".to_string(),
            allergies: "NKDA".to_string(),
            social_history: "Smoker 20/day".to_string(),
            true_diagnosis: "Acute Coronary Syndrome".to_string(),
            differentials: [
                "Acute Coronary Syndrome",
                "Pulmonary Embolism",
                "Aortic Dissection",
                "GORD",
                "Musculoskeletal Pain",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            initial_vitals: Vitals::new(110, "150/95", 22, 96, 37.1, 15),
        }
    }

    /// Returns the text of one history section.
    pub fn history(&self, section: HistorySection) -> &str {
        match section {
            HistorySection::PastMedical => &self.past_medical_history,
            HistorySection::Drug => &self.drug_history,
            HistorySection::Social => &self.social_history,
            HistorySection::Allergies => &self.allergies,
        }
    }

    /// Checks the differential invariant.
    ///
    /// A playable case has exactly [`DIFFERENTIAL_COUNT`] distinct
    /// differentials, one of which is the true diagnosis.
    ///
    /// # Errors
    ///
    /// Returns the first [`CaseError`] found.
    #[instrument(skip(self), fields(true_diagnosis = %self.true_diagnosis))]
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.patient_name.trim().is_empty() {
            return Err(CaseError::MissingField("patientName"));
        }
        if self.true_diagnosis.trim().is_empty() {
            return Err(CaseError::MissingField("trueDiagnosis"));
        }
        if self.differentials.len() != DIFFERENTIAL_COUNT {
            return Err(CaseError::WrongDifferentialCount(self.differentials.len()));
        }

        let mut seen = HashSet::new();
        for candidate in &self.differentials {
            if !seen.insert(candidate.as_str()) {
                return Err(CaseError::DuplicateDifferential(candidate.clone()));
            }
        }

        if !seen.contains(self.true_diagnosis.as_str()) {
            return Err(CaseError::TrueDiagnosisMissing(self.true_diagnosis.clone()));
        }

        Ok(())
    }
}

/// A history section the player can ask the patient about.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum HistorySection {
    /// Past medical history.
    #[strum(serialize = "PMH")]
    PastMedical,
    /// Drug history.
    #[strum(serialize = "DHx")]
    Drug,
    /// Social history.
    #[strum(serialize = "SHx")]
    Social,
    /// Allergies.
    #[strum(serialize = "ALL")]
    Allergies,
}

impl HistorySection {
    /// Returns the short clinical key (`PMH`, `DHx`, `SHx`, `ALL`).
    pub fn key(self) -> &'static str {
        match self {
            Self::PastMedical => "PMH",
            Self::Drug => "DHx",
            Self::Social => "SHx",
            Self::Allergies => "ALL",
        }
    }

    /// Returns the timeline title used when the section is revealed.
    pub fn title(self) -> &'static str {
        match self {
            Self::PastMedical => "Past Medical History",
            Self::Drug => "Drug History",
            Self::Social => "Social History",
            Self::Allergies => "Allergies",
        }
    }
}

/// A generated case that breaks the differential invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CaseError {
    /// A required field is blank.
    #[display("Case field {} is empty", _0)]
    MissingField(&'static str),

    /// The case does not offer exactly five differentials.
    #[display("Expected 5 differentials, found {}", _0)]
    WrongDifferentialCount(usize),

    /// The same differential appears more than once.
    #[display("Differential {:?} appears more than once", _0)]
    DuplicateDifferential(String),

    /// The true diagnosis is not among the differentials.
    #[display("True diagnosis {:?} is not among the differentials", _0)]
    TrueDiagnosisMissing(String),
}

impl std::error::Error for CaseError {}
