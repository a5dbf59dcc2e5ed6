//! Case providers: where patients and test results come from.
//!
//! A [`CaseProvider`] never fails from the caller's point of view. Backend
//! errors are logged and masked with fixed fallback values so a session can
//! always proceed.

use crate::llm_client::{LlmError, TextGenerator};
use rand::seq::SliceRandom;
use strictly_triage::{Case, CaseError, TestCategory};
use tracing::{debug, info, instrument, warn};

/// Result text used when the backend cannot be reached.
pub const LAB_OFFLINE: &str = "Lab system offline. Please try again.";

/// Result text used when the backend answers with nothing.
pub const INCONCLUSIVE: &str = "Test results inconclusive due to sample error. Please repeat.";

/// Clinical areas a generated case is drawn from.
pub const SPECIALTIES: [&str; 16] = [
    "Respiratory",
    "Cardiology",
    "Neurology",
    "Gastroenterology",
    "Endocrinology",
    "Infectious Disease",
    "Hematology",
    "Nephrology",
    "Rheumatology",
    "Acute General Surgery",
    "Toxicology",
    "Immunology",
    "Vascular",
    "Urology",
    "Geriatrics",
    "Tropical Medicine",
];

const SYSTEM_PROMPT: &str = "You are a medical simulator engine for a diagnostic training game. \
Be clinical, concise and professional. Use British English spelling.";

/// Source of patient cases and test interpretations.
#[async_trait::async_trait]
pub trait CaseProvider: Send + Sync {
    /// Generates a new patient case. Never fails; falls back to
    /// [`Case::fallback`].
    async fn generate_case(&self) -> Case;

    /// Produces the result text for a test ordered against `case`. Never
    /// fails; falls back to a fixed message.
    async fn interpret_test(&self, case: &Case, test_name: &str, category: TestCategory)
    -> String;
}

/// Why a generated case was rejected.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ProviderError {
    /// The backend call failed.
    #[display("{}", _0)]
    Llm(LlmError),
    /// The reply held no usable JSON case.
    #[display("Malformed case payload: {}", _0)]
    Malformed(String),
    /// The case broke the differential invariant.
    #[display("Invalid case: {}", _0)]
    Invalid(CaseError),
}

impl std::error::Error for ProviderError {}

impl From<LlmError> for ProviderError {
    fn from(err: LlmError) -> Self {
        Self::Llm(err)
    }
}

impl From<CaseError> for ProviderError {
    fn from(err: CaseError) -> Self {
        Self::Invalid(err)
    }
}

/// Provider backed by a text-generation model.
#[derive(Debug, Clone)]
pub struct LlmCaseProvider<G> {
    generator: G,
}

impl<G: TextGenerator> LlmCaseProvider<G> {
    /// Wraps a text generator.
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Generates and validates a case for one specialty.
    #[instrument(skip(self))]
    pub async fn try_generate_case(&self, specialty: &str) -> Result<Case, ProviderError> {
        let reply = self
            .generator
            .generate_json(SYSTEM_PROMPT, &case_prompt(specialty), &case_schema())
            .await?;
        parse_case(&reply)
    }
}

#[async_trait::async_trait]
impl<G: TextGenerator> CaseProvider for LlmCaseProvider<G> {
    #[instrument(skip(self))]
    async fn generate_case(&self) -> Case {
        let specialty = random_specialty();
        match self.try_generate_case(specialty).await {
            Ok(case) => {
                info!(specialty, patient = %case.patient_name(), "Generated case");
                case
            }
            Err(e) => {
                warn!(specialty, error = %e, "Case generation failed, using fallback case");
                Case::fallback()
            }
        }
    }

    #[instrument(skip(self, case))]
    async fn interpret_test(
        &self,
        case: &Case,
        test_name: &str,
        category: TestCategory,
    ) -> String {
        let prompt = interpretation_prompt(case, test_name, category);
        match self.generator.generate(SYSTEM_PROMPT, &prompt).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Empty interpretation returned");
                INCONCLUSIVE.to_string()
            }
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Test interpretation failed");
                LAB_OFFLINE.to_string()
            }
        }
    }
}

/// Provider that never leaves the machine.
///
/// Always admits the fallback patient and answers from a short script, so
/// the game is playable without an API key.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

#[async_trait::async_trait]
impl CaseProvider for OfflineProvider {
    async fn generate_case(&self) -> Case {
        debug!("Offline provider admitting fallback patient");
        Case::fallback()
    }

    async fn interpret_test(
        &self,
        _case: &Case,
        test_name: &str,
        category: TestCategory,
    ) -> String {
        let scripted = match test_name {
            "12-Lead ECG" => Some("Sinus tachycardia, rate 110. 2mm ST elevation in V2-V4 with reciprocal depression in III and aVF."),
            "Troponin T" => Some("Troponin T 412 ng/L (reference < 14 ng/L)."),
            "Full Blood Count" => Some("Hb 148 g/L, WCC 11.2 x10^9/L, Plt 265 x10^9/L."),
            "D-Dimer" => Some("D-Dimer 410 ng/mL (reference < 500 ng/mL)."),
            "CXR (Chest X-Ray)" => Some("Normal cardiomediastinal contour. Lungs clear. No pneumothorax."),
            "Echocardiogram" => Some("Regional hypokinesia of the anterior wall. Estimated LVEF 45%. No pericardial effusion."),
            _ => None,
        };

        scripted
            .unwrap_or(match category {
                TestCategory::Bedside => "Within normal limits for age.",
                TestCategory::Lab => "All parameters within reference ranges.",
                TestCategory::Imaging => "No acute abnormality demonstrated.",
                TestCategory::Special => {
                    "Patient reviewed. No additional specialist findings at this stage."
                }
            })
            .to_string()
    }
}

/// Picks a specialty at random.
pub fn random_specialty() -> &'static str {
    SPECIALTIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Cardiology")
}

/// Builds the case-generation prompt for one specialty.
pub fn case_prompt(specialty: &str) -> String {
    format!(
        r#"Generate a high-fidelity, complex medical case study for a diagnostic simulation game.
The patient presents with a condition related to: {specialty}.

The case should be challenging but solvable with careful investigation. It can be a rare
presentation of a common disease, or a classic presentation of a rare disease. The differentials
should cover a broad scope (medical, surgical, or psychosomatic where relevant).

Reply with a single JSON object and nothing else, using exactly these keys:
patientName (string), age (integer), gender (string), presentingComplaint (string),
historyOfPresentingComplaint (string), pastMedicalHistory (string), drugHistory (string),
allergies (string), socialHistory (string), trueDiagnosis (string),
differentials (array of strings),
initialVitals (object: hr integer, bp string, rr integer, o2 integer, temp number, gcs integer).

The differentials array must contain exactly 5 strings: 4 incorrect but plausible diagnoses and
1 string matching trueDiagnosis exactly.
The initialVitals must be realistic for the condition.
Use British English spelling (e.g. Haemoglobin, Oesophagus)."#
    )
}

/// Builds the interpretation prompt for a test ordered against `case`.
pub fn interpretation_prompt(case: &Case, test_name: &str, category: TestCategory) -> String {
    format!(
        r#"Patient: {age}y {gender}.
True Diagnosis: {diagnosis}.
Presentation: {complaint}.

The doctor has ordered: {test_name} ({category}).

Generate the text result for this test.
- If it is a lab test, provide values with units.
- If it is imaging, describe the radiological findings.
- If the test is irrelevant to the true diagnosis, return normal or unremarkable findings that are realistic for the patient's age.
- Be brief, clinical and professional.
- Do NOT reveal the diagnosis explicitly, only the findings."#,
        age = case.age(),
        gender = case.gender(),
        diagnosis = case.true_diagnosis(),
        complaint = case.presenting_complaint(),
    )
}

/// Response schema for a generated case, in the Gemini schema dialect.
pub fn case_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "patientName": { "type": "STRING" },
            "age": { "type": "INTEGER" },
            "gender": { "type": "STRING" },
            "presentingComplaint": { "type": "STRING" },
            "historyOfPresentingComplaint": { "type": "STRING" },
            "pastMedicalHistory": { "type": "STRING" },
            "drugHistory": { "type": "STRING" },
            "allergies": { "type": "STRING" },
            "socialHistory": { "type": "STRING" },
            "trueDiagnosis": { "type": "STRING" },
            "differentials": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "initialVitals": {
                "type": "OBJECT",
                "properties": {
                    "hr": { "type": "INTEGER" },
                    "bp": { "type": "STRING" },
                    "rr": { "type": "INTEGER" },
                    "o2": { "type": "INTEGER" },
                    "temp": { "type": "NUMBER" },
                    "gcs": { "type": "INTEGER" }
                },
                "required": ["hr", "bp", "rr", "o2", "temp", "gcs"]
            }
        },
        "required": [
            "patientName",
            "age",
            "gender",
            "presentingComplaint",
            "trueDiagnosis",
            "differentials",
            "initialVitals"
        ]
    })
}

/// Parses and validates a generated case from a model reply.
///
/// Tolerates prose or code fences around the JSON object. Decoding starts
/// at the first `{` and stops after the first complete value, so anything
/// trailing it is ignored.
///
/// # Errors
///
/// Returns [`ProviderError::Malformed`] when no case can be decoded and
/// [`ProviderError::Invalid`] when the case breaks the differential
/// invariant.
#[instrument(skip(reply), fields(reply_length = reply.len()))]
pub fn parse_case(reply: &str) -> Result<Case, ProviderError> {
    let start = reply
        .find('{')
        .ok_or_else(|| ProviderError::Malformed("no JSON object in reply".to_string()))?;
    let case = serde_json::Deserializer::from_str(&reply[start..])
        .into_iter::<Case>()
        .next()
        .ok_or_else(|| ProviderError::Malformed("no JSON object in reply".to_string()))?
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;
    case.validate()?;
    Ok(case)
}
