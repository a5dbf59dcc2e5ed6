//! Tests for case providers with stubbed text generators.

use std::sync::{Arc, Mutex};
use strictly_clinic::{
    Case, CaseProvider, INCONCLUSIVE, LAB_OFFLINE, LlmCaseProvider, LlmError, OfflineProvider,
    ProviderError, SPECIALTIES, TestCategory, TextGenerator, case_prompt, case_schema,
    interpretation_prompt, parse_case, random_specialty,
};

/// Replies with the same text (or error) to every prompt.
struct ScriptedGenerator {
    reply: Result<String, String>,
}

impl ScriptedGenerator {
    fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err("connection refused".to_string()),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _system_prompt: &str, _user_message: &str) -> Result<String, LlmError> {
        self.reply.clone().map_err(LlmError::new)
    }
}

/// Answers only in JSON mode and remembers the schema it was given.
struct JsonOnlyGenerator {
    case_json: String,
    schema_seen: Arc<Mutex<Option<serde_json::Value>>>,
}

#[async_trait::async_trait]
impl TextGenerator for JsonOnlyGenerator {
    async fn generate(&self, _system_prompt: &str, _user_message: &str) -> Result<String, LlmError> {
        Err(LlmError::new("plain generation not expected".to_string()))
    }

    async fn generate_json(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        *self.schema_seen.lock().expect("Lock poisoned") = Some(schema.clone());
        Ok(self.case_json.clone())
    }
}

fn fenced_case_json(case: &Case) -> String {
    let json = serde_json::to_string_pretty(case).expect("Case should serialize");
    format!("Here is your case:\n```json\n{}\n```", json)
}

fn custom_case() -> Case {
    let mut value = serde_json::to_value(Case::fallback()).expect("Case should serialize");
    value["patientName"] = "Priya Shah".into();
    value["trueDiagnosis"] = "Pulmonary Embolism".into();
    serde_json::from_value(value).expect("Case should deserialize")
}

#[tokio::test]
async fn test_failed_generation_falls_back() {
    let provider = LlmCaseProvider::new(ScriptedGenerator::failing());
    assert_eq!(provider.generate_case().await, Case::fallback());
}

#[tokio::test]
async fn test_failed_interpretation_reports_lab_offline() {
    let provider = LlmCaseProvider::new(ScriptedGenerator::failing());
    let result = provider
        .interpret_test(&Case::fallback(), "Troponin T", TestCategory::Lab)
        .await;
    assert_eq!(result, LAB_OFFLINE);
}

#[tokio::test]
async fn test_empty_interpretation_is_inconclusive() {
    let provider = LlmCaseProvider::new(ScriptedGenerator::replying("  \n"));
    let result = provider
        .interpret_test(&Case::fallback(), "CT Head", TestCategory::Imaging)
        .await;
    assert_eq!(result, INCONCLUSIVE);
}

#[tokio::test]
async fn test_interpretation_is_trimmed() {
    let provider = LlmCaseProvider::new(ScriptedGenerator::replying("\n  Hb 92 g/L (low)  \n"));
    let result = provider
        .interpret_test(&Case::fallback(), "Full Blood Count", TestCategory::Lab)
        .await;
    assert_eq!(result, "Hb 92 g/L (low)");
}

#[tokio::test]
async fn test_generated_case_in_code_fence_is_used() {
    let expected = custom_case();
    let provider = LlmCaseProvider::new(ScriptedGenerator::replying(fenced_case_json(&expected)));

    let case = provider.generate_case().await;
    assert_eq!(case, expected);
    assert_eq!(case.patient_name(), "Priya Shah");
}

#[tokio::test]
async fn test_case_with_wrong_differential_count_falls_back() {
    let mut value = serde_json::to_value(custom_case()).expect("Case should serialize");
    value["differentials"] = serde_json::json!(["Pulmonary Embolism", "Pneumonia", "Asthma"]);
    let reply = value.to_string();

    let err = parse_case(&reply).expect_err("Three differentials should be rejected");
    assert!(matches!(err, ProviderError::Invalid(_)));

    let provider = LlmCaseProvider::new(ScriptedGenerator::replying(reply));
    assert_eq!(provider.generate_case().await, Case::fallback());
}

#[tokio::test]
async fn test_try_generate_case_surfaces_llm_error() {
    let provider = LlmCaseProvider::new(ScriptedGenerator::failing());
    let err = provider
        .try_generate_case("Cardiology")
        .await
        .expect_err("Generator failure should surface");
    assert!(matches!(err, ProviderError::Llm(_)));
}

#[test]
fn test_parse_case_rejects_prose() {
    let err = parse_case("I'm sorry, I can't help with that.").expect_err("No JSON");
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[test]
fn test_parse_case_rejects_wrong_shape() {
    let err = parse_case(r#"{"patientName": "X", "age": "forty"}"#).expect_err("Bad age");
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn test_offline_provider_scripts_known_tests() {
    let provider = OfflineProvider;
    assert_eq!(provider.generate_case().await, Case::fallback());

    let ecg = provider
        .interpret_test(&Case::fallback(), "12-Lead ECG", TestCategory::Bedside)
        .await;
    assert!(ecg.contains("ST elevation"));

    let consult = provider
        .interpret_test(&Case::fallback(), "Neurology Consult", TestCategory::Special)
        .await;
    assert!(!consult.is_empty());
    assert_ne!(consult, LAB_OFFLINE);
}

#[test]
fn test_prompts_carry_case_context() {
    let prompt = case_prompt("Toxicology");
    assert!(prompt.contains("Toxicology"));
    assert!(prompt.contains("exactly 5"));

    let case = Case::fallback();
    let prompt = interpretation_prompt(&case, "D-Dimer", TestCategory::Lab);
    assert!(prompt.contains("D-Dimer (LAB)"));
    assert!(prompt.contains("Acute Coronary Syndrome"));
    assert!(prompt.contains("45y Male"));
}

#[test]
fn test_random_specialty_is_listed() {
    for _ in 0..32 {
        assert!(SPECIALTIES.contains(&random_specialty()));
    }
}

#[tokio::test]
async fn test_case_generation_uses_json_mode() {
    let expected = custom_case();
    let generator = JsonOnlyGenerator {
        case_json: serde_json::to_string(&expected).expect("Case should serialize"),
        schema_seen: Arc::default(),
    };
    let provider = LlmCaseProvider::new(generator);

    assert_eq!(provider.generate_case().await, expected);

    // Interpretation stays on plain text, which this generator refuses.
    let result = provider
        .interpret_test(&expected, "CT Pulmonary Angiogram", TestCategory::Imaging)
        .await;
    assert_eq!(result, LAB_OFFLINE);
}

#[tokio::test]
async fn test_json_mode_receives_case_schema() {
    let schema_seen: Arc<Mutex<Option<serde_json::Value>>> = Arc::default();
    let generator = JsonOnlyGenerator {
        case_json: serde_json::to_string(&Case::fallback()).expect("Case should serialize"),
        schema_seen: Arc::clone(&schema_seen),
    };
    let provider = LlmCaseProvider::new(generator);
    provider
        .try_generate_case("Cardiology")
        .await
        .expect("Case should parse");

    let seen = schema_seen.lock().expect("Lock poisoned").clone();
    assert_eq!(seen, Some(case_schema()));
}

#[test]
fn test_case_schema_mirrors_case_fields() {
    let schema = case_schema();
    let case = serde_json::to_value(Case::fallback()).expect("Case should serialize");
    let fields = case.as_object().expect("Case is an object");
    let properties = schema["properties"].as_object().expect("Schema has properties");

    for key in fields.keys() {
        assert!(properties.contains_key(key), "Schema lacks {}", key);
    }
    assert_eq!(schema["properties"]["differentials"]["type"], "ARRAY");
    assert_eq!(schema["properties"]["initialVitals"]["properties"]["temp"]["type"], "NUMBER");
}

#[test]
fn test_parse_case_ignores_braces_after_the_case() {
    let expected = custom_case();
    let json = serde_json::to_string(&expected).expect("Case should serialize");
    let reply = format!("{}\nNote: units are {{SI}}", json);

    let case = parse_case(&reply).expect("Trailing remark should be ignored");
    assert_eq!(case, expected);
}
