//! Tests for the async session driver.

use std::sync::Arc;
use std::time::Duration;
use strictly_clinic::{
    Case, CaseProvider, Clinic, Command, DiagnosisOutcome, GameStatus, HistorySection,
    LogCategory, OfflineProvider, TestCategory,
};
use tokio::sync::Notify;

/// Admits the fallback patient and holds every result until the gate opens.
struct GatedProvider {
    gate: Arc<Notify>,
}

#[async_trait::async_trait]
impl CaseProvider for GatedProvider {
    async fn generate_case(&self) -> Case {
        Case::fallback()
    }

    async fn interpret_test(&self, _case: &Case, test_name: &str, _category: TestCategory) -> String {
        self.gate.notified().await;
        format!("{} unremarkable", test_name)
    }
}

fn gated_clinic() -> (Clinic<GatedProvider>, Arc<Notify>) {
    let gate = Arc::new(Notify::new());
    let provider = GatedProvider {
        gate: Arc::clone(&gate),
    };
    (Clinic::new(provider, Duration::ZERO), gate)
}

#[tokio::test]
async fn test_start_session_admits_patient() {
    let clinic = Clinic::new(OfflineProvider, Duration::ZERO);
    assert_eq!(*clinic.snapshot().status(), GameStatus::Loading);

    clinic.start_session().await;

    let snapshot = clinic.snapshot();
    assert_eq!(*snapshot.status(), GameStatus::Active);
    assert_eq!(snapshot.logs().len(), 1);
    assert_eq!(*snapshot.logs()[0].category(), LogCategory::System);
    assert_eq!(snapshot.logs()[0].title(), "New Patient Arrival");
    assert_eq!(*snapshot.total_cost(), 0);
    assert_eq!(snapshot.case().as_ref(), Some(&Case::fallback()));
}

#[tokio::test]
async fn test_order_while_processing_is_ignored() {
    let (clinic, gate) = gated_clinic();
    clinic.start_session().await;

    let handle = clinic.order_test("ecg").expect("First order should be accepted");
    assert!(*clinic.snapshot().processing());
    assert!(clinic.order_test("fbc").is_none(), "Second order should be refused");
    assert_eq!(clinic.snapshot().logs().len(), 2);

    gate.notify_one();
    handle.await.expect("Result task panicked");

    let snapshot = clinic.snapshot();
    assert!(!*snapshot.processing());
    assert_eq!(snapshot.logs().len(), 3);
    assert_eq!(snapshot.logs()[2].title(), "12-Lead ECG Result");
    assert_eq!(snapshot.logs()[2].content(), "12-Lead ECG unremarkable");
    assert_eq!(*snapshot.total_cost(), 35);
}

#[tokio::test]
async fn test_unknown_test_id_is_ignored() {
    let clinic = Clinic::new(OfflineProvider, Duration::ZERO);
    clinic.start_session().await;

    assert!(clinic.order_test("xray_of_soul").is_none());
    assert_eq!(clinic.snapshot().logs().len(), 1);
    assert!(!*clinic.snapshot().processing());
}

#[tokio::test]
async fn test_order_before_admission_is_ignored() {
    let clinic = Clinic::new(OfflineProvider, Duration::ZERO);
    assert!(clinic.order_test("ecg").is_none());
    assert!(clinic.snapshot().logs().is_empty());
}

#[tokio::test]
async fn test_submit_during_inflight_test_still_records_result() {
    let (clinic, gate) = gated_clinic();
    clinic.start_session().await;

    let handle = clinic.order_test("ecg").expect("Order should be accepted");
    assert!(clinic.select_diagnosis("Aortic Dissection"));
    let outcome = clinic.submit_diagnosis().expect("Submission should be accepted");
    assert_eq!(
        outcome,
        DiagnosisOutcome::Incorrect {
            selected: "Aortic Dissection".to_string(),
            actual: "Acute Coronary Syndrome".to_string(),
        }
    );

    gate.notify_one();
    handle.await.expect("Result task panicked");

    let snapshot = clinic.snapshot();
    let titles: Vec<&str> = snapshot.logs().iter().map(|e| e.title().as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "New Patient Arrival",
            "Ordering 12-Lead ECG",
            "Case Failed",
            "12-Lead ECG Result",
        ]
    );
    assert_eq!(*snapshot.total_cost(), 35);
    assert_eq!(*snapshot.status(), GameStatus::Failed);
}

#[tokio::test]
async fn test_restart_discards_inflight_result() {
    let (clinic, gate) = gated_clinic();
    clinic.start_session().await;
    let handle = clinic.order_test("ctpa").expect("Order should be accepted");

    clinic.start_session().await;
    gate.notify_one();
    handle.await.expect("Result task panicked");

    let snapshot = clinic.snapshot();
    assert_eq!(*snapshot.status(), GameStatus::Active);
    assert_eq!(snapshot.logs().len(), 1);
    assert_eq!(*snapshot.total_cost(), 0);
    assert!(!*snapshot.processing());
}

#[tokio::test]
async fn test_dispatch_plays_a_correct_case() {
    let clinic = Clinic::new(OfflineProvider, Duration::ZERO);

    clinic
        .dispatch(Command::StartSession)
        .expect("Start should spawn")
        .await
        .expect("Start task panicked");

    assert!(
        clinic
            .dispatch(Command::RevealHistory(HistorySection::PastMedical))
            .is_none()
    );
    clinic
        .dispatch(Command::OrderTest("trop".to_string()))
        .expect("Order should spawn")
        .await
        .expect("Result task panicked");
    clinic.dispatch(Command::SelectDiagnosis(
        "Acute Coronary Syndrome".to_string(),
    ));
    clinic.dispatch(Command::SubmitDiagnosis);

    let snapshot = clinic.snapshot();
    assert_eq!(*snapshot.status(), GameStatus::Solved);
    assert_eq!(*snapshot.total_cost(), 25);
    assert_eq!(snapshot.logs().len(), 5);
    assert_eq!(snapshot.logs()[1].title(), "Past Medical History");
    assert_eq!(snapshot.logs()[1].content(), "Hypertension");
    assert_eq!(
        snapshot.logs()[3].content(),
        "Troponin T 412 ng/L (reference < 14 ng/L)."
    );
    assert_eq!(snapshot.logs()[4].title(), "Case Closed");
}

#[tokio::test]
async fn test_imaging_result_is_filed_as_imaging() {
    let clinic = Clinic::new(OfflineProvider, Duration::ZERO);
    clinic.start_session().await;

    clinic
        .order_test("cxr")
        .expect("Order should be accepted")
        .await
        .expect("Result task panicked");

    let snapshot = clinic.snapshot();
    let last = snapshot.logs().last().expect("Timeline should not be empty");
    assert_eq!(*last.category(), LogCategory::Imaging);
    assert_eq!(*last.cost(), 35);
}

#[tokio::test]
async fn test_submit_without_selection_is_ignored() {
    let clinic = Clinic::new(OfflineProvider, Duration::ZERO);
    clinic.start_session().await;

    assert!(clinic.submit_diagnosis().is_none());
    assert_eq!(*clinic.snapshot().status(), GameStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn test_result_waits_for_display_delay() {
    let clinic = Clinic::new(OfflineProvider, Duration::from_millis(1500));
    clinic.start_session().await;

    let handle = clinic.order_test("ecg").expect("Order should be accepted");

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let snapshot = clinic.snapshot();
    assert_eq!(snapshot.logs().len(), 2);
    assert!(*snapshot.processing());
    assert_eq!(*snapshot.total_cost(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    handle.await.expect("Result task panicked");

    let snapshot = clinic.snapshot();
    assert_eq!(snapshot.logs().len(), 3);
    assert_eq!(snapshot.logs()[2].title(), "12-Lead ECG Result");
    assert_eq!(*snapshot.total_cost(), 35);
    assert!(!*snapshot.processing());
}
