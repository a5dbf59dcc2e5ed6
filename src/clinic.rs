//! Async driver for a diagnosis session.
//!
//! [`Clinic`] owns the [`Session`] and the [`CaseProvider`]. Presentation
//! code reads [`SessionSnapshot`]s and feeds [`Command`]s back in; it never
//! touches the session directly.
//!
//! Provider calls are the only suspension points, plus the display delay
//! before a test result is shown. Only one test may be in flight; the
//! session's processing flag rejects further orders until it completes.

use crate::provider::CaseProvider;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use strictly_triage::{
    DiagnosisOutcome, HistorySection, Session, SessionSnapshot, TestCatalog, TestOrder,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Delay between a result arriving and it appearing on the timeline.
pub const DEFAULT_DISPLAY_DELAY: Duration = Duration::from_millis(1500);

/// The five intents a presentation layer can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Admit a new patient, discarding the current one.
    StartSession,
    /// Order a test by catalog id.
    OrderTest(String),
    /// Ask the patient about one history section.
    RevealHistory(HistorySection),
    /// Mark a differential as the working diagnosis.
    SelectDiagnosis(String),
    /// Commit to the working diagnosis.
    SubmitDiagnosis,
}

/// Session driver.
pub struct Clinic<P> {
    session: Arc<Mutex<Session>>,
    provider: Arc<P>,
    display_delay: Duration,
}

impl<P> Clone for Clinic<P> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            provider: Arc::clone(&self.provider),
            display_delay: self.display_delay,
        }
    }
}

impl<P> std::fmt::Debug for Clinic<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clinic")
            .field("display_delay", &self.display_delay)
            .finish_non_exhaustive()
    }
}

impl<P: CaseProvider + 'static> Clinic<P> {
    /// Creates a driver with an empty session.
    #[instrument(skip(provider))]
    pub fn new(provider: P, display_delay: Duration) -> Self {
        info!("Creating clinic");
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            provider: Arc::new(provider),
            display_delay,
        }
    }

    /// Copies the current state for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session().snapshot()
    }

    /// Admits a new patient.
    ///
    /// Resolves once the provider has produced a case and the session is
    /// `Active`. Calling it again restarts cleanly.
    #[instrument(skip(self))]
    pub async fn start_session(&self) {
        let epoch = self.session().begin_loading();
        let case = self.provider.generate_case().await;
        let admitted = self.session().admit(epoch, case);
        debug!(epoch, admitted, "Start session finished");
    }

    /// Orders a test by catalog id.
    ///
    /// The order notice is appended immediately; the result follows on a
    /// spawned task whose handle is returned. Returns `None` when the id is
    /// unknown or the session refuses the order.
    #[instrument(skip(self))]
    pub fn order_test(&self, test_id: &str) -> Option<JoinHandle<()>> {
        let test = TestCatalog::by_id(test_id)?;
        let order = self.session().order_test(test)?;

        let clinic = self.clone();
        Some(tokio::spawn(async move { clinic.fetch_result(order).await }))
    }

    /// Reveals a history section.
    #[instrument(skip(self))]
    pub fn reveal_history(&self, section: HistorySection) -> bool {
        self.session().reveal_history(section)
    }

    /// Records a tentative diagnosis.
    #[instrument(skip(self))]
    pub fn select_diagnosis(&self, candidate: &str) -> bool {
        self.session().select_diagnosis(candidate)
    }

    /// Submits the tentative diagnosis.
    #[instrument(skip(self))]
    pub fn submit_diagnosis(&self) -> Option<DiagnosisOutcome> {
        self.session().submit_diagnosis()
    }

    /// Applies one presentation command.
    ///
    /// Asynchronous commands run on a spawned task; its handle is returned
    /// so callers may wait for completion.
    #[instrument(skip(self))]
    pub fn dispatch(&self, command: Command) -> Option<JoinHandle<()>> {
        match command {
            Command::StartSession => {
                let clinic = self.clone();
                Some(tokio::spawn(async move { clinic.start_session().await }))
            }
            Command::OrderTest(id) => self.order_test(&id),
            Command::RevealHistory(section) => {
                self.reveal_history(section);
                None
            }
            Command::SelectDiagnosis(candidate) => {
                self.select_diagnosis(&candidate);
                None
            }
            Command::SubmitDiagnosis => {
                self.submit_diagnosis();
                None
            }
        }
    }

    #[instrument(skip(self, order), fields(test_id = order.test().id(), epoch = order.epoch()))]
    async fn fetch_result(&self, order: TestOrder) {
        let test = *order.test();
        let result = self
            .provider
            .interpret_test(order.case(), test.name(), test.category())
            .await;
        tokio::time::sleep(self.display_delay).await;
        self.session().complete_test(order, result);
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
