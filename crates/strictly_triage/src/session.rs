//! Session state machine.
//!
//! A [`Session`] moves `Loading -> Active -> {Solved, Failed}` and back to
//! `Loading` when a new patient is requested. Every mutation goes through a
//! method here; commands issued while their preconditions are unmet are
//! ignored and leave the session untouched.
//!
//! Test orders are split into two steps so the caller can suspend between
//! them: [`Session::order_test`] issues the order and hands back a
//! [`TestOrder`] ticket, and [`Session::complete_test`] appends the result
//! once it arrives. The processing flag is held in between.

use crate::case::{Case, HistorySection};
use crate::catalog::{TestCategory, TestOption};
use crate::log::{LogCategory, LogEntry};
use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum GameStatus {
    /// Waiting for a case from the provider.
    Loading,
    /// Case is open; the player may investigate and diagnose.
    Active,
    /// Correct diagnosis submitted.
    Solved,
    /// Wrong diagnosis submitted.
    Failed,
}

impl GameStatus {
    /// Returns true once a diagnosis has been submitted.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Solved | Self::Failed)
    }
}

/// Result of submitting a diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiagnosisOutcome {
    /// The selection matched the true diagnosis.
    Correct {
        /// The true diagnosis.
        diagnosis: String,
    },
    /// The selection did not match.
    Incorrect {
        /// What the player chose.
        selected: String,
        /// What it actually was.
        actual: String,
    },
}

impl DiagnosisOutcome {
    /// Returns true for a correct diagnosis.
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }
}

impl std::fmt::Display for DiagnosisOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Correct { diagnosis } => write!(f, "Correct: {}", diagnosis),
            Self::Incorrect { selected, actual } => {
                write!(f, "Incorrect: {} (was {})", selected, actual)
            }
        }
    }
}

/// An issued test order awaiting its result.
///
/// Carries everything the provider needs, so the session need not be
/// borrowed while the result is fetched.
#[derive(Debug, Clone)]
pub struct TestOrder {
    epoch: u64,
    test: TestOption,
    case: Case,
}

impl TestOrder {
    /// The test that was ordered.
    pub fn test(&self) -> &TestOption {
        &self.test
    }

    /// The case the test was ordered against.
    pub fn case(&self) -> &Case {
        &self.case
    }

    /// Session epoch the order was issued in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Read-only view of a session for presentation.
#[derive(Debug, Clone, PartialEq, Getters, Serialize)]
pub struct SessionSnapshot {
    /// Lifecycle status.
    status: GameStatus,
    /// The active case, if one is loaded.
    case: Option<Case>,
    /// Timeline in insertion order.
    logs: Vec<LogEntry>,
    /// Sum of all entry costs.
    total_cost: u32,
    /// Tentative diagnosis.
    selected_diagnosis: Option<String>,
    /// True while a test order is outstanding.
    processing: bool,
}

/// The mutable session aggregate.
#[derive(Debug, Clone)]
pub struct Session {
    status: GameStatus,
    case: Option<Case>,
    logs: Vec<LogEntry>,
    total_cost: u32,
    selected_diagnosis: Option<String>,
    processing: bool,
    epoch: u64,
}

impl Session {
    /// Creates an empty session waiting for its first case.
    #[instrument]
    pub fn new() -> Self {
        Self {
            status: GameStatus::Loading,
            case: None,
            logs: Vec::new(),
            total_cost: 0,
            selected_diagnosis: None,
            processing: false,
            epoch: 0,
        }
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The loaded case.
    pub fn case(&self) -> Option<&Case> {
        self.case.as_ref()
    }

    /// Timeline in insertion order.
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Running cost.
    pub fn total_cost(&self) -> u32 {
        self.total_cost
    }

    /// Tentative diagnosis.
    pub fn selected_diagnosis(&self) -> Option<&str> {
        self.selected_diagnosis.as_deref()
    }

    /// True while a test order is outstanding.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Current session epoch; bumped on every restart.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Puts the session back into `Loading` for a new patient.
    ///
    /// Clears the previous case, timeline, cost, selection and processing
    /// flag. Returns the new epoch, which must be handed to [`Session::admit`].
    #[instrument(skip(self), fields(previous_epoch = self.epoch))]
    pub fn begin_loading(&mut self) -> u64 {
        self.epoch += 1;
        self.status = GameStatus::Loading;
        self.case = None;
        self.logs.clear();
        self.total_cost = 0;
        self.selected_diagnosis = None;
        self.processing = false;
        info!(epoch = self.epoch, "Admitting new patient");
        self.epoch
    }

    /// Installs a freshly generated case and opens the session.
    ///
    /// Returns false, changing nothing, when `epoch` belongs to a restart
    /// that has since been superseded.
    #[instrument(skip(self, case), fields(patient = %case.patient_name()))]
    pub fn admit(&mut self, epoch: u64, case: Case) -> bool {
        if epoch != self.epoch || self.status != GameStatus::Loading {
            warn!(epoch, current = self.epoch, "Discarding stale case");
            return false;
        }

        let content = format!("Patient admitted to ED. {}.", case.presenting_complaint());
        self.logs.clear();
        self.total_cost = 0;
        self.selected_diagnosis = None;
        self.case = Some(case);
        self.append(LogCategory::System, "New Patient Arrival", content, 0);
        self.status = GameStatus::Active;
        info!(epoch, "Patient admitted");
        true
    }

    /// Issues a test order.
    ///
    /// Only valid while `Active` with no other order outstanding. Appends the
    /// order notice and holds the processing flag until
    /// [`Session::complete_test`].
    #[instrument(skip(self, test), fields(test_id = test.id(), status = %self.status))]
    pub fn order_test(&mut self, test: &TestOption) -> Option<TestOrder> {
        if self.status != GameStatus::Active || self.processing {
            debug!(processing = self.processing, "Ignoring test order");
            return None;
        }
        let case = self.case.clone()?;

        self.processing = true;
        self.append(
            LogCategory::System,
            format!("Ordering {}", test.name()),
            "Waiting for results...",
            0,
        );
        info!("Test ordered");

        Some(TestOrder {
            epoch: self.epoch,
            test: *test,
            case,
        })
    }

    /// Appends the result of an issued order and releases the processing flag.
    ///
    /// The test cost is charged here. Results still land after the case has
    /// been closed; only orders from a superseded epoch are dropped.
    #[instrument(skip(self, order, result), fields(test_id = order.test.id()))]
    pub fn complete_test(&mut self, order: TestOrder, result: impl Into<String>) -> bool {
        if order.epoch != self.epoch {
            warn!(order_epoch = order.epoch, current = self.epoch, "Dropping stale result");
            return false;
        }

        let category = match order.test.category() {
            TestCategory::Imaging => LogCategory::Imaging,
            _ => LogCategory::Lab,
        };
        self.append(
            category,
            format!("{} Result", order.test.name()),
            result,
            order.test.cost(),
        );
        self.processing = false;
        info!(total_cost = self.total_cost, "Test result recorded");
        true
    }

    /// Reveals one history section at no cost.
    ///
    /// A section whose title is already on the timeline is not added twice.
    #[instrument(skip(self), fields(section = section.key()))]
    pub fn reveal_history(&mut self, section: HistorySection) -> bool {
        if self.status != GameStatus::Active {
            return false;
        }
        let Some(case) = &self.case else {
            return false;
        };

        let title = section.title();
        if self.logs.iter().any(|entry| entry.title() == title) {
            debug!("History section already revealed");
            return false;
        }

        let content = case.history(section).to_string();
        self.append(LogCategory::History, title, content, 0);
        true
    }

    /// Records a tentative diagnosis.
    #[instrument(skip(self, candidate))]
    pub fn select_diagnosis(&mut self, candidate: impl Into<String>) -> bool {
        if self.status != GameStatus::Active {
            return false;
        }
        let candidate = candidate.into();
        debug!(candidate = %candidate, "Diagnosis selected");
        self.selected_diagnosis = Some(candidate);
        true
    }

    /// Submits the selected diagnosis and closes the case.
    #[instrument(skip(self))]
    pub fn submit_diagnosis(&mut self) -> Option<DiagnosisOutcome> {
        if self.status != GameStatus::Active {
            return None;
        }
        let selected = self.selected_diagnosis.clone()?;
        let actual = self.case.as_ref()?.true_diagnosis().clone();

        let outcome = if selected == actual {
            self.status = GameStatus::Solved;
            self.append(
                LogCategory::Diagnosis,
                "Case Closed",
                format!(
                    "CORRECT DIAGNOSIS: {}. Patient treatment started successfully. Outcome: Full Recovery.",
                    selected
                ),
                0,
            );
            DiagnosisOutcome::Correct { diagnosis: actual }
        } else {
            self.status = GameStatus::Failed;
            self.append(
                LogCategory::Diagnosis,
                "Case Failed",
                format!(
                    "INCORRECT DIAGNOSIS: {}.\n\nThe correct diagnosis was: {}.\n\nPatient condition deteriorated.",
                    selected, actual
                ),
                0,
            );
            DiagnosisOutcome::Incorrect { selected, actual }
        };

        info!(%outcome, status = %self.status, "Diagnosis submitted");
        Some(outcome)
    }

    /// Copies the presentation-visible state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            case: self.case.clone(),
            logs: self.logs.clone(),
            total_cost: self.total_cost,
            selected_diagnosis: self.selected_diagnosis.clone(),
            processing: self.processing,
        }
    }

    fn append(
        &mut self,
        category: LogCategory,
        title: impl Into<String>,
        content: impl Into<String>,
        cost: u32,
    ) {
        let entry = LogEntry::new(category, title, content, cost);
        self.total_cost += cost;
        self.logs.push(entry);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
