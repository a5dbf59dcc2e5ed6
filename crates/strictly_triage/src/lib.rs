//! Strictly Triage - pure clinical-case session logic.
//!
//! This crate holds the parts of the diagnosis simulator that never touch
//! the network or the terminal:
//!
//! - **Case**: the generated patient scenario and its differential invariant
//! - **Catalog**: the static list of orderable investigations
//! - **Log**: append-only timeline entries
//! - **Session**: the state machine that ties them together
//!
//! # Example
//!
//! ```
//! use strictly_triage::{Case, GameStatus, HistorySection, Session, TestCatalog};
//!
//! let mut session = Session::new();
//! let epoch = session.begin_loading();
//! session.admit(epoch, Case::fallback());
//!
//! let ecg = TestCatalog::by_id("ecg").expect("ecg is in the catalog");
//! let order = session.order_test(ecg).expect("session is active");
//! session.complete_test(order, "Sinus tachycardia, rate 110.");
//! session.reveal_history(HistorySection::PastMedical);
//!
//! session.select_diagnosis("Acute Coronary Syndrome");
//! session.submit_diagnosis();
//! assert_eq!(session.status(), GameStatus::Solved);
//! assert_eq!(session.total_cost(), 35);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod case;
mod catalog;
mod log;
mod session;

pub use case::{Case, CaseError, DIFFERENTIAL_COUNT, HistorySection, Vitals};
pub use catalog::{TestCatalog, TestCategory, TestOption};
pub use log::{LogCategory, LogEntry};
pub use session::{DiagnosisOutcome, GameStatus, Session, SessionSnapshot, TestOrder};
