//! Strictly Clinic - clinical diagnosis simulator
//!
//! A terminal game in which the player assesses an LLM-generated emergency
//! patient, orders investigations with a running cost, and commits to one
//! diagnosis from a list of differentials.
//!
//! # Architecture
//!
//! - **Triage** (`strictly_triage`): case model, test catalog, timeline and
//!   the session state machine. Pure and synchronous.
//! - **Provider**: where cases and test results come from (LLM or offline)
//! - **Clinic**: async driver that owns the session and calls the provider
//! - **TUI**: ratatui front end that renders snapshots and issues commands
//!
//! # Example
//!
//! ```no_run
//! use strictly_clinic::{Clinic, Command, OfflineProvider, DEFAULT_DISPLAY_DELAY};
//!
//! # async fn example() {
//! let clinic = Clinic::new(OfflineProvider, DEFAULT_DISPLAY_DELAY);
//! clinic.start_session().await;
//!
//! if let Some(handle) = clinic.dispatch(Command::OrderTest("ecg".to_string())) {
//!     handle.await.ok();
//! }
//! println!("Spent {}", clinic.snapshot().total_cost());
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod clinic;
mod config;
mod llm_client;
mod provider;
pub mod tui;

// Crate-level exports - Driver
pub use clinic::{Clinic, Command, DEFAULT_DISPLAY_DELAY};

// Crate-level exports - Configuration
pub use config::{ClinicConfig, ConfigError};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider, TextGenerator};

// Crate-level exports - Case providers
pub use provider::{
    CaseProvider, INCONCLUSIVE, LAB_OFFLINE, LlmCaseProvider, OfflineProvider, ProviderError,
    SPECIALTIES, case_prompt, case_schema, interpretation_prompt, parse_case, random_specialty,
};

// Crate-level exports - Domain types
pub use strictly_triage::{
    Case, CaseError, DiagnosisOutcome, GameStatus, HistorySection, LogCategory, LogEntry,
    Session, SessionSnapshot, TestCatalog, TestCategory, TestOption, Vitals,
};
