//! UI-local state: which tab, which test, which differential.
//!
//! None of this touches the session. [`App::handle`] turns an [`Action`]
//! into at most one [`Command`] for the clinic.

use super::input::Action;
use crate::clinic::Command;
use strictly_triage::{SessionSnapshot, TestCatalog, TestCategory, TestOption};
use tracing::debug;

/// Order-board tabs, left to right.
pub const CATEGORIES: [TestCategory; 4] = [
    TestCategory::Bedside,
    TestCategory::Lab,
    TestCategory::Imaging,
    TestCategory::Special,
];

/// Cursor state for the terminal UI.
#[derive(Debug, Clone, Default)]
pub struct App {
    category: usize,
    test_cursor: usize,
    differential_cursor: usize,
    should_quit: bool,
}

impl App {
    /// Creates a new application.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the active tab in [`CATEGORIES`].
    pub fn category_index(&self) -> usize {
        self.category
    }

    /// The active tab.
    pub fn category(&self) -> TestCategory {
        CATEGORIES[self.category % CATEGORIES.len()]
    }

    /// Tests listed under the active tab.
    pub fn visible_tests(&self) -> Vec<&'static TestOption> {
        TestCatalog::in_category(self.category()).collect()
    }

    /// Highlighted row in the test list.
    pub fn test_cursor(&self) -> usize {
        self.test_cursor
    }

    /// Highlighted differential.
    pub fn differential_cursor(&self) -> usize {
        self.differential_cursor
    }

    /// True once the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Applies an action, returning the command to dispatch, if any.
    pub fn handle(&mut self, action: Action, snapshot: &SessionSnapshot) -> Option<Command> {
        debug!(?action, "Handling action");
        let differential_count = snapshot
            .case()
            .as_ref()
            .map_or(0, |case| case.differentials().len());

        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::NextCategory => {
                self.category = (self.category + 1) % CATEGORIES.len();
                self.test_cursor = 0;
                None
            }
            Action::PrevCategory => {
                self.category = (self.category + CATEGORIES.len() - 1) % CATEGORIES.len();
                self.test_cursor = 0;
                None
            }
            Action::TestUp => {
                self.test_cursor = self.test_cursor.saturating_sub(1);
                None
            }
            Action::TestDown => {
                let last = self.visible_tests().len().saturating_sub(1);
                self.test_cursor = (self.test_cursor + 1).min(last);
                None
            }
            Action::OrderHighlighted => self
                .visible_tests()
                .get(self.test_cursor)
                .map(|test| Command::OrderTest(test.id().to_string())),
            Action::Reveal(section) => Some(Command::RevealHistory(section)),
            Action::DifferentialPrev if differential_count > 0 => {
                self.differential_cursor =
                    (self.differential_cursor + differential_count - 1) % differential_count;
                None
            }
            Action::DifferentialNext if differential_count > 0 => {
                self.differential_cursor = (self.differential_cursor + 1) % differential_count;
                None
            }
            Action::DifferentialPrev | Action::DifferentialNext => None,
            Action::SelectHighlighted => snapshot.case().as_ref().and_then(|case| {
                case.differentials()
                    .get(self.differential_cursor)
                    .map(|candidate| Command::SelectDiagnosis(candidate.clone()))
            }),
            Action::Submit => Some(Command::SubmitDiagnosis),
            Action::NewPatient => {
                self.test_cursor = 0;
                self.differential_cursor = 0;
                Some(Command::StartSession)
            }
        }
    }
}
