//! Key bindings.

use crossterm::event::KeyCode;
use strictly_triage::{GameStatus, HistorySection};

/// What a key press asks the UI to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the simulator.
    Quit,
    /// Next test category tab.
    NextCategory,
    /// Previous test category tab.
    PrevCategory,
    /// Move the test cursor up.
    TestUp,
    /// Move the test cursor down.
    TestDown,
    /// Order the highlighted test.
    OrderHighlighted,
    /// Ask about a history section.
    Reveal(HistorySection),
    /// Move the differential cursor back.
    DifferentialPrev,
    /// Move the differential cursor forward.
    DifferentialNext,
    /// Select the highlighted differential.
    SelectHighlighted,
    /// Confirm the selected diagnosis.
    Submit,
    /// Admit the next patient.
    NewPatient,
}

/// Maps a key to an action given the session status.
///
/// Only quitting works while a patient is being admitted, and only the
/// next-patient key works once the case is closed.
pub fn action_for(key: KeyCode, status: GameStatus) -> Option<Action> {
    match (status, key) {
        (_, KeyCode::Char('q') | KeyCode::Esc) => Some(Action::Quit),
        (GameStatus::Loading, _) => None,
        (GameStatus::Solved | GameStatus::Failed, KeyCode::Char('n')) => Some(Action::NewPatient),
        (GameStatus::Solved | GameStatus::Failed, _) => None,
        (GameStatus::Active, key) => match key {
            KeyCode::Tab => Some(Action::NextCategory),
            KeyCode::BackTab => Some(Action::PrevCategory),
            KeyCode::Up => Some(Action::TestUp),
            KeyCode::Down => Some(Action::TestDown),
            KeyCode::Enter => Some(Action::OrderHighlighted),
            KeyCode::Char('p') => Some(Action::Reveal(HistorySection::PastMedical)),
            KeyCode::Char('d') => Some(Action::Reveal(HistorySection::Drug)),
            KeyCode::Char('s') => Some(Action::Reveal(HistorySection::Social)),
            KeyCode::Char('a') => Some(Action::Reveal(HistorySection::Allergies)),
            KeyCode::Left => Some(Action::DifferentialPrev),
            KeyCode::Right => Some(Action::DifferentialNext),
            KeyCode::Char(' ') => Some(Action::SelectHighlighted),
            KeyCode::Char('c') => Some(Action::Submit),
            _ => None,
        },
    }
}
