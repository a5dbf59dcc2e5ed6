//! Static catalog of orderable investigations.

use serde::Serialize;
use tracing::{debug, instrument};

/// Department an investigation belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TestCategory {
    /// Done at the bedside (ECG, gases, dipstick).
    Bedside,
    /// Sent to the laboratory.
    Lab,
    /// Radiology.
    Imaging,
    /// Specialist consultation.
    Special,
}

impl TestCategory {
    /// Returns the tab label shown on the order board.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bedside => "Bedside",
            Self::Lab => "Laboratory",
            Self::Imaging => "Imaging",
            Self::Special => "Specialist",
        }
    }
}

/// One orderable investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TestOption {
    id: &'static str,
    name: &'static str,
    cost: u32,
    category: TestCategory,
}

impl TestOption {
    const fn new(id: &'static str, name: &'static str, cost: u32, category: TestCategory) -> Self {
        Self {
            id,
            name,
            cost,
            category,
        }
    }

    /// Returns the unique catalog id.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the flat cost in pounds.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Returns the department.
    pub fn category(&self) -> TestCategory {
        self.category
    }
}

use TestCategory::{Bedside, Imaging, Lab, Special};

static TESTS: [TestOption; 27] = [
    TestOption::new("ecg", "12-Lead ECG", 35, Bedside),
    TestOption::new("abg", "Arterial Blood Gas", 45, Bedside),
    TestOption::new("urinalysis", "Urinalysis Dipstick", 5, Bedside),
    TestOption::new("fundoscopy", "Fundoscopy", 0, Bedside),
    TestOption::new("fbc", "Full Blood Count", 12, Lab),
    TestOption::new("u_e", "Urea & Electrolytes", 12, Lab),
    TestOption::new("lft", "Liver Function Tests", 15, Lab),
    TestOption::new("crp", "C-Reactive Protein", 10, Lab),
    TestOption::new("trop", "Troponin T", 25, Lab),
    TestOption::new("d_dimer", "D-Dimer", 20, Lab),
    TestOption::new("coag", "Coagulation Screen", 15, Lab),
    TestOption::new("blood_culture", "Blood Cultures", 40, Lab),
    TestOption::new("tft", "Thyroid Function", 18, Lab),
    TestOption::new("autoimmune", "Autoimmune Screen", 85, Lab),
    TestOption::new("lp", "Lumbar Puncture (CSF Analysis)", 120, Lab),
    TestOption::new("cxr", "CXR (Chest X-Ray)", 35, Imaging),
    TestOption::new("axr", "AXR (Abdominal X-Ray)", 35, Imaging),
    TestOption::new("ct_head", "CT Head", 180, Imaging),
    TestOption::new("ct_abdo", "CT Abdomen/Pelvis", 250, Imaging),
    TestOption::new("ctpa", "CT Pulmonary Angiogram", 280, Imaging),
    TestOption::new("mri_brain", "MRI Brain", 450, Imaging),
    TestOption::new("uss_abdo", "Ultrasound Abdomen", 90, Imaging),
    TestOption::new("echo", "Echocardiogram", 150, Imaging),
    TestOption::new("consult_cardio", "Cardiology Consult", 100, Special),
    TestOption::new("consult_neuro", "Neurology Consult", 100, Special),
    TestOption::new("consult_resp", "Respiratory Consult", 100, Special),
    TestOption::new("consult_surg", "Surgical Consult", 100, Special),
];

/// Read-only view over the investigation catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestCatalog;

impl TestCatalog {
    /// Every test, in catalog order.
    pub fn all() -> &'static [TestOption] {
        &TESTS
    }

    /// Looks a test up by id.
    #[instrument]
    pub fn by_id(id: &str) -> Option<&'static TestOption> {
        let found = TESTS.iter().find(|test| test.id == id);
        if found.is_none() {
            debug!(id, "No such test in catalog");
        }
        found
    }

    /// Tests belonging to one category, in catalog order.
    pub fn in_category(category: TestCategory) -> impl Iterator<Item = &'static TestOption> {
        TESTS.iter().filter(move |test| test.category == category)
    }
}
