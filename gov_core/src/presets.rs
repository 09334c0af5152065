//! Ordered catalog of named, reusable optimization parameters. The options
//! layer persists catalogs through plain `add`/`remove` calls; the dialog
//! uses structural lookup to label a parameter as a preset or "custom".

use serde::{Deserialize, Serialize};

use gov_schema::{CmParameter, OutputKind};

/// Preset descriptions are clamped to this many characters.
pub const MAX_PRESET_DESCRIPTION: usize = 80;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preset {
    pub description: String,
    pub parameter: CmParameter,
}

/// Prepend-ordered preset registry: newest first, no uniqueness constraint
/// on descriptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a preset, clamping the description to
    /// [`MAX_PRESET_DESCRIPTION`] characters.
    pub fn add(&mut self, description: &str, parameter: CmParameter) {
        let description = description.chars().take(MAX_PRESET_DESCRIPTION).collect();
        self.presets.insert(
            0,
            Preset {
                description,
                parameter,
            },
        );
    }

    /// Remove and return the preset at `index`. Out-of-range indices are a
    /// caller bug.
    pub fn remove(&mut self, index: usize) -> Preset {
        assert!(
            index < self.presets.len(),
            "preset index {index} out of range ({} presets)",
            self.presets.len()
        );
        self.presets.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Index of the first preset whose parameter is structurally equal to
    /// `parameter`, or `None` for a custom parameter.
    pub fn find_index(&self, parameter: &CmParameter) -> Option<usize> {
        self.presets
            .iter()
            .position(|preset| preset.parameter == *parameter)
    }

    /// Matching preset's description, or `"custom"`.
    pub fn describe(&self, parameter: &CmParameter) -> &str {
        match self.find_index(parameter) {
            Some(index) => &self.presets[index].description,
            None => "custom",
        }
    }

    /// Install the five built-in presets on a fresh install or a missing
    /// options file. No-op when any preset already exists.
    pub fn ensure_builtin(&mut self) {
        if !self.is_empty() {
            return;
        }
        // Declared order; prepend insertion stores them reversed.
        self.add("Very happy", builtin_very_happy());
        self.add("Prefer food", builtin_prefer(OutputKind::Food));
        self.add("Prefer production", builtin_prefer(OutputKind::Shield));
        self.add("Prefer gold", builtin_prefer(OutputKind::Gold));
        self.add("Prefer science", builtin_prefer(OutputKind::Science));
    }
}

fn builtin_base() -> CmParameter {
    let mut parameter = CmParameter {
        happy_factor: 0,
        require_happy: false,
        allow_disorder: false,
        allow_specialists: true,
        max_growth: false,
        ..CmParameter::default()
    };
    // Every built-in tolerates running a deficit on gold, nothing else.
    parameter.minimal_surplus[OutputKind::Gold.index()] = -20;
    parameter
}

fn builtin_very_happy() -> CmParameter {
    CmParameter {
        happy_factor: 25,
        ..builtin_base()
    }
}

fn builtin_prefer(kind: OutputKind) -> CmParameter {
    let mut parameter = builtin_base();
    parameter.factor[kind.index()] = 10;
    parameter
}
