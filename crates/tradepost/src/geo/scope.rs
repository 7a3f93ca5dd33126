//! Availability-scope validation and fallback.
//!
//! A listing declares the granularity it should be advertised at. When the
//! location value at that level is unspecified, the scope falls back to the
//! first coarser level that does carry a value; it never narrows and never
//! silently drops the listing. Only when every level up to continent is empty
//! does the declared field get an error.

use serde::{Deserialize, Serialize};

use super::domain::{LocationLevel, UNSPECIFIED_ID};

/// Geographic granularity a listing is advertised at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityScope {
    Global,
    Continent,
    Country,
    State,
    Town,
}

impl AvailabilityScope {
    pub fn label(self) -> &'static str {
        match self {
            AvailabilityScope::Global => "global",
            AvailabilityScope::Continent => "continent",
            AvailabilityScope::Country => "country",
            AvailabilityScope::State => "state",
            AvailabilityScope::Town => "town",
        }
    }

    /// The hierarchy level this scope reads from; `None` for global.
    pub fn location_level(self) -> Option<LocationLevel> {
        match self {
            AvailabilityScope::Global => None,
            AvailabilityScope::Continent => Some(LocationLevel::Continent),
            AvailabilityScope::Country => Some(LocationLevel::Country),
            AvailabilityScope::State => Some(LocationLevel::State),
            AvailabilityScope::Town => Some(LocationLevel::Town),
        }
    }

    fn for_level(level: LocationLevel) -> AvailabilityScope {
        match level {
            LocationLevel::Continent => AvailabilityScope::Continent,
            LocationLevel::Country => AvailabilityScope::Country,
            LocationLevel::State => AvailabilityScope::State,
            LocationLevel::Town => AvailabilityScope::Town,
        }
    }
}

/// Raw form input for one hierarchy level: a dropdown selection, free text, or
/// nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelInput {
    Chosen(u32),
    Typed(String),
    Unset,
}

impl LevelInput {
    /// A value counts as specified unless it is absent, blank, the literal
    /// "unspecified" (any casing), or the reserved sentinel id.
    pub fn is_specified(&self) -> bool {
        match self {
            LevelInput::Unset => false,
            LevelInput::Chosen(id) => *id != UNSPECIFIED_ID,
            LevelInput::Typed(raw) => {
                let trimmed = raw.trim();
                !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("unspecified")
            }
        }
    }
}

/// One input per hierarchy level, as submitted on the listing form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSelection {
    pub continent: LevelInput,
    pub country: LevelInput,
    pub state: LevelInput,
    pub town: LevelInput,
}

impl LocationSelection {
    pub fn empty() -> Self {
        Self {
            continent: LevelInput::Unset,
            country: LevelInput::Unset,
            state: LevelInput::Unset,
            town: LevelInput::Unset,
        }
    }

    pub fn level(&self, level: LocationLevel) -> &LevelInput {
        match level {
            LocationLevel::Continent => &self.continent,
            LocationLevel::Country => &self.country,
            LocationLevel::State => &self.state,
            LocationLevel::Town => &self.town,
        }
    }
}

/// A user-facing validation error attributed to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// "continent-wide" / "state-specific" phrasing used in the listing form.
fn scope_qualifier(level: LocationLevel) -> &'static str {
    match level {
        LocationLevel::Continent | LocationLevel::Country => "wide",
        LocationLevel::State | LocationLevel::Town => "specific",
    }
}

fn missing_scope_error(level: LocationLevel) -> FieldError {
    let name = level.label();
    FieldError::new(
        name,
        format!(
            "You selected '{name}-{}', but no valid {name} was provided.",
            scope_qualifier(level)
        ),
    )
}

/// Validate a declared scope against the submitted location values.
///
/// Returns the effective scope, which is the declared one when its level
/// carries a value, otherwise the first coarser level that does. The error
/// case (nothing specified at any level) is attributed to the declared
/// scope's field and the message is surfaced to the submitter verbatim.
pub fn resolve_scope(
    declared: AvailabilityScope,
    selection: &LocationSelection,
) -> Result<AvailabilityScope, FieldError> {
    let Some(declared_level) = declared.location_level() else {
        // Global needs no location at all.
        return Ok(AvailabilityScope::Global);
    };

    let mut cursor = Some(declared_level);
    while let Some(level) = cursor {
        if selection.level(level).is_specified() {
            return Ok(AvailabilityScope::for_level(level));
        }
        cursor = level.coarser();
    }

    Err(missing_scope_error(declared_level))
}
