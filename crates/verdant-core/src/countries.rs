//! The supported-country registry and the two country select inputs.
//!
//! Only countries the backend can resolve to an ISO code have telemetry, so
//! the selects are filled from a fixed list rather than free text.

use tracing::{debug, warn};

use verdant_contracts::{
    error::{DashboardError, DashboardResult},
    telemetry::CountrySelection,
};

/// A country the backend serves telemetry for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub name: &'static str,
    /// ISO 3166-1 alpha-2 code.
    pub iso2: &'static str,
}

/// Every country the dashboard offers, in display order.
pub const SUPPORTED_COUNTRIES: [Country; 17] = [
    Country { name: "Australia", iso2: "AU" },
    Country { name: "Brazil", iso2: "BR" },
    Country { name: "Canada", iso2: "CA" },
    Country { name: "China", iso2: "CN" },
    Country { name: "Denmark", iso2: "DK" },
    Country { name: "France", iso2: "FR" },
    Country { name: "Germany", iso2: "DE" },
    Country { name: "India", iso2: "IN" },
    Country { name: "Italy", iso2: "IT" },
    Country { name: "Japan", iso2: "JP" },
    Country { name: "Mexico", iso2: "MX" },
    Country { name: "Norway", iso2: "NO" },
    Country { name: "South Africa", iso2: "ZA" },
    Country { name: "South Korea", iso2: "KR" },
    Country { name: "Sweden", iso2: "SE" },
    Country { name: "United Kingdom", iso2: "GB" },
    Country { name: "United States", iso2: "US" },
];

/// Look up a supported country by its display name (case-sensitive).
pub fn find_country(name: &str) -> Option<&'static Country> {
    SUPPORTED_COUNTRIES.iter().find(|c| c.name == name)
}

const PRIMARY_PLACEHOLDER: &str = "choose a country...";
const COMPARISON_PLACEHOLDER: &str = "compare with... (optional)";

/// One entry in a select input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    /// Disabled options are shown but cannot be chosen.
    pub disabled: bool,
}

impl SelectOption {
    fn country(c: &Country) -> Self {
        Self {
            value: c.name.to_string(),
            label: c.name.to_string(),
            disabled: false,
        }
    }

    fn placeholder(label: &str, disabled: bool) -> Self {
        Self {
            value: String::new(),
            label: label.to_string(),
            disabled,
        }
    }
}

/// A single-choice input. The empty string means "nothing chosen".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectInput {
    options: Vec<SelectOption>,
    value: String,
}

impl SelectInput {
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace every option and reset the value to the leading placeholder.
    fn replace_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.value.clear();
    }

    /// Choose the option whose value is `value`.
    ///
    /// Fails for values that are not offered and for disabled options; the
    /// current value is left untouched on failure.
    pub fn set_value(&mut self, value: &str) -> DashboardResult<()> {
        let Some(option) = self.options.iter().find(|o| o.value == value) else {
            return Err(if value.is_empty() {
                DashboardError::InvalidSelection {
                    reason: "this input has no empty option".to_string(),
                }
            } else {
                DashboardError::UnknownCountry {
                    country: value.to_string(),
                }
            });
        };
        if option.disabled {
            return Err(DashboardError::InvalidSelection {
                reason: format!("option '{}' cannot be chosen", option.label),
            });
        }
        self.value = value.to_string();
        Ok(())
    }
}

/// The primary and comparison country selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryInputs {
    pub primary: SelectInput,
    pub comparison: SelectInput,
}

impl CountryInputs {
    /// Create populated inputs with nothing selected.
    pub fn new() -> Self {
        let mut inputs = Self::default();
        inputs.populate_countries();
        inputs
    }

    /// Fill both selects from `SUPPORTED_COUNTRIES`.
    ///
    /// Replaces rather than appends, so calling this any number of times
    /// leaves the same state. The primary placeholder is disabled so a real
    /// choice is required; the comparison placeholder stays selectable.
    pub fn populate_countries(&mut self) {
        let mut primary = vec![SelectOption::placeholder(PRIMARY_PLACEHOLDER, true)];
        let mut comparison = vec![SelectOption::placeholder(COMPARISON_PLACEHOLDER, false)];
        primary.extend(SUPPORTED_COUNTRIES.iter().map(SelectOption::country));
        comparison.extend(SUPPORTED_COUNTRIES.iter().map(SelectOption::country));

        self.primary.replace_options(primary);
        self.comparison.replace_options(comparison);

        debug!(countries = SUPPORTED_COUNTRIES.len(), "country selects populated");
    }

    pub fn select_primary(&mut self, country: &str) -> DashboardResult<()> {
        self.primary.set_value(country).inspect_err(|e| {
            warn!(country = %country, error = %e, "primary country rejected");
        })
    }

    /// Pick a comparison country; `""` clears it.
    pub fn select_comparison(&mut self, country: &str) -> DashboardResult<()> {
        self.comparison.set_value(country).inspect_err(|e| {
            warn!(country = %country, error = %e, "comparison country rejected");
        })
    }

    /// What a dashboard load should fetch, or `None` with no primary chosen.
    pub fn selection(&self) -> Option<CountrySelection> {
        CountrySelection::from_inputs(self.primary.value(), self.comparison.value())
    }
}
