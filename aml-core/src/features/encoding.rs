//! Categorical Encoding
//!
//! Closed category types for the five form inputs and their fixed integer
//! codes. Parsing a text label is the only fallible step; once a value is a
//! typed category its code lookup is an exhaustive match.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::layout::FEATURE_COUNT;

/// Lowest year the form accepts
pub const YEAR_MIN: i32 = 1900;

/// Highest year the form accepts
pub const YEAR_MAX: i32 = 2999;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("Unmapped category for {field}: '{value}'")]
    UnmappedCategory { field: &'static str, value: String },

    #[error("Missing input field: {0}")]
    MissingField(&'static str),

    #[error("Invalid year: '{0}'")]
    InvalidYear(String),
}

// ============================================================================
// CATEGORIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn code(self) -> u8 {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ethnicity {
    Hispanic,
    NonHispanic,
}

impl Ethnicity {
    pub const ALL: [Ethnicity; 2] = [Ethnicity::Hispanic, Ethnicity::NonHispanic];

    pub fn code(self) -> u8 {
        match self {
            Ethnicity::Hispanic => 1,
            Ethnicity::NonHispanic => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Ethnicity::Hispanic => "Hispanic",
            Ethnicity::NonHispanic => "Non-Hispanic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Race {
    White,
    BlackOrAfricanAmerican,
    AsianOrPacificIslander,
}

impl Race {
    pub const ALL: [Race; 3] = [
        Race::White,
        Race::BlackOrAfricanAmerican,
        Race::AsianOrPacificIslander,
    ];

    pub fn code(self) -> u8 {
        match self {
            Race::White => 1,
            Race::BlackOrAfricanAmerican => 0,
            Race::AsianOrPacificIslander => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Race::White => "White",
            Race::BlackOrAfricanAmerican => "Black or African American",
            Race::AsianOrPacificIslander => "Asian or Pacific Islander",
        }
    }
}

/// Five-year age buckets, open-ended from 85
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Age1To4,
    Age5To9,
    Age10To14,
    Age15To19,
    Age20To24,
    Age25To29,
    Age30To34,
    Age35To39,
    Age40To44,
    Age45To49,
    Age50To54,
    Age55To59,
    Age60To64,
    Age65To69,
    Age70To74,
    Age75To79,
    Age80To84,
    Age85Plus,
}

impl AgeGroup {
    /// All buckets, in code order
    pub const ALL: [AgeGroup; 18] = [
        AgeGroup::Age1To4,
        AgeGroup::Age5To9,
        AgeGroup::Age10To14,
        AgeGroup::Age15To19,
        AgeGroup::Age20To24,
        AgeGroup::Age25To29,
        AgeGroup::Age30To34,
        AgeGroup::Age35To39,
        AgeGroup::Age40To44,
        AgeGroup::Age45To49,
        AgeGroup::Age50To54,
        AgeGroup::Age55To59,
        AgeGroup::Age60To64,
        AgeGroup::Age65To69,
        AgeGroup::Age70To74,
        AgeGroup::Age75To79,
        AgeGroup::Age80To84,
        AgeGroup::Age85Plus,
    ];

    pub fn code(self) -> u8 {
        match self {
            AgeGroup::Age1To4 => 0,
            AgeGroup::Age5To9 => 1,
            AgeGroup::Age10To14 => 2,
            AgeGroup::Age15To19 => 3,
            AgeGroup::Age20To24 => 4,
            AgeGroup::Age25To29 => 5,
            AgeGroup::Age30To34 => 6,
            AgeGroup::Age35To39 => 7,
            AgeGroup::Age40To44 => 8,
            AgeGroup::Age45To49 => 9,
            AgeGroup::Age50To54 => 10,
            AgeGroup::Age55To59 => 11,
            AgeGroup::Age60To64 => 12,
            AgeGroup::Age65To69 => 13,
            AgeGroup::Age70To74 => 14,
            AgeGroup::Age75To79 => 15,
            AgeGroup::Age80To84 => 16,
            AgeGroup::Age85Plus => 17,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Age1To4 => "1-4 years",
            AgeGroup::Age5To9 => "5-9 years",
            AgeGroup::Age10To14 => "10-14 years",
            AgeGroup::Age15To19 => "15-19 years",
            AgeGroup::Age20To24 => "20-24 years",
            AgeGroup::Age25To29 => "25-29 years",
            AgeGroup::Age30To34 => "30-34 years",
            AgeGroup::Age35To39 => "35-39 years",
            AgeGroup::Age40To44 => "40-44 years",
            AgeGroup::Age45To49 => "45-49 years",
            AgeGroup::Age50To54 => "50-54 years",
            AgeGroup::Age55To59 => "55-59 years",
            AgeGroup::Age60To64 => "60-64 years",
            AgeGroup::Age65To69 => "65-69 years",
            AgeGroup::Age70To74 => "70-74 years",
            AgeGroup::Age75To79 => "75-79 years",
            AgeGroup::Age80To84 => "80-84 years",
            AgeGroup::Age85Plus => "85+ years",
        }
    }
}

// ============================================================================
// LABEL PARSING
// ============================================================================

/// Exact-match label lookup over a category's `ALL` table
fn parse_label<T: Copy>(
    field: &'static str,
    value: &str,
    all: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, EncodingError> {
    all.iter()
        .copied()
        .find(|c| label(*c) == value)
        .ok_or_else(|| EncodingError::UnmappedCategory {
            field,
            value: value.to_string(),
        })
}

impl FromStr for Sex {
    type Err = EncodingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("Sex", s, &Sex::ALL, Sex::label)
    }
}

impl FromStr for Ethnicity {
    type Err = EncodingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("Ethnicity", s, &Ethnicity::ALL, Ethnicity::label)
    }
}

impl FromStr for Race {
    type Err = EncodingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("Race", s, &Race::ALL, Race::label)
    }
}

impl FromStr for AgeGroup {
    type Err = EncodingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("AgeGroup", s, &AgeGroup::ALL, AgeGroup::label)
    }
}

/// Display and serde both go through the form label
macro_rules! label_impls {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }

            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.label())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let label = String::deserialize(deserializer)?;
                    label.parse::<$ty>().map_err(de::Error::custom)
                }
            }
        )*
    };
}

label_impls!(Sex, Ethnicity, Race, AgeGroup);

// ============================================================================
// RECORDS
// ============================================================================

/// One form submission, categories already resolved.
/// Serialized with the form's field names and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawInput {
    pub sex: Sex,
    pub year: i32,
    pub age_group: AgeGroup,
    pub ethnicity: Ethnicity,
    pub race: Race,
}

impl RawInput {
    /// Resolve text labels, e.g. as posted by the form
    pub fn from_labels(
        sex: &str,
        year: i32,
        age_group: &str,
        ethnicity: &str,
        race: &str,
    ) -> Result<Self, EncodingError> {
        Ok(Self {
            sex: sex.parse()?,
            year,
            age_group: age_group.parse()?,
            ethnicity: ethnicity.parse()?,
            race: race.parse()?,
        })
    }

    /// Resolve a name-keyed mapping (`Sex`, `Year`, `AgeGroup`, `Ethnicity`, `Race`).
    /// Key order is irrelevant; extra keys are ignored.
    pub fn from_map(inputs: &HashMap<String, String>) -> Result<Self, EncodingError> {
        let get = |key: &'static str| {
            inputs
                .get(key)
                .map(String::as_str)
                .ok_or(EncodingError::MissingField(key))
        };

        let year_text = get("Year")?;
        let year = year_text
            .trim()
            .parse::<i32>()
            .map_err(|_| EncodingError::InvalidYear(year_text.to_string()))?;

        Self::from_labels(
            get("Sex")?,
            year,
            get("AgeGroup")?,
            get("Ethnicity")?,
            get("Race")?,
        )
    }

    /// Replace each category with its code
    pub fn encode(&self) -> FeatureRow {
        FeatureRow {
            sex: self.sex.code(),
            year: self.year,
            age_group: self.age_group.code(),
            ethnicity: self.ethnicity.code(),
            race: self.race.code(),
        }
    }
}

/// Encoded record, one table row in `FEATURE_LAYOUT` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub sex: u8,
    pub year: i32,
    pub age_group: u8,
    pub ethnicity: u8,
    pub race: u8,
}

impl FeatureRow {
    /// Numeric row as `[Sex, Year, AgeGroup, Ethnicity, Race]`
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.sex),
            f64::from(self.year),
            f64::from(self.age_group),
            f64::from(self.ethnicity),
            f64::from(self.race),
        ]
    }
}

// ============================================================================
// TESTS
// ============================================================================
