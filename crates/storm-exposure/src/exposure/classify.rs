use serde::{Deserialize, Serialize};

/// Saffir-Simpson style ladder applied to wind speeds in knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormCategory {
    Depression,
    TropicalStorm,
    Category1,
    Category2,
    Category3,
    Category4,
    Category5,
}

impl StormCategory {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Depression,
            Self::TropicalStorm,
            Self::Category1,
            Self::Category2,
            Self::Category3,
            Self::Category4,
            Self::Category5,
        ]
    }

    /// Upper bounds are exclusive, so a boundary speed lands in the higher tier.
    /// `NaN` fails every comparison and falls through to `Category5`.
    pub fn from_wind_speed(knots: f64) -> Self {
        if knots < 39.0 {
            Self::Depression
        } else if knots < 74.0 {
            Self::TropicalStorm
        } else if knots < 96.0 {
            Self::Category1
        } else if knots < 111.0 {
            Self::Category2
        } else if knots < 130.0 {
            Self::Category3
        } else if knots < 157.0 {
            Self::Category4
        } else {
            Self::Category5
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Depression => "Depression",
            Self::TropicalStorm => "Tropical Storm",
            Self::Category1 => "Category 1",
            Self::Category2 => "Category 2",
            Self::Category3 => "Category 3",
            Self::Category4 => "Category 4",
            Self::Category5 => "Category 5",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Depression => "#ffffcc",
            Self::TropicalStorm => "#ffcc00",
            Self::Category1 => "#ff9900",
            Self::Category2 => "#ff6600",
            Self::Category3 => "#ff3300",
            Self::Category4 => "#cc0000",
            Self::Category5 => "#990000",
        }
    }
}

/// Risk tier derived from the probable maximum loss figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmlTier {
    High,
    Medium,
    Low,
    Unknown,
}

impl PmlTier {
    pub const HIGH_THRESHOLD: f64 = 250_000.0;
    pub const MEDIUM_THRESHOLD: f64 = 100_000.0;

    pub fn from_pml(value: f64) -> Self {
        if !value.is_finite() {
            Self::Unknown
        } else if value >= Self::HIGH_THRESHOLD {
            Self::High
        } else if value >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Accepts the filter control values (`high`, `Medium`, ...). `Unknown` is not selectable.
    pub fn from_filter_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::High => "#4A90E2",
            Self::Medium => "#7FB3F7",
            Self::Low => "#B3D9FF",
            Self::Unknown => "#E6F2FF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumAdequacy {
    Adequate,
    Inadequate,
}

impl PremiumAdequacy {
    /// Adequate when the combined losses do not exceed the premium.
    pub fn assess(non_catastrophe_loss: f64, estimated_catastrophe_loss: f64, premium: f64) -> Self {
        if non_catastrophe_loss + estimated_catastrophe_loss <= premium {
            Self::Adequate
        } else {
            Self::Inadequate
        }
    }

    pub fn from_filter_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "adequate" => Some(Self::Adequate),
            "inadequate" => Some(Self::Inadequate),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Adequate => "Adequate",
            Self::Inadequate => "Inadequate",
        }
    }
}

/// Storm nature codes found in best-track exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NatureCode {
    Disturbance,
    Tropical,
    Extratropical,
    Subtropical,
    NotReported,
    Mixture,
    Other(String),
}

impl NatureCode {
    pub fn from_code(raw: &str) -> Self {
        match raw.trim() {
            "DS" => Self::Disturbance,
            "TS" => Self::Tropical,
            "ET" => Self::Extratropical,
            "SS" => Self::Subtropical,
            "NR" => Self::NotReported,
            "MX" => Self::Mixture,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Disturbance => "DS",
            Self::Tropical => "TS",
            Self::Extratropical => "ET",
            Self::Subtropical => "SS",
            Self::NotReported => "NR",
            Self::Mixture => "MX",
            Self::Other(code) => code.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Disturbance => "Disturbance",
            Self::Tropical => "Tropical",
            Self::Extratropical => "Extratropical",
            Self::Subtropical => "Subtropical",
            Self::NotReported => "Not reported",
            Self::Mixture => "Mixture",
            Self::Other(code) => code.as_str(),
        }
    }
}

/// Human label for a nature code; unknown codes are returned as given.
pub fn nature_label(code: &str) -> &str {
    match code {
        "DS" => "Disturbance",
        "TS" => "Tropical",
        "ET" => "Extratropical",
        "SS" => "Subtropical",
        "NR" => "Not reported",
        "MX" => "Mixture",
        other => other,
    }
}
