//! Analysis domain models.
//!
//! - Module categories
//! - Price history handed to modules through the context
//! - The uniform result every module returns

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Result;

// =============================================================================
// Module Category
// =============================================================================

/// Groups of analysis modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleCategory {
    /// Broad market state (indices, breadth)
    Market,
    /// A single tradable underlying and its derivatives
    Asset,
    Macro,
    Sentiment,
}

impl ModuleCategory {
    /// Returns the string representation of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleCategory::Market => "MARKET",
            ModuleCategory::Asset => "ASSET",
            ModuleCategory::Macro => "MACRO",
            ModuleCategory::Sentiment => "SENTIMENT",
        }
    }
}

impl std::fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Price History
// =============================================================================

/// Inclusive date range of the price history under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, swapping the bounds if given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }
}

/// One daily bar of price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    #[serde(default)]
    pub volume: Decimal,
}

// =============================================================================
// Analysis Result
// =============================================================================

/// Uniform result of one module run.
///
/// A failed run carries `success = false`, an empty `data` map and the error
/// message. Failures never escape a module as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Identifier of the module that produced this result
    pub module: String,

    pub success: bool,

    pub data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the run was requested
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn success(
        module: impl Into<String>,
        data: Map<String, Value>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            module: module.into(),
            success: true,
            data,
            error: None,
            timestamp,
        }
    }

    pub fn failure(module: impl Into<String>, error: impl Display, timestamp: DateTime<Utc>) -> Self {
        Self {
            module: module.into(),
            success: false,
            data: Map::new(),
            error: Some(error.to_string()),
            timestamp,
        }
    }

    /// Converts a module outcome into a result, logging failures.
    pub fn from_outcome(
        module: &str,
        outcome: Result<Map<String, Value>>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        match outcome {
            Ok(data) => Self::success(module, data, timestamp),
            Err(e) => {
                warn!("Analysis module {} failed: {}", module, e);
                Self::failure(module, e, timestamp)
            }
        }
    }
}

/// Serializes a report into the `data` map of a result.
pub(crate) fn into_data<T: Serialize>(report: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(report)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 4, 30, 0).unwrap()
    }

    #[test]
    fn test_failure_has_empty_data() {
        let result = AnalysisResult::from_outcome(
            "options",
            Err(Error::MissingConfigKey("UPSTOX_ACCESS_TOKEN".to_string())),
            ts(),
        );
        assert!(!result.success);
        assert!(result.data.is_empty());
        assert_eq!(
            result.error.as_deref(),
            Some("Missing configuration key: UPSTOX_ACCESS_TOKEN")
        );
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let mut data = Map::new();
        data.insert("spotPrice".to_string(), Value::from(24500));
        let json = serde_json::to_value(AnalysisResult::success("basis", data, ts())).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["spotPrice"], 24500);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_date_range_orders_bounds() {
        let a = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let range = DateRange::new(a, b);
        assert_eq!(range.start, b);
        assert_eq!(range.end, a);
    }

    #[test]
    fn test_into_data_wraps_scalars() {
        let data = into_data(&42).unwrap();
        assert_eq!(data["value"], 42);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ModuleCategory::Asset.to_string(), "ASSET");
    }
}
