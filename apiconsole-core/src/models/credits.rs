//! Credit balance types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Response fields that carry an authoritative balance, in lookup order.
pub const REMAINING_CREDITS_FIELDS: &[&str] = &["remainingCredits", "remaining_credits"];

/// Client-side view of the caller's credit balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsState {
    /// Last balance reported by the server.
    pub credits: Option<i64>,
    /// Owner of the balance.
    pub user_id: Option<String>,
    /// A balance fetch is in flight.
    pub loading: bool,
    /// Last balance fetch error.
    pub error: Option<String>,
}

impl CreditsState {
    /// Returns true if a balance has been received.
    pub fn has_balance(&self) -> bool {
        self.credits.is_some()
    }
}

/// Body returned by the balance endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    /// Current balance.
    #[serde(alias = "remainingCredits", alias = "remaining_credits", alias = "balance")]
    pub credits: i64,
    /// Owning user.
    #[serde(default, alias = "user_id")]
    pub user_id: Option<String>,
}

/// Extracts a numeric remaining-credits field from a response body.
///
/// Only top-level fields are inspected. Non-numeric values and fractional
/// numbers are ignored.
pub fn extract_remaining_credits(body: &Value) -> Option<i64> {
    let obj = body.as_object()?;
    REMAINING_CREDITS_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field))
        .find_map(as_whole_number)
}

/// `deserialize_with` helper for optional counts sent as `500` or `500.0`.
///
/// Missing, null, non-numeric and fractional values all become `None`.
pub(crate) fn whole_number_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_whole_number))
}

#[allow(clippy::cast_possible_truncation)]
fn as_whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_camel_case() {
        assert_eq!(extract_remaining_credits(&json!({"remainingCredits": 42})), Some(42));
    }

    #[test]
    fn test_extract_snake_case() {
        assert_eq!(extract_remaining_credits(&json!({"remaining_credits": 7})), Some(7));
    }

    #[test]
    fn test_extract_prefers_camel_case() {
        let body = json!({"remaining_credits": 1, "remainingCredits": 2});
        assert_eq!(extract_remaining_credits(&body), Some(2));
    }

    #[test]
    fn test_extract_whole_float() {
        assert_eq!(extract_remaining_credits(&json!({"remainingCredits": 500.0})), Some(500));
    }

    #[test]
    fn test_extract_ignores_non_numeric() {
        assert_eq!(extract_remaining_credits(&json!({"remainingCredits": "500"})), None);
        assert_eq!(extract_remaining_credits(&json!({"remainingCredits": null})), None);
        assert_eq!(extract_remaining_credits(&json!({"remainingCredits": 1.5})), None);
    }

    #[test]
    fn test_extract_falls_through_bad_camel_case() {
        let body = json!({"remainingCredits": "n/a", "remaining_credits": 9});
        assert_eq!(extract_remaining_credits(&body), Some(9));
    }

    #[test]
    fn test_extract_top_level_only() {
        assert_eq!(
            extract_remaining_credits(&json!({"data": {"remainingCredits": 3}})),
            None
        );
        assert_eq!(extract_remaining_credits(&json!([1, 2])), None);
    }

    #[test]
    fn test_balance_aliases() {
        let a: CreditBalance = serde_json::from_str(r#"{"credits": 10, "userId": "u1"}"#).unwrap();
        let b: CreditBalance =
            serde_json::from_str(r#"{"remaining_credits": 10, "user_id": "u1"}"#).unwrap();
        assert_eq!(a, b);
    }
}
