use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// Comparison applied by a single filter rule.
///
/// Operators the console does not know are kept verbatim in `Other` so a
/// filter written by a newer proxy survives a load and save unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    Other(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::Other(op) => op,
        }
    }

    /// Whether the rule needs a comparison value at all.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

impl From<String> for FilterOperator {
    fn from(op: String) -> Self {
        match op.as_str() {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "not_contains" => Self::NotContains,
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            "is_empty" => Self::IsEmpty,
            "is_not_empty" => Self::IsNotEmpty,
            _ => Self::Other(op),
        }
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        match op {
            FilterOperator::Other(op) => op,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named rule set the proxy evaluates against catalog items.
///
/// The console only displays and forwards filters; unmodelled keys are kept
/// in `extra` so they reach the backend again on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedFilter {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "default_match_all")]
    pub match_all: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<FilterRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_match_all() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_filter() {
        let json = r#"[{
            "id": "f-1",
            "name": "Recent 4K",
            "rules": [
                {"field": "ProductionYear", "operator": "greater_than", "value": "2019"},
                {"field": "Overview", "operator": "is_not_empty"}
            ]
        }]"#;

        let filters: Vec<AdvancedFilter> = serde_json::from_str(json).unwrap();
        assert_eq!(filters.len(), 1);
        let filter = &filters[0];
        assert!(filter.match_all);
        assert_eq!(filter.rules[0].operator, FilterOperator::GreaterThan);
        assert_eq!(filter.rules[1].value, None);
        assert!(!filter.rules[1].operator.takes_value());
    }

    #[test]
    fn test_unknown_operator_and_keys_survive_roundtrip() {
        let json = serde_json::json!({
            "id": "f-2",
            "name": "Regex titles",
            "match_all": false,
            "created_by": "admin",
            "rules": [
                {"field": "Name", "operator": "regex_match", "value": "^The ", "case_sensitive": true}
            ]
        });

        let filter: AdvancedFilter = serde_json::from_value(json.clone()).unwrap();
        let rule = &filter.rules[0];
        assert_eq!(rule.operator, FilterOperator::Other("regex_match".into()));
        assert!(rule.operator.takes_value());
        assert_eq!(rule.extra.get("case_sensitive"), Some(&Value::Bool(true)));
        assert_eq!(filter.extra.get("created_by"), Some(&Value::from("admin")));

        assert_eq!(serde_json::to_value(&filter).unwrap(), json);
    }

    #[test]
    fn test_known_operator_serializes_snake_case() {
        let rule: FilterRule =
            serde_json::from_str(r#"{"field": "Tags", "operator": "not_contains", "value": "Kids"}"#)
                .unwrap();
        assert_eq!(rule.operator, FilterOperator::NotContains);
        assert_eq!(
            serde_json::to_value(&rule).unwrap()["operator"],
            Value::from("not_contains")
        );
    }
}
