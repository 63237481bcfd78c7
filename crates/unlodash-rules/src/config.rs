//! Rule configuration.

use serde::{Deserialize, Serialize};

/// Names the rule matches and produces.
///
/// Deserialized from the `unlodash.json` config file with camelCase keys;
/// missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleConfig {
    /// Local identifier bound to the utility library.
    pub alias_name: String,
    /// Method called on the alias.
    pub map_method_name: String,
    /// Native array method emitted in its place.
    pub native_method_name: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            alias_name: "_".to_string(),
            map_method_name: "map".to_string(),
            native_method_name: "map".to_string(),
        }
    }
}

impl RuleConfig {
    /// `<alias>.<method>`, as written at a call site.
    pub fn qualified_method(&self) -> String {
        format!("{}.{}", self.alias_name, self.map_method_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: RuleConfig = serde_json::from_str(r#"{ "aliasName": "lodash" }"#).unwrap();
        assert_eq!(config.alias_name, "lodash");
        assert_eq!(config.map_method_name, "map");
        assert_eq!(config.native_method_name, "map");
        assert_eq!(config.qualified_method(), "lodash.map");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&RuleConfig::default()).unwrap();
        assert_eq!(
            json,
            r#"{"aliasName":"_","mapMethodName":"map","nativeMethodName":"map"}"#
        );
    }
}
