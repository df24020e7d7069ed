//! Parameters passed to a module's `configure`.
//!
//! A `Params` value is part of the resolver's memoization key, so it is
//! ordered and hashable: the same module requested twice with equal
//! parameters probes only once.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the graphics toggle understood by composite modules.
pub const WITH_GRAPHICS: &str = "with_graphics";

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Str(String),
}

impl ParamValue {
    /// Interpret a command-line value: `true`/`false`/`yes`/`no`/`1`/`0`
    /// become booleans, anything else stays a string.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => ParamValue::Bool(true),
            "false" | "no" | "off" | "0" => ParamValue::Bool(false),
            _ => ParamValue::Str(s.to_string()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

/// Ordered parameter set.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Params(BTreeMap::new())
    }

    /// Shorthand for `{with_graphics: flag}`.
    pub fn graphics(flag: bool) -> Self {
        Params::new().with(WITH_GRAPHICS, ParamValue::Bool(flag))
    }

    pub fn with(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Boolean parameter, or `default` when absent or not a boolean.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(ParamValue::Bool(b)) => *b,
            _ => default,
        }
    }

    /// The graphics toggle; graphics are on unless explicitly disabled.
    pub fn with_graphics(&self) -> bool {
        self.flag(WITH_GRAPHICS, true)
    }

    /// Copy only the listed keys, used to forward parameters to dependencies.
    pub fn subset(&self, keys: &[String]) -> Params {
        Params(
            self.0
                .iter()
                .filter(|(k, _)| keys.iter().any(|key| key == *k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `KEY=VALUE` command-line pair.
    pub fn parse_pair(s: &str) -> Result<(String, ParamValue), String> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))?;
        if key.is_empty() {
            return Err(format!("empty parameter name in `{}`", s));
        }
        Ok((key.to_string(), ParamValue::parse(value)))
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let pairs: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_graphics_defaults_to_true() {
        assert!(Params::new().with_graphics());
        assert!(Params::graphics(true).with_graphics());
        assert!(!Params::graphics(false).with_graphics());
    }

    #[test]
    fn test_subset_forwards_only_named_keys() {
        let params = Params::graphics(false).with("flavor", ParamValue::Str("debug".into()));
        let forwarded = params.subset(&[WITH_GRAPHICS.to_string()]);

        assert_eq!(forwarded, Params::graphics(false));
        assert!(params.subset(&[]).is_empty());
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            Params::parse_pair("with_graphics=no").unwrap(),
            ("with_graphics".to_string(), ParamValue::Bool(false))
        );
        assert_eq!(
            Params::parse_pair("mode=static").unwrap().1,
            ParamValue::Str("static".to_string())
        );
        assert!(Params::parse_pair("novalue").is_err());
        assert!(Params::parse_pair("=x").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Params::new().to_string(), "");
        assert_eq!(Params::graphics(true).to_string(), "{with_graphics=true}");
    }
}
