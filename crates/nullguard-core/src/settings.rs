use crate::{IrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// API compatibility level the output must stay compatible with.
///
/// Ordered lexicographically by `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompatibilityLevel {
    pub major: u32,
    pub minor: u32,
}

impl CompatibilityLevel {
    /// First level at which the call mechanism performs receiver null checks
    /// for destructuring component calls.
    pub const UNIFIED_NULL_CHECKS: CompatibilityLevel = CompatibilityLevel::new(1, 4);

    pub const LATEST: CompatibilityLevel = CompatibilityLevel::new(1, 9);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn has_unified_null_checks(&self) -> bool {
        *self >= Self::UNIFIED_NULL_CHECKS
    }
}

impl Default for CompatibilityLevel {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for CompatibilityLevel {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || IrError::Config(format!("invalid compatibility level `{}`", s));

        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u32>().map_err(|_| invalid())?;
        let minor = minor.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for CompatibilityLevel {
    type Error = IrError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CompatibilityLevel> for String {
    fn from(level: CompatibilityLevel) -> Self {
        level.to_string()
    }
}

/// Which elision rule set the nullability assertion lowering applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullCheckPolicy {
    /// Drop dispatch-receiver assertions always; drop extension-receiver assertions on
    /// destructuring component calls below the unified null-check level.
    #[default]
    VersionGated,
    /// Drop dispatch-receiver assertions only, at every level.
    DispatchOnly,
}

impl fmt::Display for NullCheckPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullCheckPolicy::VersionGated => f.write_str("version-gated"),
            NullCheckPolicy::DispatchOnly => f.write_str("dispatch-only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub api_version: CompatibilityLevel,
    pub null_check_policy: NullCheckPolicy,
    /// Check IR preconditions before any pass runs.
    pub verify_ir: bool,
    /// Log every function in text form before it is lowered.
    pub dump_functions: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            api_version: CompatibilityLevel::default(),
            null_check_policy: NullCheckPolicy::default(),
            verify_ir: true,
            dump_functions: false,
        }
    }
}

impl CompilerSettings {
    pub fn with_api_version(api_version: CompatibilityLevel) -> Self {
        Self {
            api_version,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| IrError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| IrError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// Read-only, compilation-wide state handed to every pass.
#[derive(Debug, Clone, Default)]
pub struct CompilationContext {
    pub settings: CompilerSettings,
}

impl CompilationContext {
    pub fn new(settings: CompilerSettings) -> Self {
        Self { settings }
    }

    pub fn api_version(&self) -> CompatibilityLevel {
        self.settings.api_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        let v13 = CompatibilityLevel::new(1, 3);
        let v14 = CompatibilityLevel::new(1, 4);
        let v20 = CompatibilityLevel::new(2, 0);

        assert!(v13 < v14);
        assert!(v14 < v20);
        assert!(CompatibilityLevel::new(1, 10) > CompatibilityLevel::new(1, 9));
        assert!(!v13.has_unified_null_checks());
        assert!(v14.has_unified_null_checks());
        assert!(v20.has_unified_null_checks());
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(
            "1.3".parse::<CompatibilityLevel>().unwrap(),
            CompatibilityLevel::new(1, 3)
        );
        assert!("1".parse::<CompatibilityLevel>().is_err());
        assert!("1.x".parse::<CompatibilityLevel>().is_err());
        assert!("".parse::<CompatibilityLevel>().is_err());
    }

    #[test]
    fn test_settings_from_json_defaults() {
        let settings = CompilerSettings::from_json(r#"{ "api_version": "1.3" }"#).unwrap();
        assert_eq!(settings.api_version, CompatibilityLevel::new(1, 3));
        assert_eq!(settings.null_check_policy, NullCheckPolicy::VersionGated);
        assert!(settings.verify_ir);
        assert!(!settings.dump_functions);
    }

    #[test]
    fn test_settings_policy_from_json() {
        let settings =
            CompilerSettings::from_json(r#"{ "null_check_policy": "dispatch-only" }"#).unwrap();
        assert_eq!(settings.null_check_policy, NullCheckPolicy::DispatchOnly);
        assert_eq!(settings.api_version, CompatibilityLevel::LATEST);
    }

    #[test]
    fn test_settings_rejects_bad_level() {
        let err = CompilerSettings::from_json(r#"{ "api_version": "one" }"#).unwrap_err();
        assert!(matches!(err, IrError::Config(_)));
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let settings = CompilerSettings::with_api_version(CompatibilityLevel::new(1, 3));
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"1.3\""));
        assert_eq!(CompilerSettings::from_json(&json).unwrap(), settings);
    }
}
