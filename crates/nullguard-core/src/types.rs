use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IrType {
    pub classifier: String,
    pub nullable: bool,
}

impl IrType {
    pub fn named(classifier: impl Into<String>) -> Self {
        Self {
            classifier: classifier.into(),
            nullable: false,
        }
    }

    pub fn nullable(classifier: impl Into<String>) -> Self {
        Self {
            classifier: classifier.into(),
            nullable: true,
        }
    }

    pub fn unit() -> Self {
        Self::named("Unit")
    }

    pub fn boolean() -> Self {
        Self::named("Boolean")
    }

    pub fn int() -> Self {
        Self::named("Int")
    }

    pub fn string() -> Self {
        Self::named("String")
    }

    pub fn make_not_null(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            nullable: false,
        }
    }

    pub fn make_nullable(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            nullable: true,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.classifier)
        } else {
            write!(f, "{}", self.classifier)
        }
    }
}

impl std::str::FromStr for IrType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (classifier, nullable) = match s.strip_suffix('?') {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        if classifier.is_empty() || classifier.ends_with('?') {
            return Err(format!("invalid type `{}`", s));
        }

        Ok(Self {
            classifier: classifier.to_string(),
            nullable,
        })
    }
}
