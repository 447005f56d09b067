//! Vertex attribute semantics.

use std::fmt;
use std::str::FromStr;

/// A parsed primitive attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
    /// Application-specific attribute, stored with its leading underscore.
    Custom(String),
}

impl Semantic {
    /// Parse an attribute name. Returns `None` for names outside glTF's set
    /// that also lack the `_` prefix reserved for applications.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "POSITION" => return Some(Self::Position),
            "NORMAL" => return Some(Self::Normal),
            "TANGENT" => return Some(Self::Tangent),
            _ => {}
        }
        if name.starts_with('_') {
            return Some(Self::Custom(name.to_string()));
        }
        let (prefix, set) = name.rsplit_once('_')?;
        let set: u32 = set.parse().ok()?;
        match prefix {
            "TEXCOORD" => Some(Self::TexCoord(set)),
            "COLOR" => Some(Self::Color(set)),
            "JOINTS" => Some(Self::Joints(set)),
            "WEIGHTS" => Some(Self::Weights(set)),
            _ => None,
        }
    }
}

impl FromStr for Semantic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown attribute semantic '{}'", s))
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("POSITION"),
            Self::Normal => f.write_str("NORMAL"),
            Self::Tangent => f.write_str("TANGENT"),
            Self::TexCoord(n) => write!(f, "TEXCOORD_{}", n),
            Self::Color(n) => write!(f, "COLOR_{}", n),
            Self::Joints(n) => write!(f, "JOINTS_{}", n),
            Self::Weights(n) => write!(f, "WEIGHTS_{}", n),
            Self::Custom(name) => f.write_str(name),
        }
    }
}
