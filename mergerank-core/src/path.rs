/// Path codec: addresses a merge-tree node by its left/right turns from the root.
///
/// The text form is a string over `{l, r}`; the root is the empty string.
/// Paths are the only handle stateless clients hold on a comparison, so they
/// round-trip through plain strings.
use std::fmt;
use std::str::FromStr;

use crate::error::RankError;
use crate::types::Side;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<Side>,
}

impl Path {
    pub fn root() -> Self {
        Path { steps: Vec::new() }
    }

    /// Path of this node's child on `side`.
    pub fn child(&self, side: Side) -> Path {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(side);
        Path { steps }
    }

    /// Path of the ancestor `depth` steps below the root.
    pub fn prefix(&self, depth: usize) -> Path {
        Path {
            steps: self.steps[..depth.min(self.steps.len())].to_vec(),
        }
    }

    pub fn steps(&self) -> &[Side] {
        &self.steps
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in &self.steps {
            write!(f, "{}", side.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .chars()
            .map(|ch| {
                Side::from_char(ch).ok_or_else(|| RankError::MalformedPath {
                    path: s.to_string(),
                    ch,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Path { steps })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
