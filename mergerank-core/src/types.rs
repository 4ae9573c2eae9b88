use std::fmt;
use std::str::FromStr;

use crate::error::RankError;

/// An input record tagged with its original 1-based position.
///
/// The position is the item's identity: decisions name the two items they
/// compare by position, never by record contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item<R> {
    pub position: usize,
    pub record: R,
}

/// Which child of a merge node a decision is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Single-letter form used in paths and on the wire.
    pub fn as_char(self) -> char {
        match self {
            Side::Left => 'l',
            Side::Right => 'r',
        }
    }

    pub fn from_char(c: char) -> Option<Side> {
        match c {
            'l' => Some(Side::Left),
            'r' => Some(Side::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Side {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Side::Left),
            "r" | "right" => Ok(Side::Right),
            _ => Err(RankError::MalformedSide(s.to_string())),
        }
    }
}

/// What a judge decided about the front item of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// The chosen item ranks above the other one; it becomes the next settled
    /// element of the node.
    Sort,
    /// The chosen item is removed from the ranking.
    Strike,
    /// The chosen item is accepted outright and jumps to the accepted list.
    Pass,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Sort => "SORT",
            Command::Strike => "STRIKE",
            Command::Pass => "PASS",
        };
        f.write_str(name)
    }
}

impl FromStr for Command {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SORT" => Ok(Command::Sort),
            "STRIKE" | "SKIP" => Ok(Command::Strike),
            "PASS" => Ok(Command::Pass),
            _ => Err(RankError::MalformedCommand(s.to_string())),
        }
    }
}

/// A judge's answer to one comparison.
///
/// `left` and `right` are the positions the judge was shown; they must still
/// be the live fronts of the node's children for the decision to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub left: usize,
    pub right: usize,
    pub command: Command,
    pub side: Side,
}

impl Decision {
    /// Build a decision from untyped request fields.
    pub fn parse(left: usize, right: usize, command: &str, side: &str) -> Result<Self, RankError> {
        Ok(Decision {
            left,
            right,
            command: command.parse()?,
            side: side.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing_accepts_skip_alias() {
        assert_eq!("SORT".parse::<Command>().unwrap(), Command::Sort);
        assert_eq!("skip".parse::<Command>().unwrap(), Command::Strike);
        assert_eq!("Strike".parse::<Command>().unwrap(), Command::Strike);
        assert_eq!(" PASS ".parse::<Command>().unwrap(), Command::Pass);
        assert!(matches!(
            "MERGE".parse::<Command>(),
            Err(RankError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("l".parse::<Side>().unwrap(), Side::Left);
        assert_eq!("RIGHT".parse::<Side>().unwrap(), Side::Right);
        assert!(matches!("x".parse::<Side>(), Err(RankError::MalformedSide(_))));
        assert_eq!(Side::Left.opposite(), Side::Right);
    }

    #[test]
    fn test_decision_parse_rejects_bad_fields() {
        let d = Decision::parse(1, 2, "PASS", "r").unwrap();
        assert_eq!(d.command, Command::Pass);
        assert_eq!(d.side, Side::Right);
        assert!(Decision::parse(1, 2, "PASS", "middle").is_err());
        assert!(Decision::parse(1, 2, "", "l").is_err());
    }
}
