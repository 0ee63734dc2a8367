//! Casting and targeting descriptors.
//!
//! These describe *what* a skill wants affected; evaluating them against
//! live world state (spatial queries, line of sight) is the world
//! collaborator's job.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What kind of primary target the skill wants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    /// No target (area anchored on the caster's position).
    #[default]
    None,
    /// The caster itself.
    Caster,
    /// The caster's currently selected target.
    Target,
    /// A ground location.
    Ground,
    /// The selected target, which must be hostile.
    Enemy,
    /// The selected target, which must be friendly.
    Ally,
}

impl FromStr for TargetType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(TargetType::None),
            "caster" => Ok(TargetType::Caster),
            "target" => Ok(TargetType::Target),
            "ground" => Ok(TargetType::Ground),
            "enemy" => Ok(TargetType::Enemy),
            "ally" => Ok(TargetType::Ally),
            _ => Err(()),
        }
    }
}

/// Area shape used to expand the primary target into an affected set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffectScope {
    /// Only the primary target.
    #[default]
    Single,
    /// Everything at the target point.
    Point,
    /// A radius around the target.
    Range,
    /// A fan in front of the caster, see [`FanRange`].
    Fan,
    /// A square area around the target.
    Square,
    /// The target's party.
    Party,
}

impl FromStr for AffectScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(AffectScope::Single),
            "point" => Ok(AffectScope::Point),
            "range" => Ok(AffectScope::Range),
            "fan" => Ok(AffectScope::Fan),
            "square" => Ok(AffectScope::Square),
            "party" => Ok(AffectScope::Party),
            _ => Err(()),
        }
    }
}

/// Which objects inside the area shape are eligible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffectObject {
    /// Every actor in the area.
    #[default]
    All,
    /// Friendly actors only.
    Friend,
    /// Hostile actors only.
    NotFriend,
}

impl FromStr for AffectObject {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(AffectObject::All),
            "friend" => Ok(AffectObject::Friend),
            "not-friend" => Ok(AffectObject::NotFriend),
            _ => Err(()),
        }
    }
}

/// Fan area parameters for [`AffectScope::Fan`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanRange {
    /// Angle offset from the caster's heading, in degrees.
    pub start_angle: i32,
    /// Fan radius.
    pub radius: i32,
    /// Fan opening angle, in degrees.
    pub angle: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case_spellings() {
        assert_eq!("not-friend".parse(), Ok(AffectObject::NotFriend));
        assert_eq!("fan".parse(), Ok(AffectScope::Fan));
        assert!("party-pledge".parse::<AffectScope>().is_err());
    }
}
