//! Skill classification and abnormal-status enums.
//!
//! Documents spell these in kebab-case (`action="channeling"`); each enum
//! implements `FromStr` accordingly. Unknown spellings are parse errors
//! that skip the declaration they appear on.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a skill operates when triggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperateType {
    /// One-shot active skill.
    #[default]
    Active,
    /// Continuous skill re-applied on a tick schedule until stopped.
    Channeling,
    /// Always-on skill with no cast.
    Passive,
    /// Self-sustained on/off skill.
    Toggle,
}

impl OperateType {
    /// Whether triggering this skill opens a channeling session.
    #[must_use]
    pub fn is_channeling(self) -> bool {
        matches!(self, OperateType::Channeling)
    }

    /// Whether the skill is a toggle.
    #[must_use]
    pub fn is_toggle(self) -> bool {
        matches!(self, OperateType::Toggle)
    }
}

impl FromStr for OperateType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OperateType::Active),
            "channeling" => Ok(OperateType::Channeling),
            "passive" => Ok(OperateType::Passive),
            "toggle" => Ok(OperateType::Toggle),
            _ => Err(()),
        }
    }
}

/// Ability type tag - how the skill's power is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillType {
    /// Physical ability.
    #[default]
    Physical,
    /// Magical ability.
    Magic,
    /// Fixed-outcome ability (no attack calculation).
    Static,
}

impl FromStr for SkillType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(SkillType::Physical),
            "magic" => Ok(SkillType::Magic),
            "static" => Ok(SkillType::Static),
            _ => Err(()),
        }
    }
}

/// Abnormal status category applied by a skill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbnormalType {
    /// No abnormal status.
    #[default]
    None,
    Stun,
    Root,
    Sleep,
    Silence,
    Paralyze,
    Poison,
    Bleed,
    Slow,
}

impl FromStr for AbnormalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AbnormalType::None),
            "stun" => Ok(AbnormalType::Stun),
            "root" => Ok(AbnormalType::Root),
            "sleep" => Ok(AbnormalType::Sleep),
            "silence" => Ok(AbnormalType::Silence),
            "paralyze" => Ok(AbnormalType::Paralyze),
            "poison" => Ok(AbnormalType::Poison),
            "bleed" => Ok(AbnormalType::Bleed),
            "slow" => Ok(AbnormalType::Slow),
            _ => Err(()),
        }
    }
}

/// Visual effect shown while an abnormal status is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbnormalVisual {
    /// No visual.
    #[default]
    None,
    StunStars,
    RootVines,
    SleepCloud,
    PoisonHaze,
    BleedMist,
    FrostAura,
}

impl FromStr for AbnormalVisual {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AbnormalVisual::None),
            "stun-stars" => Ok(AbnormalVisual::StunStars),
            "root-vines" => Ok(AbnormalVisual::RootVines),
            "sleep-cloud" => Ok(AbnormalVisual::SleepCloud),
            "poison-haze" => Ok(AbnormalVisual::PoisonHaze),
            "bleed-mist" => Ok(AbnormalVisual::BleedMist),
            "frost-aura" => Ok(AbnormalVisual::FrostAura),
            _ => Err(()),
        }
    }
}

/// Ammunition-equivalent charge consumed per validated channeling target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    /// Physical charge.
    Soul,
    /// Magical charge.
    Spirit,
}

impl FromStr for ShotKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soul" => Ok(ShotKind::Soul),
            "spirit" => Ok(ShotKind::Spirit),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case_spellings() {
        assert_eq!("channeling".parse(), Ok(OperateType::Channeling));
        assert_eq!("stun-stars".parse(), Ok(AbnormalVisual::StunStars));
        assert!("Channeling".parse::<OperateType>().is_err());
    }

    #[test]
    fn test_channeling_classification() {
        assert!(OperateType::Channeling.is_channeling());
        assert!(!OperateType::Toggle.is_channeling());
        assert!(OperateType::Toggle.is_toggle());
    }
}
