//! Subscription tiers and the capability matrix they grant.
//!
//! [`capabilities_for`] is a pure, total mapping from tier to what that tier
//! may author. Tiers are ordered (`free < pro < premium < admin`) so a
//! "requires at least" check is a single comparison.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::QuestionType;

/// Subscription level of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Premium,
    Admin,
}

impl SubscriptionTier {
    /// Every tier, lowest first.
    pub const ALL: [SubscriptionTier; 4] = [
        SubscriptionTier::Free,
        SubscriptionTier::Pro,
        SubscriptionTier::Premium,
        SubscriptionTier::Admin,
    ];

    /// Ordinal rank; higher ranks include everything lower ranks can do.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Whether this tier is `required` or above.
    pub fn is_at_least(self, required: SubscriptionTier) -> bool {
        self.rank() >= required.rank()
    }

    /// Marketing name of the plan.
    pub fn plan_name(self) -> &'static str {
        match self {
            SubscriptionTier::Free => "Free",
            SubscriptionTier::Pro => "Pro",
            SubscriptionTier::Premium => "Premium",
            SubscriptionTier::Admin => "Admin",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "free"),
            SubscriptionTier::Pro => write!(f, "pro"),
            SubscriptionTier::Premium => write!(f, "premium"),
            SubscriptionTier::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "pro" => Ok(SubscriptionTier::Pro),
            "premium" => Ok(SubscriptionTier::Premium),
            "admin" => Ok(SubscriptionTier::Admin),
            other => Err(format!("unknown subscription tier: {other}")),
        }
    }
}

/// What a given tier may author and share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMatrix {
    pub tier: SubscriptionTier,
    /// Question ceiling per quiz; `None` means unbounded.
    pub max_questions_per_quiz: Option<usize>,
    pub allowed_question_types: BTreeSet<QuestionType>,
    /// Whether quizzes may be shared beyond direct followers.
    pub can_share_beyond_followers: bool,
    pub can_create_communities: bool,
    /// Points, badges and achievements.
    pub has_gamification: bool,
    pub has_analytics: bool,
    pub has_template_access: bool,
    pub has_custom_branding: bool,
    pub storage_limit_mb: u32,
}

impl CapabilityMatrix {
    pub fn allows(&self, question_type: QuestionType) -> bool {
        self.allowed_question_types.contains(&question_type)
    }

    /// Question types this tier may not author.
    pub fn restricted_question_types(&self) -> BTreeSet<QuestionType> {
        QuestionType::ALL
            .into_iter()
            .filter(|t| !self.allows(*t))
            .collect()
    }

    /// Whether a quiz with `count` questions fits under the ceiling.
    pub fn permits_question_count(&self, count: usize) -> bool {
        self.max_questions_per_quiz.map_or(true, |max| count <= max)
    }
}

const BASIC_TYPES: [QuestionType; 2] = [QuestionType::MultipleChoice, QuestionType::TrueFalse];

/// The capability matrix for `tier`.
pub fn capabilities_for(tier: SubscriptionTier) -> CapabilityMatrix {
    let all_types: BTreeSet<QuestionType> = QuestionType::ALL.into_iter().collect();

    match tier {
        SubscriptionTier::Free => CapabilityMatrix {
            tier,
            max_questions_per_quiz: Some(20),
            allowed_question_types: BASIC_TYPES.into_iter().collect(),
            can_share_beyond_followers: false,
            can_create_communities: false,
            has_gamification: false,
            has_analytics: false,
            has_template_access: false,
            has_custom_branding: false,
            storage_limit_mb: 100,
        },
        SubscriptionTier::Pro => CapabilityMatrix {
            tier,
            max_questions_per_quiz: Some(50),
            allowed_question_types: all_types,
            can_share_beyond_followers: true,
            can_create_communities: false,
            has_gamification: true,
            has_analytics: true,
            has_template_access: true,
            has_custom_branding: false,
            storage_limit_mb: 1_000,
        },
        SubscriptionTier::Premium | SubscriptionTier::Admin => CapabilityMatrix {
            tier,
            max_questions_per_quiz: None,
            allowed_question_types: all_types,
            can_share_beyond_followers: true,
            can_create_communities: true,
            has_gamification: true,
            has_analytics: true,
            has_template_access: true,
            has_custom_branding: true,
            storage_limit_mb: 10_000,
        },
    }
}

/// Question types `tier` may author.
pub fn allowed_question_types(tier: SubscriptionTier) -> BTreeSet<QuestionType> {
    capabilities_for(tier).allowed_question_types
}

/// Question types `tier` may not author; the complement of
/// [`allowed_question_types`].
pub fn restricted_question_types(tier: SubscriptionTier) -> BTreeSet<QuestionType> {
    capabilities_for(tier).restricted_question_types()
}

/// The lowest tier allowed to author `question_type`.
pub fn minimum_tier_for(question_type: QuestionType) -> SubscriptionTier {
    SubscriptionTier::ALL
        .into_iter()
        .find(|tier| capabilities_for(*tier).allows(question_type))
        .unwrap_or(SubscriptionTier::Admin)
}

/// Message shown when a feature needs a higher plan.
pub fn upgrade_message(feature: &str, required: SubscriptionTier) -> String {
    format!(
        "{feature} is available with {} subscription. Upgrade to unlock this feature!",
        required.plan_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_by_rank() {
        assert!(SubscriptionTier::Free < SubscriptionTier::Pro);
        assert!(SubscriptionTier::Pro < SubscriptionTier::Premium);
        assert!(SubscriptionTier::Premium < SubscriptionTier::Admin);
        assert!(SubscriptionTier::Premium.is_at_least(SubscriptionTier::Pro));
        assert!(SubscriptionTier::Pro.is_at_least(SubscriptionTier::Pro));
        assert!(!SubscriptionTier::Free.is_at_least(SubscriptionTier::Pro));
    }

    #[test]
    fn tier_display_and_parse() {
        assert_eq!(SubscriptionTier::Premium.to_string(), "premium");
        assert_eq!(
            "PRO".parse::<SubscriptionTier>().unwrap(),
            SubscriptionTier::Pro
        );
        assert!("gold".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn allowed_and_restricted_partition_every_tier() {
        let all: BTreeSet<QuestionType> = QuestionType::ALL.into_iter().collect();
        for tier in SubscriptionTier::ALL {
            let allowed = allowed_question_types(tier);
            let restricted = restricted_question_types(tier);
            assert!(
                allowed.is_disjoint(&restricted),
                "overlap for {tier}: {allowed:?} / {restricted:?}"
            );
            let union: BTreeSet<_> = allowed.union(&restricted).copied().collect();
            assert_eq!(union, all, "gap for {tier}");
        }
    }

    #[test]
    fn free_tier_is_limited_to_basic_types() {
        let caps = capabilities_for(SubscriptionTier::Free);
        assert_eq!(caps.max_questions_per_quiz, Some(20));
        assert!(caps.allows(QuestionType::MultipleChoice));
        assert!(caps.allows(QuestionType::TrueFalse));
        assert!(!caps.allows(QuestionType::Matching));
        assert!(!caps.can_share_beyond_followers);
        assert_eq!(caps.restricted_question_types().len(), 4);
    }

    #[test]
    fn question_ceiling_per_tier() {
        assert!(capabilities_for(SubscriptionTier::Pro).permits_question_count(50));
        assert!(!capabilities_for(SubscriptionTier::Pro).permits_question_count(51));
        assert!(capabilities_for(SubscriptionTier::Premium).permits_question_count(10_000));
        assert!(capabilities_for(SubscriptionTier::Admin).permits_question_count(usize::MAX));
    }

    #[test]
    fn minimum_tier_per_question_type() {
        assert_eq!(
            minimum_tier_for(QuestionType::TrueFalse),
            SubscriptionTier::Free
        );
        assert_eq!(minimum_tier_for(QuestionType::Essay), SubscriptionTier::Pro);
    }

    #[test]
    fn upgrade_message_names_plan() {
        let msg = upgrade_message("Matching questions", SubscriptionTier::Pro);
        assert_eq!(
            msg,
            "Matching questions is available with Pro subscription. Upgrade to unlock this feature!"
        );
    }
}
