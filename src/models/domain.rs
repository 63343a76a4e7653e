use crate::error::MatchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Preferred mode of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelStyle {
    Adventure,
    Relaxation,
    Cultural,
    Budget,
    Luxury,
    Solo,
    Group,
}

impl TravelStyle {
    pub const ALL: [TravelStyle; 7] = [
        TravelStyle::Adventure,
        TravelStyle::Relaxation,
        TravelStyle::Cultural,
        TravelStyle::Budget,
        TravelStyle::Luxury,
        TravelStyle::Solo,
        TravelStyle::Group,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelStyle::Adventure => "adventure",
            TravelStyle::Relaxation => "relaxation",
            TravelStyle::Cultural => "cultural",
            TravelStyle::Budget => "budget",
            TravelStyle::Luxury => "luxury",
            TravelStyle::Solo => "solo",
            TravelStyle::Group => "group",
        }
    }

    /// Styles that earn the partial style bonus when paired with this one
    pub fn partially_compatible(&self) -> &'static [TravelStyle] {
        use TravelStyle::*;
        match self {
            Adventure => &[Cultural, Solo],
            Relaxation => &[Luxury, Group],
            Cultural => &[Adventure, Budget],
            Budget => &[Cultural, Solo, Group],
            Luxury => &[Relaxation],
            Solo => &[Adventure, Budget],
            Group => &[Relaxation, Budget],
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelStyle {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelStyle::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| MatchError::InvalidProfile(format!("unknown travel style '{}'", s)))
    }
}

/// Ordered trust tier of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    EmailVerified,
    IdVerified,
    FullyVerified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::EmailVerified => "email_verified",
            VerificationStatus::IdVerified => "id_verified",
            VerificationStatus::FullyVerified => "fully_verified",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(VerificationStatus::Unverified),
            "email_verified" => Ok(VerificationStatus::EmailVerified),
            "id_verified" => Ok(VerificationStatus::IdVerified),
            "fully_verified" => Ok(VerificationStatus::FullyVerified),
            other => Err(MatchError::InvalidProfile(format!(
                "unknown verification status '{}'",
                other
            ))),
        }
    }
}

/// Traveler profile attributes used for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(rename = "travelStyle")]
    pub travel_style: TravelStyle,
    #[serde(default)]
    pub languages: BTreeSet<String>,
    #[serde(rename = "verificationStatus")]
    pub verification_status: VerificationStatus,
}

/// Profile row as stored by the profile backend, before enum validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub travel_style: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "default_verification")]
    pub verification_status: String,
}

fn default_verification() -> String {
    "unverified".to_string()
}

impl TryFrom<ProfileRecord> for UserProfile {
    type Error = MatchError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let tag = |e: MatchError| match e {
            MatchError::InvalidProfile(msg) => {
                MatchError::InvalidProfile(format!("profile {}: {}", record.id, msg))
            }
            other => other,
        };
        let travel_style = record.travel_style.parse().map_err(tag)?;
        let verification_status = record.verification_status.parse().map_err(tag)?;

        Ok(UserProfile {
            user_id: record.id,
            name: record.name,
            interests: record.interests.into_iter().collect(),
            travel_style,
            languages: record.languages.into_iter().collect(),
            verification_status,
        })
    }
}

/// Status of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Declined,
    Connected,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Declined => "declined",
            MatchStatus::Connected => "connected",
        }
    }

    /// Whether `next` is reachable from this status in one step
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        matches!(
            (self, next),
            (MatchStatus::Pending, MatchStatus::Accepted)
                | (MatchStatus::Pending, MatchStatus::Declined)
                | (MatchStatus::Accepted, MatchStatus::Connected)
        )
    }

    /// Every status except declined counts as live
    pub fn is_live(&self) -> bool {
        *self != MatchStatus::Declined
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored pairing between a viewer and a candidate traveler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    #[serde(rename = "viewerId")]
    pub viewer_id: String,
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(rename = "compatibilityScore")]
    pub score: u8,
    #[serde(rename = "sharedInterests")]
    pub shared_interests: BTreeSet<String>,
    pub status: MatchStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Build a fresh pending match from a computed compatibility
    pub fn pending(
        viewer_id: &str,
        candidate_id: &str,
        compatibility: Compatibility,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            viewer_id: viewer_id.to_string(),
            candidate_id: candidate_id.to_string(),
            score: compatibility.score,
            shared_interests: compatibility.shared_interests,
            status: MatchStatus::Pending,
            created_at,
        }
    }
}

/// Output of the compatibility scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub score: u8,
    #[serde(rename = "sharedInterests")]
    pub shared_interests: BTreeSet<String>,
}

/// Optional discovery filters, applied conjunctively
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchFilters {
    #[serde(rename = "minCompatibility", default)]
    pub min_compatibility: Option<u8>,
    #[serde(rename = "travelStyles", default)]
    pub travel_styles: Option<BTreeSet<TravelStyle>>,
    #[serde(default)]
    pub interests: Option<BTreeSet<String>>,
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub interests: f64,
    pub style_exact: f64,
    pub style_partial: f64,
    pub language_per_shared: f64,
    pub language_cap: f64,
    pub fully_verified: f64,
    pub id_verified: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            interests: 40.0,
            style_exact: 30.0,
            style_partial: 15.0,
            language_per_shared: 10.0,
            language_cap: 20.0,
            fully_verified: 10.0,
            id_verified: 5.0,
        }
    }
}
