use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for teams.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TeamId(pub u64);

/// Identifier wrapper for team members.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MemberId(pub u64);

/// Identifier wrapper for KPI definitions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct KpiId(pub u64);

/// Whether a KPI is rated on judgment alone or carries an objective
/// completion percentage alongside the rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKind {
    Qualitative,
    Quantitative,
}

impl KpiKind {
    pub const fn label(self) -> &'static str {
        match self {
            KpiKind::Qualitative => "qualitative",
            KpiKind::Quantitative => "quantitative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub role: Option<String>,
    pub team_id: Option<TeamId>,
    pub leader: bool,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub id: KpiId,
    pub name: String,
    pub description: Option<String>,
    pub kind: KpiKind,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Creation payload accepted by the team endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Creation payload accepted by the member endpoint. A member belongs to
/// at most one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub leader: bool,
}

/// Creation payload accepted by the KPI endpoint. `kind` is fixed at
/// creation; no mutation surface exists once evaluations reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewKpi {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: KpiKind,
}

/// Soft-deletable directory entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Member,
    Kpi,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Team => "team",
            EntityKind::Member => "member",
            EntityKind::Kpi => "kpi",
        }
    }

    /// Parses the path segment used by the deactivation endpoint.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "team" | "teams" => Some(Self::Team),
            "member" | "members" => Some(Self::Member),
            "kpi" | "kpis" => Some(Self::Kpi),
            _ => None,
        }
    }
}
