//! Storage abstraction so services and routers can be exercised in
//! isolation. The concrete store (relational or in-memory) lives with the
//! binary that wires the application together.

use chrono::NaiveDate;

use crate::directory::domain::{
    EntityKind, Kpi, KpiId, KpiKind, Member, MemberId, NewKpi, NewMember, NewTeam, Team, TeamId,
};
use crate::evaluations::domain::{Evaluation, EvaluationRecord, NewEvaluation};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Listing filter for members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberQuery {
    pub active_only: bool,
    pub team: Option<TeamId>,
}

/// Listing filter for KPIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiQuery {
    pub active_only: bool,
    pub kind: Option<KpiKind>,
}

/// Directory tables: teams, members, and KPI definitions. Rows are
/// append-only; `deactivate` flips the `active` flag and never deletes.
pub trait DirectoryStore: Send + Sync {
    fn insert_team(&self, team: NewTeam) -> Result<Team, StoreError>;
    fn insert_member(&self, member: NewMember) -> Result<Member, StoreError>;
    fn insert_kpi(&self, kpi: NewKpi) -> Result<Kpi, StoreError>;

    fn teams(&self, active_only: bool) -> Result<Vec<Team>, StoreError>;
    fn members(&self, query: MemberQuery) -> Result<Vec<Member>, StoreError>;
    fn kpis(&self, query: KpiQuery) -> Result<Vec<Kpi>, StoreError>;

    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError>;
    fn member(&self, id: MemberId) -> Result<Option<Member>, StoreError>;
    fn kpi(&self, id: KpiId) -> Result<Option<Kpi>, StoreError>;

    fn deactivate(&self, kind: EntityKind, id: u64) -> Result<(), StoreError>;
}

/// Fetch filter for joined evaluation rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub team: Option<TeamId>,
    pub kind: Option<KpiKind>,
}

/// Evaluation rows are append-only; no update or delete exists.
/// `evaluations` returns rows joined with member, team, and KPI names,
/// newest evaluation date first.
pub trait EvaluationStore: Send + Sync {
    fn insert_evaluation(&self, evaluation: NewEvaluation) -> Result<Evaluation, StoreError>;
    fn evaluations(&self, filter: &EvaluationFilter) -> Result<Vec<EvaluationRecord>, StoreError>;
}
