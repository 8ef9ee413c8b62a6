//! Directory of teams, members, and KPI definitions.
//!
//! Rows are append-only; removing an entity means flipping its `active`
//! flag so historical evaluations stay intact.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    EntityKind, Kpi, KpiId, KpiKind, Member, MemberId, NewKpi, NewMember, NewTeam, Team, TeamId,
};
pub use router::directory_router;
pub use service::{DirectoryService, DirectoryServiceError, DirectoryViolation};
