use std::sync::Arc;

use tracing::info;

use super::domain::{EntityKind, Kpi, KpiKind, Member, NewKpi, NewMember, NewTeam, Team, TeamId};
use crate::store::{DirectoryStore, KpiQuery, MemberQuery, StoreError};

/// Validation failures rejected before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryViolation {
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },
    #[error("team {0} does not exist")]
    UnknownTeam(u64),
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error(transparent)]
    Validation(#[from] DirectoryViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Catalog management for teams, members, and KPI definitions.
pub struct DirectoryService<S> {
    store: Arc<S>,
}

impl<S> DirectoryService<S>
where
    S: DirectoryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_team(&self, team: NewTeam) -> Result<Team, DirectoryServiceError> {
        let name = required_name(&team.name, "team name")?;
        let stored = self.store.insert_team(NewTeam {
            name,
            description: trimmed_optional(team.description),
        })?;
        info!(team = %stored.name, id = stored.id.0, "team created");
        Ok(stored)
    }

    pub fn create_member(&self, member: NewMember) -> Result<Member, DirectoryServiceError> {
        let name = required_name(&member.name, "member name")?;
        if let Some(team_id) = member.team_id {
            self.store
                .team(team_id)?
                .ok_or(DirectoryViolation::UnknownTeam(team_id.0))?;
        }
        let stored = self.store.insert_member(NewMember {
            name,
            role: trimmed_optional(member.role),
            team_id: member.team_id,
            leader: member.leader,
        })?;
        info!(member = %stored.name, id = stored.id.0, "member created");
        Ok(stored)
    }

    pub fn create_kpi(&self, kpi: NewKpi) -> Result<Kpi, DirectoryServiceError> {
        let name = required_name(&kpi.name, "KPI name")?;
        let stored = self.store.insert_kpi(NewKpi {
            name,
            description: trimmed_optional(kpi.description),
            kind: kpi.kind,
        })?;
        info!(kpi = %stored.name, kind = stored.kind.label(), "KPI created");
        Ok(stored)
    }

    pub fn teams(&self, include_inactive: bool) -> Result<Vec<Team>, DirectoryServiceError> {
        self.store.teams(!include_inactive).map_err(Into::into)
    }

    pub fn members(
        &self,
        include_inactive: bool,
        team: Option<TeamId>,
    ) -> Result<Vec<Member>, DirectoryServiceError> {
        self.store
            .members(MemberQuery {
                active_only: !include_inactive,
                team,
            })
            .map_err(Into::into)
    }

    pub fn kpis(
        &self,
        include_inactive: bool,
        kind: Option<KpiKind>,
    ) -> Result<Vec<Kpi>, DirectoryServiceError> {
        self.store
            .kpis(KpiQuery {
                active_only: !include_inactive,
                kind,
            })
            .map_err(Into::into)
    }

    /// Flips the `active` flag. Historical evaluations referencing the
    /// entity are untouched.
    pub fn deactivate(&self, kind: EntityKind, id: u64) -> Result<(), DirectoryServiceError> {
        self.store.deactivate(kind, id)?;
        info!(entity = kind.label(), id, "entity deactivated");
        Ok(())
    }
}

fn required_name(raw: &str, field: &'static str) -> Result<String, DirectoryViolation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DirectoryViolation::EmptyName { field });
    }
    Ok(trimmed.to_string())
}

fn trimmed_optional(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
