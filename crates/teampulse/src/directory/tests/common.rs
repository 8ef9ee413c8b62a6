use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::directory::domain::{
    EntityKind, Kpi, KpiId, KpiKind, Member, MemberId, NewKpi, NewMember, NewTeam, Team, TeamId,
};
use crate::directory::router::directory_router;
use crate::directory::service::DirectoryService;
use crate::store::{DirectoryStore, KpiQuery, MemberQuery, StoreError};

#[derive(Default)]
pub(super) struct MemoryDirectory {
    inner: Mutex<DirectoryInner>,
}

#[derive(Default)]
struct DirectoryInner {
    teams: HashMap<u64, Team>,
    members: HashMap<u64, Member>,
    kpis: HashMap<u64, Kpi>,
    next_team: u64,
    next_member: u64,
    next_kpi: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

impl DirectoryStore for MemoryDirectory {
    fn insert_team(&self, team: NewTeam) -> Result<Team, StoreError> {
        let mut guard = self.inner.lock().expect("directory mutex poisoned");
        let id = next(&mut guard.next_team);
        let stored = Team {
            id: TeamId(id),
            name: team.name,
            description: team.description,
            active: true,
            created_at: Utc::now().naive_utc(),
        };
        guard.teams.insert(id, stored.clone());
        Ok(stored)
    }

    fn insert_member(&self, member: NewMember) -> Result<Member, StoreError> {
        let mut guard = self.inner.lock().expect("directory mutex poisoned");
        let id = next(&mut guard.next_member);
        let stored = Member {
            id: MemberId(id),
            name: member.name,
            role: member.role,
            team_id: member.team_id,
            leader: member.leader,
            active: true,
            created_at: Utc::now().naive_utc(),
        };
        guard.members.insert(id, stored.clone());
        Ok(stored)
    }

    fn insert_kpi(&self, kpi: NewKpi) -> Result<Kpi, StoreError> {
        let mut guard = self.inner.lock().expect("directory mutex poisoned");
        let id = next(&mut guard.next_kpi);
        let stored = Kpi {
            id: KpiId(id),
            name: kpi.name,
            description: kpi.description,
            kind: kpi.kind,
            active: true,
            created_at: Utc::now().naive_utc(),
        };
        guard.kpis.insert(id, stored.clone());
        Ok(stored)
    }

    fn teams(&self, active_only: bool) -> Result<Vec<Team>, StoreError> {
        let guard = self.inner.lock().expect("directory mutex poisoned");
        let mut teams: Vec<Team> = guard
            .teams
            .values()
            .filter(|team| !active_only || team.active)
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    fn members(&self, query: MemberQuery) -> Result<Vec<Member>, StoreError> {
        let guard = self.inner.lock().expect("directory mutex poisoned");
        let mut members: Vec<Member> = guard
            .members
            .values()
            .filter(|member| !query.active_only || member.active)
            .filter(|member| query.team.is_none() || member.team_id == query.team)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    fn kpis(&self, query: KpiQuery) -> Result<Vec<Kpi>, StoreError> {
        let guard = self.inner.lock().expect("directory mutex poisoned");
        let mut kpis: Vec<Kpi> = guard
            .kpis
            .values()
            .filter(|kpi| !query.active_only || kpi.active)
            .filter(|kpi| query.kind.is_none() || Some(kpi.kind) == query.kind)
            .cloned()
            .collect();
        kpis.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(kpis)
    }

    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError> {
        let guard = self.inner.lock().expect("directory mutex poisoned");
        Ok(guard.teams.get(&id.0).cloned())
    }

    fn member(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        let guard = self.inner.lock().expect("directory mutex poisoned");
        Ok(guard.members.get(&id.0).cloned())
    }

    fn kpi(&self, id: KpiId) -> Result<Option<Kpi>, StoreError> {
        let guard = self.inner.lock().expect("directory mutex poisoned");
        Ok(guard.kpis.get(&id.0).cloned())
    }

    fn deactivate(&self, kind: EntityKind, id: u64) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().expect("directory mutex poisoned");
        let active = match kind {
            EntityKind::Team => guard.teams.get_mut(&id).map(|team| &mut team.active),
            EntityKind::Member => guard.members.get_mut(&id).map(|member| &mut member.active),
            EntityKind::Kpi => guard.kpis.get_mut(&id).map(|kpi| &mut kpi.active),
        };
        match active {
            Some(flag) => {
                *flag = false;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

/// Store that fails every call, for surfacing persistence errors.
pub(super) struct UnavailableDirectory;

impl DirectoryStore for UnavailableDirectory {
    fn insert_team(&self, _team: NewTeam) -> Result<Team, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert_member(&self, _member: NewMember) -> Result<Member, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert_kpi(&self, _kpi: NewKpi) -> Result<Kpi, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn teams(&self, _active_only: bool) -> Result<Vec<Team>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn members(&self, _query: MemberQuery) -> Result<Vec<Member>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn kpis(&self, _query: KpiQuery) -> Result<Vec<Kpi>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn team(&self, _id: TeamId) -> Result<Option<Team>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn member(&self, _id: MemberId) -> Result<Option<Member>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn kpi(&self, _id: KpiId) -> Result<Option<Kpi>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn deactivate(&self, _kind: EntityKind, _id: u64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<DirectoryService<MemoryDirectory>>, Arc<MemoryDirectory>) {
    let store = Arc::new(MemoryDirectory::default());
    let service = Arc::new(DirectoryService::new(store.clone()));
    (service, store)
}

pub(super) fn build_router() -> axum::Router {
    let (service, _) = build_service();
    directory_router(service)
}

pub(super) fn new_team(name: &str) -> NewTeam {
    NewTeam {
        name: name.to_string(),
        description: Some("Backend delivery squad".to_string()),
    }
}

pub(super) fn new_member(name: &str, team_id: Option<TeamId>) -> NewMember {
    NewMember {
        name: name.to_string(),
        role: Some("Engineer".to_string()),
        team_id,
        leader: false,
    }
}

pub(super) fn new_kpi(name: &str, kind: KpiKind) -> NewKpi {
    NewKpi {
        name: name.to_string(),
        description: None,
        kind,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
