use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::directory::domain::{
    EntityKind, Kpi, KpiId, KpiKind, Member, MemberId, NewKpi, NewMember, NewTeam, Team, TeamId,
};
use crate::evaluations::domain::{
    Evaluation, EvaluationBatch, EvaluationEntry, EvaluationId, EvaluationRecord, NewEvaluation,
};
use crate::evaluations::router::evaluation_router;
use crate::evaluations::scoring::Rating;
use crate::evaluations::service::EvaluationService;
use crate::store::{
    DirectoryStore, EvaluationFilter, EvaluationStore, KpiQuery, MemberQuery, StoreError,
};

/// In-memory store backing both trait surfaces, mirroring the relational
/// join the production store performs.
#[derive(Default)]
pub(super) struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    teams: HashMap<u64, Team>,
    members: HashMap<u64, Member>,
    kpis: HashMap<u64, Kpi>,
    evaluations: Vec<Evaluation>,
    next_team: u64,
    next_member: u64,
    next_kpi: u64,
    next_evaluation: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

impl DirectoryStore for MemoryStore {
    fn insert_team(&self, team: NewTeam) -> Result<Team, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
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
        let mut guard = self.inner.lock().expect("store mutex poisoned");
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
        let mut guard = self.inner.lock().expect("store mutex poisoned");
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
        let guard = self.inner.lock().expect("store mutex poisoned");
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
        let guard = self.inner.lock().expect("store mutex poisoned");
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
        let guard = self.inner.lock().expect("store mutex poisoned");
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
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.teams.get(&id.0).cloned())
    }

    fn member(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.members.get(&id.0).cloned())
    }

    fn kpi(&self, id: KpiId) -> Result<Option<Kpi>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.kpis.get(&id.0).cloned())
    }

    fn deactivate(&self, kind: EntityKind, id: u64) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
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

impl EvaluationStore for MemoryStore {
    fn insert_evaluation(&self, evaluation: NewEvaluation) -> Result<Evaluation, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        let id = next(&mut guard.next_evaluation);
        let stored = Evaluation {
            id: EvaluationId(id),
            member_id: evaluation.member_id,
            kpi_id: evaluation.kpi_id,
            rating: evaluation.rating,
            quant_value: evaluation.quant_value,
            comment: evaluation.comment,
            evaluated_on: evaluation.evaluated_on,
            evaluator: evaluation.evaluator,
            created_at: Utc::now().naive_utc(),
        };
        guard.evaluations.push(stored.clone());
        Ok(stored)
    }

    fn evaluations(&self, filter: &EvaluationFilter) -> Result<Vec<EvaluationRecord>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        let mut records = Vec::new();

        for evaluation in &guard.evaluations {
            let Some(member) = guard.members.get(&evaluation.member_id.0) else {
                continue;
            };
            let Some(kpi) = guard.kpis.get(&evaluation.kpi_id.0) else {
                continue;
            };
            let team = member.team_id.and_then(|id| guard.teams.get(&id.0));

            if filter
                .from
                .is_some_and(|from| evaluation.evaluated_on < from)
            {
                continue;
            }
            if filter.to.is_some_and(|to| evaluation.evaluated_on > to) {
                continue;
            }
            if filter.team.is_some() && member.team_id != filter.team {
                continue;
            }
            if filter.kind.is_some_and(|kind| kpi.kind != kind) {
                continue;
            }

            records.push(EvaluationRecord {
                id: evaluation.id,
                member_id: member.id,
                member_name: member.name.clone(),
                team_id: member.team_id,
                team_name: team.map(|team| team.name.clone()),
                kpi_id: kpi.id,
                kpi_name: kpi.name.clone(),
                kpi_kind: kpi.kind,
                rating: evaluation.rating,
                quant_value: evaluation.quant_value,
                comment: evaluation.comment.clone(),
                evaluated_on: evaluation.evaluated_on,
                evaluator: evaluation.evaluator.clone(),
            });
        }

        records.sort_by(|a, b| b.evaluated_on.cmp(&a.evaluated_on));
        Ok(records)
    }
}

/// Wrapper that lets a fixed number of inserts through, then fails, for
/// exercising the non-transactional batch loop.
pub(super) struct FlakyEvaluationStore {
    pub(super) inner: Arc<MemoryStore>,
    budget: AtomicUsize,
}

impl FlakyEvaluationStore {
    pub(super) fn failing_after(inner: Arc<MemoryStore>, successes: usize) -> Self {
        Self {
            inner,
            budget: AtomicUsize::new(successes),
        }
    }
}

impl DirectoryStore for FlakyEvaluationStore {
    fn insert_team(&self, team: NewTeam) -> Result<Team, StoreError> {
        self.inner.insert_team(team)
    }

    fn insert_member(&self, member: NewMember) -> Result<Member, StoreError> {
        self.inner.insert_member(member)
    }

    fn insert_kpi(&self, kpi: NewKpi) -> Result<Kpi, StoreError> {
        self.inner.insert_kpi(kpi)
    }

    fn teams(&self, active_only: bool) -> Result<Vec<Team>, StoreError> {
        self.inner.teams(active_only)
    }

    fn members(&self, query: MemberQuery) -> Result<Vec<Member>, StoreError> {
        self.inner.members(query)
    }

    fn kpis(&self, query: KpiQuery) -> Result<Vec<Kpi>, StoreError> {
        self.inner.kpis(query)
    }

    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError> {
        self.inner.team(id)
    }

    fn member(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        self.inner.member(id)
    }

    fn kpi(&self, id: KpiId) -> Result<Option<Kpi>, StoreError> {
        self.inner.kpi(id)
    }

    fn deactivate(&self, kind: EntityKind, id: u64) -> Result<(), StoreError> {
        self.inner.deactivate(kind, id)
    }
}

impl EvaluationStore for FlakyEvaluationStore {
    fn insert_evaluation(&self, evaluation: NewEvaluation) -> Result<Evaluation, StoreError> {
        let remaining = self.budget.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(StoreError::Unavailable("connection dropped".to_string()));
        }
        self.budget.store(remaining - 1, Ordering::SeqCst);
        self.inner.insert_evaluation(evaluation)
    }

    fn evaluations(&self, filter: &EvaluationFilter) -> Result<Vec<EvaluationRecord>, StoreError> {
        self.inner.evaluations(filter)
    }
}

/// Seeded directory used across the evaluation tests: one team, two
/// members (one teamless), one KPI of each kind.
pub(super) struct Fixture {
    pub(super) store: Arc<MemoryStore>,
    pub(super) team: Team,
    pub(super) ana: Member,
    pub(super) bruno: Member,
    pub(super) collaboration: Kpi,
    pub(super) sprint_goals: Kpi,
}

pub(super) fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::default());

    let team = store
        .insert_team(NewTeam {
            name: "Platform".to_string(),
            description: None,
        })
        .expect("team");
    let ana = store
        .insert_member(NewMember {
            name: "Ana Torres".to_string(),
            role: Some("Tech Lead".to_string()),
            team_id: Some(team.id),
            leader: true,
        })
        .expect("member");
    let bruno = store
        .insert_member(NewMember {
            name: "Bruno Silva".to_string(),
            role: Some("Engineer".to_string()),
            team_id: None,
            leader: false,
        })
        .expect("member");
    let collaboration = store
        .insert_kpi(NewKpi {
            name: "Collaboration".to_string(),
            description: None,
            kind: KpiKind::Qualitative,
        })
        .expect("kpi");
    let sprint_goals = store
        .insert_kpi(NewKpi {
            name: "Sprint Goals".to_string(),
            description: None,
            kind: KpiKind::Quantitative,
        })
        .expect("kpi");

    Fixture {
        store,
        team,
        ana,
        bruno,
        collaboration,
        sprint_goals,
    }
}

pub(super) fn eval_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date")
}

pub(super) fn rating(value: u8) -> Rating {
    Rating::new(value).expect("valid rating")
}

pub(super) fn batch_for(fixture: &Fixture) -> EvaluationBatch {
    EvaluationBatch {
        member_id: fixture.ana.id,
        evaluated_on: eval_date(),
        evaluator: "Lead".to_string(),
        entries: vec![
            EvaluationEntry {
                kpi_id: fixture.collaboration.id,
                rating: rating(1),
                quant_value: None,
                comment: Some("Carried the retro".to_string()),
            },
            EvaluationEntry {
                kpi_id: fixture.sprint_goals.id,
                rating: rating(2),
                quant_value: Some(82.0),
                comment: None,
            },
        ],
    }
}

pub(super) fn service_over(
    store: Arc<MemoryStore>,
) -> Arc<EvaluationService<MemoryStore>> {
    Arc::new(EvaluationService::new(store))
}

pub(super) fn router_over(store: Arc<MemoryStore>) -> axum::Router {
    evaluation_router(service_over(store))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
