use chrono::{NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use teampulse::directory::domain::{
    EntityKind, Kpi, KpiId, KpiKind, Member, MemberId, NewKpi, NewMember, NewTeam, Team, TeamId,
};
use teampulse::evaluations::domain::{
    Evaluation, EvaluationId, EvaluationRecord, NewEvaluation,
};
use teampulse::store::{
    DirectoryStore, EvaluationFilter, EvaluationStore, KpiQuery, MemberQuery, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory store backing both trait surfaces. Sequential ids per table
/// and a joined fetch mirror the relational layout the traits describe.
#[derive(Default)]
pub(crate) struct InMemoryStore {
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

impl DirectoryStore for InMemoryStore {
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

impl EvaluationStore for InMemoryStore {
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

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
