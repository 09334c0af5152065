use std::collections::VecDeque;
use std::sync::Once;

use gov_core::{City, CityId, CityOptimizer, CityRegistry, PlayerId, RequestChannel, RequestId};
use gov_schema::{CmParameter, CmResult, SpecialistKind};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub const LOCAL: PlayerId = PlayerId(0);
pub const FOE: PlayerId = PlayerId(1);

pub fn registry_with(cities: Vec<City>) -> CityRegistry {
    let mut registry = CityRegistry::new();
    registry.set_local_player(Some(LOCAL));
    for city in cities {
        registry.insert(city);
    }
    registry
}

pub fn local_city(id: u32, name: &str) -> City {
    City::new(CityId(id), LOCAL, name, 5)
}

/// Optimizer double replaying a scripted sequence of results and counting
/// queries. Panics when queried past the end of its script.
#[derive(Default)]
pub struct ScriptedOptimizer {
    script: VecDeque<CmResult>,
    pub queries: u32,
}

impl ScriptedOptimizer {
    pub fn new(results: Vec<CmResult>) -> Self {
        Self {
            script: results.into(),
            queries: 0,
        }
    }

    /// Replay the same result for every query.
    pub fn repeating(result: CmResult, times: usize) -> Self {
        Self::new(vec![result; times])
    }
}

impl CityOptimizer for ScriptedOptimizer {
    fn query(&mut self, city: &City, _parameter: &CmParameter) -> CmResult {
        self.queries += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| panic!("optimizer queried {} times for city {}", self.queries, city.id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Begin,
    End,
    MakeSpecialist(CityId, usize),
    MakeWorker(CityId, usize),
    ChangeSpecialist(CityId, SpecialistKind, SpecialistKind),
    Refresh(CityId),
}

/// Connection-layer double recording every request and issuing correlation
/// ids from 1.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Vec<Sent>,
    next_id: u32,
}

impl RecordingChannel {
    fn issue(&mut self, entry: Sent) -> RequestId {
        self.sent.push(entry);
        self.next_id += 1;
        RequestId(self.next_id)
    }

    pub fn requests(&self) -> Vec<&Sent> {
        self.sent
            .iter()
            .filter(|entry| !matches!(entry, Sent::Begin | Sent::End))
            .collect()
    }
}

impl RequestChannel for RecordingChannel {
    fn begin_batch(&mut self) {
        self.sent.push(Sent::Begin);
    }

    fn end_batch(&mut self) {
        self.sent.push(Sent::End);
    }

    fn make_specialist(&mut self, city: CityId, tile: usize) -> RequestId {
        self.issue(Sent::MakeSpecialist(city, tile))
    }

    fn make_worker(&mut self, city: CityId, tile: usize) -> RequestId {
        self.issue(Sent::MakeWorker(city, tile))
    }

    fn change_specialist(
        &mut self,
        city: CityId,
        from: SpecialistKind,
        to: SpecialistKind,
    ) -> RequestId {
        self.issue(Sent::ChangeSpecialist(city, from, to))
    }

    fn refresh_city(&mut self, city: CityId) -> RequestId {
        self.issue(Sent::Refresh(city))
    }
}
