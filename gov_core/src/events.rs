use crate::city::{CityId, CityRegistry};

/// One-way notifications emitted by the governor for the UI layer to drain.
///
/// The two city events are the only user-visible failure surfaces the
/// governor has; both are non-modal event-log entries tied to the city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernorEvent {
    /// No assignment satisfies the parameter; control was passed back.
    CannotFulfill { city: CityId },
    /// The optimizer and the server disagree about the city; shown on the
    /// first inconsistency of a reconciliation and again on retry
    /// exhaustion.
    Confused { city: CityId },
    /// The end-turn affordance should be re-evaluated after a drain.
    TurnDoneRefresh,
}

impl GovernorEvent {
    /// User-facing text for city events; `None` for pure UI triggers.
    pub fn message(&self, cities: &CityRegistry) -> Option<String> {
        let describe = |id: CityId| {
            cities
                .city(id)
                .map(|city| city.name.clone())
                .unwrap_or_else(|| format!("city {id}"))
        };
        match self {
            GovernorEvent::CannotFulfill { city } => Some(format!(
                "The citizen governor can't fulfill the requirements for {}. Passing back control.",
                describe(*city)
            )),
            GovernorEvent::Confused { city } => Some(format!(
                "The citizen governor has gotten confused dealing with {}. \
                 You may want to have a look.",
                describe(*city)
            )),
            GovernorEvent::TurnDoneRefresh => None,
        }
    }
}
