//! The governor coordinator: a dirty-city queue, a freeze/unfreeze
//! re-entrancy guard, and the bounded per-city reconciliation loop.
//!
//! One `Governor` exists per game session, created at game join and dropped
//! at disconnect. Collaborators are passed in per call through
//! [`ClientCtx`]; nothing here is a static.

use std::collections::BTreeSet;

use gov_schema::CmParameter;

use crate::backend::{CityOptimizer, RequestChannel};
use crate::city::{CityId, CityRegistry};
use crate::config::GovernorConfig;
use crate::events::GovernorEvent;
use crate::metrics::GovernorMetrics;
use crate::reconcile::{self, ApplyOutcome};
use crate::session::PendingSession;
use crate::store::ParameterStore;

/// Hard ceiling on optimizer queries per `handle_city` invocation.
///
/// Inconsistent results may resolve once the optimizer sees fresher state,
/// but only so many times before it is a genuine bug; infeasible results
/// never retry at all.
pub const MAX_OPTIMIZER_ATTEMPTS: u32 = 5;

/// Borrowed collaborators for one governor call: the live game state, the
/// external solver, and the connection layer.
pub struct ClientCtx<'a> {
    pub cities: &'a CityRegistry,
    pub optimizer: &'a mut dyn CityOptimizer,
    pub requests: &'a mut dyn RequestChannel,
}

pub struct Governor {
    changed: BTreeSet<CityId>,
    removed: BTreeSet<CityId>,
    freeze_depth: i32,
    draining: bool,
    pub(crate) session: Option<PendingSession>,
    pub(crate) store: ParameterStore,
    config: GovernorConfig,
    pub(crate) metrics: GovernorMetrics,
    events: Vec<GovernorEvent>,
}

impl Governor {
    pub fn new(config: GovernorConfig) -> Self {
        Self::with_store(config, ParameterStore::in_memory())
    }

    pub fn with_store(config: GovernorConfig, store: ParameterStore) -> Self {
        Self {
            changed: BTreeSet::new(),
            removed: BTreeSet::new(),
            freeze_depth: 1,
            draining: false,
            session: None,
            store,
            config,
            metrics: GovernorMetrics::default(),
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }

    pub fn metrics(&self) -> &GovernorMetrics {
        &self.metrics
    }

    pub fn pending_session(&self) -> Option<&PendingSession> {
        self.session.as_ref()
    }

    /// Take every event queued since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<GovernorEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GovernorEvent) {
        self.events.push(event);
    }

    /// Enter a "processing incoming packets" bracket; drains are deferred
    /// until the matching [`Governor::unfreeze`].
    pub fn freeze(&mut self) {
        self.freeze_depth -= 1;
    }

    /// Leave a freeze bracket and react to everything queued meanwhile.
    pub fn unfreeze(&mut self, ctx: &mut ClientCtx<'_>) {
        self.freeze_depth += 1;
        self.drain(ctx);
    }

    /// Not net-frozen: the depth counter (rather than a boolean) lets
    /// freeze brackets nest across unrelated call sites.
    pub fn is_hot(&self) -> bool {
        self.freeze_depth >= 1
    }

    /// A city's underlying state changed; queue it for re-evaluation.
    pub fn city_changed(&mut self, city: CityId, ctx: &mut ClientCtx<'_>) {
        self.changed.insert(city);
        self.drain(ctx);
    }

    /// A newly founded city is just a change.
    pub fn city_created(&mut self, city: CityId, ctx: &mut ClientCtx<'_>) {
        self.city_changed(city, ctx);
    }

    /// The city is gone (destroyed or captured away); its stored parameter
    /// is cleared on the next drain without consulting the optimizer.
    pub fn city_removed(&mut self, city: CityId, ctx: &mut ClientCtx<'_>) {
        self.removed.insert(city);
        self.drain(ctx);
    }

    /// Store `parameter` as the city's active parameter and queue it.
    pub fn put_under_governor(
        &mut self,
        city: CityId,
        parameter: &CmParameter,
        ctx: &mut ClientCtx<'_>,
    ) {
        self.store.set_active(city, parameter);
        self.city_changed(city, ctx);
    }

    /// Explicit user release: clear the active parameter, no event.
    pub fn release_city(&mut self, city: CityId) {
        if self.store.is_governed(city) {
            self.store.clear_active(city);
            self.metrics.cities_released += 1;
        }
    }

    pub fn governed_parameter(&self, city: CityId) -> Option<CmParameter> {
        self.store.active(city)
    }

    /// Process every queued city, then every queued removal.
    ///
    /// No-op while frozen, while no local player is attached, or while a
    /// drain is already on the stack: a notification fired by this drain's
    /// own request traffic lands in the freshly emptied queue and is picked
    /// up by the next top-level drain, never recursively.
    pub fn drain(&mut self, ctx: &mut ClientCtx<'_>) {
        if !self.is_hot() || ctx.cities.local_player().is_none() || self.draining {
            return;
        }
        self.draining = true;

        let pass = std::mem::take(&mut self.changed);
        for city in pass {
            // Membership is re-verified, not just liveness: the same id can
            // be recycled after capture or removal.
            if !ctx.cities.is_local_city(city) {
                continue;
            }
            self.handle_city(city, ctx);
        }

        let removed = std::mem::take(&mut self.removed);
        for city in removed {
            self.store.clear_active(city);
        }

        self.push_event(GovernorEvent::TurnDoneRefresh);
        self.draining = false;
    }

    /// Reconcile one city toward an optimizer target, retrying on
    /// inconsistency up to [`MAX_OPTIMIZER_ATTEMPTS`] times.
    fn handle_city(&mut self, id: CityId, ctx: &mut ClientCtx<'_>) {
        let cities = ctx.cities;
        for attempt in 0..MAX_OPTIMIZER_ATTEMPTS {
            // Ownership and governed status can both change between
            // attempts; losing either is "nothing to do", not an error.
            if !cities.is_local_city(id) {
                return;
            }
            let Some(parameter) = self.store.active(id) else {
                return;
            };
            let Some(city) = cities.city(id) else {
                return;
            };

            let result = ctx.optimizer.query(city, &parameter);
            if !result.found_a_valid {
                self.store.clear_active(id);
                self.metrics.cities_released += 1;
                self.push_event(GovernorEvent::CannotFulfill { city: id });
                log::debug!("no valid assignment for city {id}; control released");
                return;
            }

            match reconcile::apply_result(city, &result, ctx.requests, &self.config, &mut self.metrics)
            {
                Ok(ApplyOutcome::AlreadyMatched) => return,
                Ok(ApplyOutcome::Sent(session)) => {
                    // Overwrites any still-outstanding session; the slot is
                    // single-occupancy by design.
                    self.session = Some(session);
                    return;
                }
                Err(err) => {
                    log::warn!("governor inconsistency on attempt {attempt}: {err}");
                    if attempt == 0 {
                        self.push_event(GovernorEvent::Confused { city: id });
                    }
                }
            }
        }

        // Retry budget exhausted. The city is expected to still be valid
        // here; if it vanished on the last iteration, treat it as nothing
        // to do rather than asserting.
        if !cities.is_local_city(id) {
            return;
        }
        self.push_event(GovernorEvent::Confused { city: id });
        self.store.clear_active(id);
        self.metrics.cities_released += 1;
        log::error!(
            "governor gave up on city {id} after {MAX_OPTIMIZER_ATTEMPTS} inconsistent \
             optimizer results; this should not happen, please file a bug report"
        );
    }
}
