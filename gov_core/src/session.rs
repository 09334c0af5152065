//! Tracking of the single outstanding "did the server apply what we
//! computed" round trip.

use gov_schema::CmResult;

use crate::backend::RequestId;
use crate::city::{CityId, CityRegistry};
use crate::governor::Governor;

/// The in-flight correction batch and the state it should produce.
///
/// One slot exists process-wide, not one per city: starting a new session
/// overwrites a still-outstanding one, and a late confirmation is matched
/// against whatever occupies the slot. With two cities' corrections in
/// flight the check can land on the wrong city; kept for fidelity with the
/// original client, the verdict is informational only.
#[derive(Debug, Clone)]
pub struct PendingSession {
    /// Correlation id of the first request in the batch.
    pub first_request: RequestId,
    /// The optimizer result the batch was derived from.
    pub expected: CmResult,
    pub city: CityId,
}

impl Governor {
    /// The connection layer reports that all requests up through
    /// `processed` have been applied by the server.
    ///
    /// Callers are expected to bracket whole incoming-packet batches with
    /// [`Governor::freeze`]/[`Governor::unfreeze`] around this call so the
    /// drain triggered by the batch's own city-changed notifications runs
    /// once, afterwards.
    ///
    /// The verdict is recorded in the metrics and at debug log level only;
    /// a mismatch never retries on its own. Retries are driven exclusively
    /// by the per-city reconciliation loop on its next trigger.
    pub fn on_batch_processed(&mut self, processed: RequestId, cities: &CityRegistry) {
        if self.session.is_none() {
            return;
        }
        if processed.is_none() {
            // The transport's "no real batch" marker; the slot keeps
            // waiting for its confirmation.
            return;
        }
        let Some(session) = self.session.take() else {
            return;
        };

        // Released, captured, or destroyed mid-flight: expected under
        // normal play, abandon the check silently.
        if !cities.is_local_city(session.city) || !self.store.is_governed(session.city) {
            self.metrics.sessions_abandoned += 1;
            log::debug!(
                "session for city {} abandoned; city no longer governed locally",
                session.city
            );
            return;
        }
        let Some(city) = cities.city(session.city) else {
            self.metrics.sessions_abandoned += 1;
            return;
        };

        let actual = city.as_result();
        if actual.agrees_with(&session.expected) {
            self.metrics.sessions_resolved += 1;
            log::debug!(
                "session {} for city {} confirmed by the server",
                session.first_request.0,
                session.city
            );
        } else {
            self.metrics.sessions_mismatched += 1;
            log::debug!(
                "session {} for city {} diverged from the server's result",
                session.first_request.0,
                session.city
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{City, PlayerId};
    use crate::config::GovernorConfig;
    use gov_schema::CmParameter;

    fn governed_setup() -> (Governor, CityRegistry) {
        let mut governor = Governor::new(GovernorConfig::builtin());
        let mut cities = CityRegistry::new();
        cities.set_local_player(Some(PlayerId(0)));
        cities.insert(City::new(CityId(1), PlayerId(0), "Thornhaven", 5));
        governor
            .store_mut()
            .set_active(CityId(1), &CmParameter::default());
        (governor, cities)
    }

    fn session_for(cities: &CityRegistry, id: CityId) -> PendingSession {
        PendingSession {
            first_request: RequestId(7),
            expected: cities.city(id).unwrap().as_result(),
            city: id,
        }
    }

    #[test]
    fn confirmation_without_a_session_is_a_no_op() {
        let (mut governor, cities) = governed_setup();
        governor.on_batch_processed(RequestId(9), &cities);
        assert_eq!(governor.metrics().sessions_resolved, 0);
    }

    #[test]
    fn id_zero_keeps_the_session_waiting() {
        let (mut governor, cities) = governed_setup();
        governor.session = Some(session_for(&cities, CityId(1)));
        governor.on_batch_processed(RequestId::NONE, &cities);
        assert!(governor.pending_session().is_some());
    }

    #[test]
    fn matching_confirmation_resolves_and_clears() {
        let (mut governor, cities) = governed_setup();
        governor.session = Some(session_for(&cities, CityId(1)));
        governor.on_batch_processed(RequestId(7), &cities);
        assert!(governor.pending_session().is_none());
        assert_eq!(governor.metrics().sessions_resolved, 1);
        assert_eq!(governor.metrics().sessions_mismatched, 0);
    }

    #[test]
    fn diverged_confirmation_is_informational_only() {
        let (mut governor, mut cities) = governed_setup();
        governor.session = Some(session_for(&cities, CityId(1)));
        // The server settled on a different assignment meanwhile.
        cities.city_mut(CityId(1)).unwrap().worked[2] = true;

        governor.on_batch_processed(RequestId(7), &cities);
        assert!(governor.pending_session().is_none());
        assert_eq!(governor.metrics().sessions_mismatched, 1);
        assert!(governor.take_events().is_empty());
        assert!(governor.store().is_governed(CityId(1)));
    }

    #[test]
    fn stale_city_abandons_the_check_silently() {
        let (mut governor, mut cities) = governed_setup();
        governor.session = Some(session_for(&cities, CityId(1)));
        cities.city_mut(CityId(1)).unwrap().owner = PlayerId(2);

        governor.on_batch_processed(RequestId(7), &cities);
        assert!(governor.pending_session().is_none());
        assert_eq!(governor.metrics().sessions_abandoned, 1);
        assert_eq!(governor.metrics().sessions_mismatched, 0);
    }
}
