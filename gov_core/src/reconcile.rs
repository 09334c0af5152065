//! Diff-and-apply: nudge a city's server-side assignment toward an
//! optimizer result with the minimal set of requests.

use thiserror::Error;

use gov_schema::{CmResult, SpecialistKind, CITY_CENTER};

use crate::backend::{RequestChannel, RequestId};
use crate::city::{City, CityId};
use crate::config::GovernorConfig;
use crate::metrics::GovernorMetrics;
use crate::session::PendingSession;

/// The retryable "inconsistent" signal: the optimizer assumed a citizen
/// count the server-visible city does not have.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("optimizer result accounts for {expected} citizens but city {city} has {actual}")]
    CitizenMismatch {
        city: CityId,
        expected: u32,
        actual: u32,
    },
}

#[derive(Debug)]
pub enum ApplyOutcome {
    /// The city already matches the target; nothing was sent.
    AlreadyMatched,
    /// A correction batch went out; track it through this session.
    Sent(PendingSession),
}

/// Emit the minimal correcting request batch for `city` toward `target`.
///
/// Requests are ordered so every tile and citizen slot is vacated before it
/// is repurposed: the server applies them in send order against
/// single-assignment bookkeeping, and the diff is computed against one
/// fixed snapshot of the current assignment.
pub(crate) fn apply_result(
    city: &City,
    target: &CmResult,
    requests: &mut dyn RequestChannel,
    config: &GovernorConfig,
    metrics: &mut GovernorMetrics,
) -> Result<ApplyOutcome, ApplyError> {
    let actual = city.as_result();
    if actual.agrees_with(target) && !config.always_apply_at_server() {
        metrics.no_op_applies += 1;
        log::debug!("city {} already matches the computed target", city.id);
        return Ok(ApplyOutcome::AlreadyMatched);
    }

    let expected_citizens = target.citizen_count();
    let actual_citizens = city.citizen_count();
    if expected_citizens != actual_citizens {
        metrics.inconsistencies += 1;
        return Err(ApplyError::CitizenMismatch {
            city: city.id,
            expected: expected_citizens,
            actual: actual_citizens,
        });
    }

    requests.begin_batch();
    let mut first = RequestId::NONE;
    let mut issued = 0usize;
    let mut track = |id: RequestId| {
        if first.is_none() {
            first = id;
        }
        issued += 1;
    };

    // Free workers from tiles the target leaves unworked; they become
    // default specialists.
    let mut default_pool = u32::from(city.specialists[SpecialistKind::DEFAULT.index()]);
    for tile in 0..city.worked.len() {
        if tile == CITY_CENTER {
            continue;
        }
        if city.worked[tile] && !target.worker_positions[tile] {
            track(requests.make_specialist(city.id, tile));
            default_pool += 1;
        }
    }

    // Shed excess non-default specialists back to the default role.
    for kind in SpecialistKind::ALL {
        if kind.is_default() {
            continue;
        }
        let have = city.specialists[kind.index()];
        let want = target.specialists[kind.index()];
        for _ in want..have {
            track(requests.change_specialist(city.id, kind, SpecialistKind::DEFAULT));
            default_pool += 1;
        }
    }

    // Assign workers to tiles the target wants worked.
    for tile in 0..city.worked.len() {
        if tile == CITY_CENTER {
            continue;
        }
        if !city.worked[tile] && target.worker_positions[tile] {
            debug_assert!(
                city.workable[tile],
                "target works tile {tile} which city {} cannot work",
                city.id
            );
            if !city.workable[tile] {
                log::error!(
                    "target works unworkable tile {tile} of city {}; sending anyway",
                    city.id
                );
            }
            track(requests.make_worker(city.id, tile));
        }
    }

    // Promote default specialists into the roles the target wants filled;
    // only citizens left at default by the steps above are available.
    for kind in SpecialistKind::ALL {
        if kind.is_default() {
            continue;
        }
        let have = city.specialists[kind.index()];
        let want = target.specialists[kind.index()];
        for _ in have..want {
            debug_assert!(default_pool > 0, "no default specialist left to promote");
            default_pool = default_pool.saturating_sub(1);
            track(requests.change_specialist(city.id, SpecialistKind::DEFAULT, kind));
        }
    }

    if issued == 0 {
        // Results can differ only in fields the diff does not touch, or the
        // config forced us past the short-circuit.
        first = requests.refresh_city(city.id);
        metrics.forced_refreshes += 1;
    }
    requests.end_batch();
    metrics.applied_batches += 1;

    Ok(ApplyOutcome::Sent(PendingSession {
        first_request: first,
        expected: target.clone(),
        city: city.id,
    }))
}
