//! Boundary traits for the governor's two external collaborators: the
//! combinatorial city optimizer and the request-sending connection layer.
//! Both are black boxes; the engine only depends on these seams.

use gov_schema::{CmParameter, CmResult, SpecialistKind};

use crate::city::{City, CityId};

/// Correlation id issued by the connection layer for one sent request.
///
/// The transport reports batch completion as "everything up through id N has
/// been processed". Id 0 is reserved as the "no request" marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u32);

impl RequestId {
    pub const NONE: RequestId = RequestId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// External combinatorial solver. Synchronous and stateless from the
/// engine's point of view.
pub trait CityOptimizer {
    /// Compute a worker/specialist assignment for `city` under `parameter`,
    /// or report infeasibility via `found_a_valid = false`.
    fn query(&mut self, city: &City, parameter: &CmParameter) -> CmResult;
}

/// Connection layer turning assignment intents into wire requests.
///
/// `begin_batch`/`end_batch` bracket a coalesced buffered transaction;
/// every send returns the correlation id the server will confirm later.
pub trait RequestChannel {
    fn begin_batch(&mut self);
    fn end_batch(&mut self);

    /// Stop working `tile` and turn that citizen into a default specialist.
    fn make_specialist(&mut self, city: CityId, tile: usize) -> RequestId;

    /// Put a citizen to work on the currently unworked `tile`.
    fn make_worker(&mut self, city: CityId, tile: usize) -> RequestId;

    /// Re-role one specialist from `from` to `to`.
    fn change_specialist(
        &mut self,
        city: CityId,
        from: SpecialistKind,
        to: SpecialistKind,
    ) -> RequestId;

    /// Ask the server to recompute and re-send the city, with no change.
    fn refresh_city(&mut self, city: CityId) -> RequestId;
}
