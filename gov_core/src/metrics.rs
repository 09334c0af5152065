/// Counters tracking what the governor has done since game join. Purely
/// informational; surfaced by debug UIs and asserted on by tests.
#[derive(Default, Debug, Clone)]
pub struct GovernorMetrics {
    /// Reconciliations skipped because the city already matched the target.
    pub no_op_applies: u64,
    /// Correction batches sent to the server.
    pub applied_batches: u64,
    /// Batches that degenerated to a lone refresh request.
    pub forced_refreshes: u64,
    /// Citizen-count mismatches between optimizer result and live state.
    pub inconsistencies: u64,
    /// Sessions whose confirmation matched the expected result.
    pub sessions_resolved: u64,
    /// Sessions whose confirmation differed from the expected result.
    pub sessions_mismatched: u64,
    /// Sessions dropped because the city was released or lost mid-flight.
    pub sessions_abandoned: u64,
    /// Cities released from governor control, for any reason.
    pub cities_released: u64,
}
