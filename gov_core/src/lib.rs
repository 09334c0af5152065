//! Client-side city governor engine.
//!
//! Takes a declarative "what should this city optimize for" parameter,
//! asks an external combinatorial solver for a target worker/specialist
//! assignment, and drives the server-side city toward it through minimal
//! request batches — while queueing concurrent change notifications,
//! deferring reaction behind freeze/unfreeze brackets, and reconciling the
//! server's asynchronous confirmations.
//!
//! Everything runs single-threaded and callback-driven; nothing here
//! blocks on the network.

pub mod backend;
pub mod city;
pub mod config;
pub mod events;
pub mod governor;
pub mod metrics;
pub mod presets;
mod reconcile;
pub mod session;
pub mod store;

pub use backend::{CityOptimizer, RequestChannel, RequestId};
pub use city::{City, CityId, CityRegistry, PlayerId};
pub use config::{
    load_governor_config_from_env, GovernorConfig, GovernorConfigError, BUILTIN_GOVERNOR_CONFIG,
};
pub use events::GovernorEvent;
pub use governor::{ClientCtx, Governor, MAX_OPTIMIZER_ATTEMPTS};
pub use metrics::GovernorMetrics;
pub use presets::{Preset, PresetCatalog, MAX_PRESET_DESCRIPTION};
pub use session::PendingSession;
pub use store::{AttributeStore, MemoryAttributes, ParamPurpose, ParameterStore};
