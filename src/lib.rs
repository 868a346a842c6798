//! A simulation of a network of clinics reporting daily disease-case counts, with a small rule
//! engine that raises outbreak alerts.
//!
//! The central object is the [`OutbreakModel`]. It owns the clinics, decides each simulated day
//! whether an outbreak starts or ends, steps every clinic, and aggregates the results. Each
//! simulated day:
//! * the model rolls for starting an outbreak (choosing an epicenter clinic) or ending one;
//! * every [`ClinicAgent`] generates its case counts, with more cases the closer it is to an
//!   active epicenter;
//! * every clinic evaluates the detection rules in [`alerts`] against its 7-day window;
//! * the model sums the day's cases and records the day in its histories and reports.
//!
//! [`OutbreakModel::get_state`] produces an owned [`ModelState`] snapshot for clients.
//!
//! The model does no locking of its own. To share one between threads, for example between an
//! HTTP server and an [`AutoAdvance`] loop, put it behind a [`SimulationHandle`].
pub mod alerts;
pub mod auto_advance;
pub mod clinic;
pub mod config;
pub mod error;
pub mod execution_stats;
pub mod handle;
pub mod hashing;
pub mod log;
pub mod model;
pub mod prelude;
pub mod random;
pub mod report;
pub mod runner;
pub mod state;
pub mod web_api;

pub use alerts::{Alert, AlertType, ClinicStatus, Severity};
pub use auto_advance::AutoAdvance;
pub use clinic::{ClinicAgent, ClinicId, Position};
pub use config::ModelConfig;
pub use error::SentinelError;
pub use handle::SimulationHandle;
pub use model::OutbreakModel;
pub use random::{RandomStreams, RngId};
pub use state::{ClinicState, ModelState};

// Re-exported for use in `define_rng!`.
pub use rand;
