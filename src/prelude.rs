pub use crate::alerts::{Alert, AlertType, ClinicStatus, Severity};
pub use crate::auto_advance::AutoAdvance;
pub use crate::clinic::{ClinicAgent, ClinicId, Position};
pub use crate::config::ModelConfig;
pub use crate::error::SentinelError;
pub use crate::handle::SimulationHandle;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::model::OutbreakModel;
pub use crate::random::{RandomStreams, RngId};
pub use crate::state::{ClinicState, ModelState};
pub use crate::define_rng;
