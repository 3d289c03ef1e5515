pub mod action_selection;
pub mod agent;
pub mod approximator;
pub mod error;
pub mod features;
pub mod mdp;
pub mod observation;
pub mod parameter;
pub mod table;
pub mod trace;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use action_selection::ActionSelection;
pub use agent::{EnumTemporalDifference, TemporalDifference};
pub use error::{Result, TdError};
pub use mdp::MdpInfo;
pub use observation::{Observation, Transition};
pub use parameter::{EnumParameter, Parameter, ParameterKey};
