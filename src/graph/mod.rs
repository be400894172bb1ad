pub mod command;
pub mod labels;
mod model;
mod types;
pub mod validation;

pub use command::{Mutation, MutationOutcome};
pub use model::*;
pub use types::*;
