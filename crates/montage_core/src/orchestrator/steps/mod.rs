//! Pipeline step implementations.

mod acquire;
mod assemble;
mod extract;
mod plan;
mod probe;
mod validate;
mod verify;

pub use acquire::AcquireStep;
pub use assemble::AssembleStep;
pub use extract::ExtractStep;
pub use plan::PlanStep;
pub use probe::ProbeStep;
pub use validate::ValidateStep;
pub use verify::VerifyStep;
