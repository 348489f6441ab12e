//! Small demonstration modules exercising each framework seam: pass-through,
//! declared options, and the subprocess capability.

pub mod date;
pub mod echo;
pub mod flip;
