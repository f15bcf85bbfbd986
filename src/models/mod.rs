//! Row models for the league schema.

mod bracket;
mod ids;
mod matches;
mod player;
mod stats;
mod team;
mod tournament;
mod transfer;

pub use bracket::*;
pub use ids::*;
pub use matches::*;
pub use player::*;
pub use stats::*;
pub use team::*;
pub use tournament::*;
pub use transfer::*;
