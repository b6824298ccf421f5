// Draft domain: positions, players, roster feasibility, and the aggregate.

pub mod player;
pub mod position;
pub mod roster;
pub mod state;

pub use player::{Player, PlayerId};
pub use position::{Position, ALL_POSITIONS};
pub use roster::{Feasibility, RosterSlot};
pub use state::{Draft, DraftError, Pick, Team, TeamId, MIN_BID};
