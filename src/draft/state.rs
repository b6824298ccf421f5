// Draft aggregate: teams, pick history, ownership, and derived bid limits.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::protocol::{CompletedAuction, DraftSummary};

use super::player::{Player, PlayerId};
use super::position::Position;
use super::roster::{Feasibility, RosterSlot};

/// Unique team identifier assigned by the server.
pub type TeamId = i64;

/// Minimum bid and bid increment, in cents.
pub const MIN_BID: i64 = 50;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft summary received for an already-initialized draft")]
    AlreadyInitialized,

    #[error("unknown position code `{0}` in required positions")]
    UnknownPosition(String),

    #[error(
        "no legal roster assignment exists for team `{team}` under the configured position slots"
    )]
    InfeasibleRoster { team: String },

    #[error("unknown team id {0}")]
    UnknownTeam(TeamId),
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// One drafting participant.
///
/// The team owns its player list; the draft-wide owner index lives on
/// [`Draft`] so players never hold a back-reference to their team.
#[derive(Debug, Clone)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Whether the team currently has a live connection to the draft.
    pub connected: bool,
    players: Vec<Player>,
    total_salary: i64,
    feasibility: Feasibility,
}

impl Team {
    fn new(id: TeamId, name: String, required: &HashMap<Position, usize>) -> Self {
        Team {
            id,
            name,
            connected: false,
            players: Vec::new(),
            total_salary: 0,
            feasibility: Feasibility::solve(required, &[]),
        }
    }

    /// Drafted players, in draft order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Sum of winning bids, maintained incrementally as players are added.
    pub fn total_salary(&self) -> i64 {
        self.total_salary
    }

    /// Positions at which this team could legally receive one more player.
    pub fn draftable_positions(&self) -> &[Position] {
        self.feasibility.draftable_positions()
    }

    /// Whether some legal assignment of all current players exists.
    pub fn is_feasible(&self) -> bool {
        self.feasibility.is_feasible()
    }

    /// True iff the player is eligible at any position the team can still
    /// fill. Gates both nomination and bidding (advisory only; the server
    /// re-checks).
    pub fn has_room_for(&self, player: &Player) -> bool {
        player
            .positions
            .iter()
            .any(|pos| self.feasibility.has_open_slot(*pos))
    }

    /// Displayable slot layout. `None` requests the default assignment;
    /// `Some(pos)` requests an assignment that keeps a slot open at `pos`.
    pub fn roster(&self, open_at: Option<Position>) -> Option<&[RosterSlot]> {
        self.feasibility.roster(open_at)
    }

    fn add_player(&mut self, player: Player, required: &HashMap<Position, usize>) {
        self.total_salary += player.salary;
        self.players.push(player);
        // Adding one player can change which slots are reachable for every
        // player already assigned, so the whole search reruns.
        self.feasibility = Feasibility::solve(required, &self.players);
    }
}

// ---------------------------------------------------------------------------
// Pick history
// ---------------------------------------------------------------------------

/// A completed auction in the draft history. Append-only; never reordered.
#[derive(Debug, Clone)]
pub struct Pick {
    pub winning_team: TeamId,
    pub offering_team: TeamId,
    /// The transferred player; `salary` is the winning bid.
    pub player: Player,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Root aggregate for one draft session.
///
/// Constructed empty, populated exactly once by the `DraftSummary` message,
/// then mutated incrementally for the rest of the session.
#[derive(Debug, Default)]
pub struct Draft {
    pub name: String,
    /// Per-team salary cap, in cents.
    pub salary_cap: i64,
    required_positions: HashMap<Position, usize>,
    /// Sum of all required slot counts: the full roster size per team.
    roster_size: usize,
    teams: Vec<Team>,
    team_index: HashMap<TeamId, usize>,
    picks: Vec<Pick>,
    current_team: Option<TeamId>,
    /// Owner index: player id -> owning team id.
    owners: HashMap<PlayerId, TeamId>,
    /// Every player this session has seen, owned or not.
    players: HashMap<PlayerId, Player>,
    initialized: bool,
}

impl Draft {
    pub fn new() -> Self {
        Draft::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Populate the aggregate from the draft summary.
    ///
    /// Teams are created in draft order and their existing players replayed
    /// through [`Team::add_player`], so feasibility caches and salary totals
    /// are consistent from the start. A team whose players admit no legal
    /// assignment is an unrecoverable configuration error, surfaced here
    /// rather than on a later pick.
    pub fn init(&mut self, summary: DraftSummary) -> Result<(), DraftError> {
        if self.initialized {
            return Err(DraftError::AlreadyInitialized);
        }

        let mut required = HashMap::new();
        for (code, count) in &summary.positions {
            let pos = Position::from_code(code)
                .ok_or_else(|| DraftError::UnknownPosition(code.clone()))?;
            required.insert(pos, *count);
        }
        self.roster_size = required.values().sum();
        self.required_positions = required;
        self.name = summary.name;
        self.salary_cap = summary.salary_cap;

        for info in summary.teams {
            if self.team_index.contains_key(&info.id) {
                warn!(team = info.id, "duplicate team id in draft summary, skipping");
                continue;
            }
            let mut team = Team::new(info.id, info.name, &self.required_positions);
            for player in info.players {
                self.players.insert(player.id, player.clone());
                self.owners.insert(player.id, team.id);
                team.add_player(player, &self.required_positions);
            }
            if !team.is_feasible() {
                return Err(DraftError::InfeasibleRoster { team: team.name });
            }
            self.team_index.insert(team.id, self.teams.len());
            self.teams.push(team);
        }

        if self.team_index.contains_key(&summary.team) {
            self.current_team = Some(summary.team);
        } else {
            warn!(team = summary.team, "draft summary names an unknown local team");
        }

        for pick in &summary.picks {
            self.add_pick(pick);
        }

        self.initialized = true;
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.team_index.get(&id).map(|&i| &self.teams[i])
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.team_index.get(&id).map(|&i| &mut self.teams[i])
    }

    /// The team this client drafts for.
    pub fn current_team(&self) -> Option<&Team> {
        self.current_team.and_then(|id| self.team(id))
    }

    pub fn current_team_id(&self) -> Option<TeamId> {
        self.current_team
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn required_positions(&self) -> &HashMap<Position, usize> {
        &self.required_positions
    }

    /// Full roster size per team.
    pub fn roster_size(&self) -> usize {
        self.roster_size
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// The team owning `player_id`, if it has been won.
    pub fn owner_of(&self, player_id: PlayerId) -> Option<TeamId> {
        self.owners.get(&player_id).copied()
    }

    // -- mutations ----------------------------------------------------------

    /// Bring a player into the session's universe without assigning
    /// ownership. Returns the stored record; a player already seen keeps its
    /// first-received form.
    pub fn register_player(&mut self, player: Player) -> Player {
        self.players.entry(player.id).or_insert(player).clone()
    }

    /// Attach a won player to a team: appends to the team's list, updates the
    /// owner index, and recomputes the team's roster feasibility.
    pub fn add_player(&mut self, team_id: TeamId, player: Player) -> Result<(), DraftError> {
        let idx = *self
            .team_index
            .get(&team_id)
            .ok_or(DraftError::UnknownTeam(team_id))?;
        self.players.insert(player.id, player.clone());
        if let Some(previous) = self.owners.insert(player.id, team_id) {
            if previous != team_id {
                warn!(
                    player = player.id,
                    previous, team = team_id, "player changed owners"
                );
            }
        }
        let team = &mut self.teams[idx];
        if team.players.len() >= self.roster_size {
            warn!(team = %team.name, "team roster already at required size");
        }
        team.add_player(player, &self.required_positions);
        Ok(())
    }

    /// Append a completed auction to the pick history, resolving team and
    /// player references by id. Unresolvable references are skipped with a
    /// warning; ownership transfer is [`Draft::add_player`]'s job and the
    /// session layer keeps the two consistent.
    pub fn add_pick(&mut self, info: &CompletedAuction) {
        if self.team(info.winning_team).is_none() {
            warn!(team = info.winning_team, "pick references an unknown winning team");
            return;
        }
        if self.team(info.offering_team).is_none() {
            warn!(team = info.offering_team, "pick references an unknown offering team");
            return;
        }
        let player = match self.players.get(&info.player.id) {
            Some(p) => p.clone(),
            None => {
                warn!(player = info.player.id, "pick references an unknown player");
                return;
            }
        };
        self.picks.push(Pick {
            winning_team: info.winning_team,
            offering_team: info.offering_team,
            player,
        });
    }

    // -- derived quantities -------------------------------------------------

    /// Salary cap minus what the team has spent.
    pub fn remaining_salary(&self, team: &Team) -> i64 {
        self.salary_cap - team.total_salary()
    }

    /// Roster slots the team still has to fill.
    pub fn players_needed(&self, team: &Team) -> i64 {
        self.roster_size as i64 - team.num_players() as i64
    }

    /// The most the team can bid on the current player: after winning at
    /// this price, every remaining unfilled slot must still be fundable at
    /// the minimum bid.
    pub fn max_bid(&self, team: &Team) -> i64 {
        MIN_BID + self.remaining_salary(team) - self.players_needed(team) * MIN_BID
    }
}
