// Draft protocol state machine.
//
// Consumes inbound protocol messages in delivery order, updates the Draft
// aggregate, and exposes one discrete client state plus the auxiliary fields
// (active auction, pending rejection, picking team) every other concern reads.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::draft::player::{Player, PlayerId};
use crate::draft::state::{Draft, DraftError, TeamId, MIN_BID};
use crate::protocol::Inbound;

/// Client-visible session states.
///
/// After initialization the session cycles `WaitingForPick`/`OfferPick` ->
/// `AuctionInProgress` and back until the draft concludes; conclusion is the
/// channel owner's concern, not this machine's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected but no draft summary received yet.
    Init,
    /// Draft summary applied; waiting for the first nomination round.
    Connected,
    /// Another team is choosing a player to nominate.
    WaitingForPick,
    /// This client's team must choose a player to nominate.
    OfferPick,
    /// A nominated player is being bid on.
    AuctionInProgress,
}

/// The auction currently in progress. At most one exists at a time; a new
/// `Auction` message replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Auction {
    pub player: Player,
    /// Team holding the current high bid (the nominator until outbid).
    pub team: TeamId,
    /// Current high bid, in cents.
    pub bid: i64,
    /// Bid deadline, as a server timestamp.
    pub end_time: DateTime<Utc>,
}

/// A rejected nomination, kept for display while this client re-offers.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub player: Player,
    pub bid: i64,
    pub reason: String,
}

/// Advisory local check of whether this client may raise the current bid.
/// The server is authoritative; this only gates what a front end offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidEligibility {
    /// The auctioned player fits a slot the team can still fill.
    pub has_room: bool,
    /// The current bid is still below the team's maximum.
    pub within_cap: bool,
}

impl BidEligibility {
    pub fn can_bid(&self) -> bool {
        self.has_room && self.within_cap
    }
}

/// Observable effects of one inbound message, for the event loop to fan out
/// to consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    StateChanged(SessionState),
    ConnectivityChanged,
    RejectionRecorded,
    /// A new auction replaced whatever was active; any countdown running for
    /// the previous auction must be cancelled.
    AuctionStarted,
    AuctionSettled {
        winning_team: TeamId,
        player: PlayerId,
    },
}

/// One client's view of a live draft session.
pub struct Session {
    pub draft: Draft,
    state: SessionState,
    auction: Option<Auction>,
    picking_team: Option<TeamId>,
    rejection: Option<Rejection>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            draft: Draft::new(),
            state: SessionState::Init,
            auction: None,
            picking_team: None,
            rejection: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn auction(&self) -> Option<&Auction> {
        self.auction.as_ref()
    }

    /// The team currently choosing a nomination, when it isn't ours.
    pub fn picking_team(&self) -> Option<TeamId> {
        self.picking_team
    }

    /// The most recent rejection of our nomination, if still relevant.
    pub fn rejection(&self) -> Option<&Rejection> {
        self.rejection.as_ref()
    }

    /// Advisory bid gate for the active auction, from this client's team.
    pub fn bid_eligibility(&self) -> Option<BidEligibility> {
        let auction = self.auction.as_ref()?;
        let team = self.draft.current_team()?;
        Some(BidEligibility {
            has_room: team.has_room_for(&auction.player),
            within_cap: auction.bid < self.draft.max_bid(team),
        })
    }

    /// The smallest raise worth offering on the active auction.
    pub fn min_next_bid(&self) -> Option<i64> {
        self.auction
            .as_ref()
            .map(|a| if a.bid > 0 { a.bid + MIN_BID } else { MIN_BID })
    }

    /// Apply one inbound message.
    ///
    /// Recoverable problems (stale rejections, unknown references) are
    /// handled locally with at most a log line; the only fatal error is a
    /// draft summary whose rosters admit no legal assignment, which aborts
    /// initialization.
    pub fn handle_message(&mut self, msg: Inbound) -> Result<Vec<SessionUpdate>, DraftError> {
        let mut updates = Vec::new();
        match msg {
            Inbound::DraftSummary(summary) => {
                if self.state != SessionState::Init {
                    warn!("draft summary received twice, ignoring");
                    return Ok(updates);
                }
                self.draft.init(summary)?;
                self.set_state(SessionState::Connected, &mut updates);
            }

            Inbound::TeamJoinLeave(msg) => {
                for id in msg.connected {
                    match self.draft.team_mut(id) {
                        Some(team) => team.connected = true,
                        None => warn!(team = id, "connectivity update for unknown team"),
                    }
                }
                for id in msg.disconnected {
                    match self.draft.team_mut(id) {
                        Some(team) => team.connected = false,
                        None => warn!(team = id, "connectivity update for unknown team"),
                    }
                }
                updates.push(SessionUpdate::ConnectivityChanged);
            }

            Inbound::WaitingForPick(msg) => {
                self.auction = None;
                self.rejection = None;
                if self.draft.team(msg.team).is_none() {
                    warn!(team = msg.team, "waiting-for-pick names an unknown team");
                }
                if Some(msg.team) == self.draft.current_team_id() {
                    self.picking_team = None;
                    self.set_state(SessionState::OfferPick, &mut updates);
                } else {
                    self.picking_team = self.draft.team(msg.team).map(|t| t.id);
                    self.set_state(SessionState::WaitingForPick, &mut updates);
                }
            }

            Inbound::PlayerRejected(msg) => {
                // A rejection only means something while we are offering; a
                // stale one arriving after the state moved on is dropped.
                if self.state == SessionState::OfferPick {
                    self.rejection = Some(Rejection {
                        player: msg.player,
                        bid: msg.bid,
                        reason: msg.reason,
                    });
                    updates.push(SessionUpdate::RejectionRecorded);
                } else {
                    debug!(state = ?self.state, "ignoring rejection outside offer state");
                }
            }

            Inbound::Auction(msg) => {
                let player = self.draft.register_player(msg.player);
                if self.draft.team(msg.team).is_none() {
                    warn!(team = msg.team, "auction names an unknown high bidder");
                }
                self.rejection = None;
                self.auction = Some(Auction {
                    player,
                    team: msg.team,
                    bid: msg.bid,
                    end_time: msg.end_time,
                });
                self.set_state(SessionState::AuctionInProgress, &mut updates);
                updates.push(SessionUpdate::AuctionStarted);
            }

            Inbound::AuctionComplete(msg) => {
                if self.draft.team(msg.winning_team).is_none() {
                    warn!(
                        team = msg.winning_team,
                        "auction completed for an unknown team, skipping"
                    );
                    return Ok(updates);
                }
                let player_id = msg.player.id;
                if let Err(e) = self.draft.add_player(msg.winning_team, msg.player.clone()) {
                    warn!(error = %e, "could not attach won player");
                    return Ok(updates);
                }
                self.draft.add_pick(&msg);
                // No state transition here: the server follows up with a
                // WaitingForPick to drive the next round. Until it arrives
                // the state stays AuctionInProgress with no active auction.
                self.auction = None;
                updates.push(SessionUpdate::AuctionSettled {
                    winning_team: msg.winning_team,
                    player: player_id,
                });
            }

            Inbound::TimeResponse(_) => {
                // Clock synchronization is handled before messages reach the
                // state machine; nothing to do here.
            }
        }
        Ok(updates)
    }

    fn set_state(&mut self, state: SessionState, updates: &mut Vec<SessionUpdate>) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "session state change");
            self.state = state;
            updates.push(SessionUpdate::StateChanged(state));
        }
    }
}
