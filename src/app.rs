// Engine event loop.
//
// Single task multiplexing the transport, the clock-sync probe timer, the
// auction countdown timer, and user commands with tokio::select!. All session
// mutation happens here, in channel-delivery order, so nothing needs a lock.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval};
use tracing::{debug, info, warn};

use crate::clock::{ClockSync, COUNTDOWN_REFRESH, SYNC_INTERVAL};
use crate::draft::player::{Player, PlayerId};
use crate::draft::state::TeamId;
use crate::protocol::{Inbound, Outbound};
use crate::session::{Auction, Rejection, Session, SessionState, SessionUpdate};
use crate::socket::SocketEvent;

/// User actions submitted by a front end.
#[derive(Debug, Clone)]
pub enum Command {
    /// Nominate a player at an opening bid.
    Pick { player: Player, bid: i64 },
    /// Bid on the player currently up for auction.
    Bid { player: Player, bid: i64 },
    Quit,
}

/// Updates pushed to consumers. Consumers only read; the session is owned by
/// the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineUpdate {
    State(SessionState),
    Connectivity,
    AuctionStarted(Box<Auction>),
    Countdown { seconds_left: i64 },
    AuctionSettled { winning_team: TeamId, player: PlayerId },
    Rejected(Box<Rejection>),
    ChannelClosed,
}

/// Timer cadences, usually taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub sync_interval: Duration,
    pub countdown_refresh: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            sync_interval: SYNC_INTERVAL,
            countdown_refresh: COUNTDOWN_REFRESH,
        }
    }
}

/// Run the engine event loop until the channel closes or a `Quit` arrives.
///
/// The only fatal error is a draft summary that fails initialization
/// (unknown position codes or an infeasible roster configuration); every
/// other problem is logged and recovered locally.
pub async fn run(
    mut socket_rx: mpsc::Receiver<SocketEvent>,
    out_tx: mpsc::Sender<String>,
    mut cmd_rx: mpsc::Receiver<Command>,
    update_tx: mpsc::Sender<EngineUpdate>,
    mut session: Session,
    timing: Timing,
) -> anyhow::Result<()> {
    info!("engine event loop started");

    let mut clock = ClockSync::new();
    let mut connected = false;
    let mut sync_timer = interval(timing.sync_interval);

    // The auction countdown. Exactly one countdown exists at a time: when a
    // new auction starts, the timer is replaced (fresh phase, immediate first
    // tick) rather than left running for the previous auction.
    let mut countdown_timer = interval(timing.countdown_refresh);
    let mut countdown_active = false;

    loop {
        tokio::select! {
            event = socket_rx.recv() => {
                match event {
                    Some(SocketEvent::Connected) => {
                        info!("channel connected, starting clock sync");
                        connected = true;
                        // Fresh connection, fresh estimate: samples taken
                        // before the channel settles are the noisiest. The
                        // replacement timer's first tick is immediate, so the
                        // first probe goes out right away.
                        clock = ClockSync::new();
                        sync_timer = interval(timing.sync_interval);
                    }
                    Some(SocketEvent::Disconnected) => {
                        info!("channel disconnected");
                        connected = false;
                        countdown_active = false;
                        let _ = update_tx.send(EngineUpdate::ChannelClosed).await;
                    }
                    Some(SocketEvent::Message(text)) => {
                        let msg = match Inbound::parse(&text) {
                            Ok(Some(msg)) => msg,
                            Ok(None) => {
                                debug!("ignoring unrecognized message type");
                                continue;
                            }
                            Err(e) => {
                                // Malformed payloads are fatal for that
                                // message only; the stream continues.
                                warn!("dropping malformed message: {e}");
                                continue;
                            }
                        };
                        if let Inbound::TimeResponse(response) = msg {
                            clock.record_response(response.time, Utc::now());
                            continue;
                        }
                        let updates = session
                            .handle_message(msg)
                            .map_err(|e| anyhow::Error::new(e).context("draft initialization failed"))?;
                        for update in updates {
                            match update {
                                SessionUpdate::StateChanged(state) => {
                                    let _ = update_tx.send(EngineUpdate::State(state)).await;
                                }
                                SessionUpdate::ConnectivityChanged => {
                                    let _ = update_tx.send(EngineUpdate::Connectivity).await;
                                }
                                SessionUpdate::RejectionRecorded => {
                                    if let Some(rejection) = session.rejection() {
                                        let _ = update_tx
                                            .send(EngineUpdate::Rejected(Box::new(rejection.clone())))
                                            .await;
                                    }
                                }
                                SessionUpdate::AuctionStarted => {
                                    if let Some(auction) = session.auction() {
                                        // Replace any countdown running for a
                                        // previous auction.
                                        countdown_timer = interval(timing.countdown_refresh);
                                        countdown_active =
                                            auction.end_time > clock.server_now();
                                        let _ = update_tx
                                            .send(EngineUpdate::AuctionStarted(Box::new(
                                                auction.clone(),
                                            )))
                                            .await;
                                    }
                                }
                                SessionUpdate::AuctionSettled { winning_team, player } => {
                                    countdown_active = false;
                                    let _ = update_tx
                                        .send(EngineUpdate::AuctionSettled { winning_team, player })
                                        .await;
                                }
                            }
                        }
                        if session.auction().is_none() {
                            countdown_active = false;
                        }
                    }
                    None => {
                        info!("socket channel closed, shutting down");
                        break;
                    }
                }
            }

            _ = sync_timer.tick(), if connected => {
                clock.probe_sent(Utc::now());
                let _ = out_tx.send(Outbound::TimeRequest.encode()).await;
            }

            _ = tick(&mut countdown_timer), if countdown_active => {
                match session.auction() {
                    Some(auction) => {
                        let seconds_left = clock.seconds_left(auction.end_time, Utc::now());
                        let _ = update_tx
                            .send(EngineUpdate::Countdown { seconds_left: seconds_left.max(0) })
                            .await;
                        if seconds_left <= 0 {
                            countdown_active = false;
                        }
                    }
                    None => countdown_active = false,
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Pick { player, bid }) => {
                        // Sent as-is: local gating is advisory, the server
                        // validates and answers with PlayerRejected if need be.
                        info!(player = %player.full_name(), bid, "sending pick");
                        let _ = out_tx.send(Outbound::Pick { player, bid }.encode()).await;
                    }
                    Some(Command::Bid { player, bid }) => {
                        info!(player = %player.full_name(), bid, "sending bid");
                        let _ = out_tx.send(Outbound::Bid { player, bid }.encode()).await;
                    }
                    Some(Command::Quit) => {
                        info!("quit command received, shutting down");
                        break;
                    }
                    None => {
                        info!("command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    info!("engine event loop exiting");
    Ok(())
}

async fn tick(timer: &mut Interval) {
    timer.tick().await;
}
