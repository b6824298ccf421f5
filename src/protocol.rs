// Wire protocol: `{type, data}` envelopes and typed message payloads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::draft::player::Player;
use crate::draft::state::TeamId;

/// Raw message envelope. `kind` names the payload type carried in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

// ---------------------------------------------------------------------------
// Inbound payloads
// ---------------------------------------------------------------------------

/// Full draft description, sent once after the connection is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSummary {
    pub name: String,
    pub salary_cap: i64,
    /// Required slot counts keyed by position code.
    pub positions: HashMap<String, usize>,
    /// Teams in draft order, with any players they already own.
    pub teams: Vec<TeamInfo>,
    /// Completed auctions so far, in draft order.
    #[serde(default)]
    pub picks: Vec<CompletedAuction>,
    /// The team this client drafts for.
    pub team: TeamId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

/// Connectivity change: which teams currently have a live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamJoinLeave {
    #[serde(default)]
    pub connected: Vec<TeamId>,
    #[serde(default)]
    pub disconnected: Vec<TeamId>,
}

/// The named team is up to nominate the next player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingForPick {
    pub team: TeamId,
}

/// The server refused this client's nomination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRejected {
    pub player: Player,
    pub bid: i64,
    pub reason: String,
}

/// Current state of the live auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionUpdate {
    pub player: Player,
    /// Team holding the current high bid (the nominator until outbid).
    pub team: TeamId,
    #[serde(default)]
    pub bid: i64,
    /// Bid deadline, as a server timestamp.
    pub end_time: DateTime<Utc>,
}

/// A settled auction. Entries in the pick history have the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedAuction {
    /// The won player; `salary` carries the winning bid.
    pub player: Player,
    pub offering_team: TeamId,
    pub winning_team: TeamId,
}

/// Server wall-clock time, answering a `TimeRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeResponse {
    pub time: DateTime<Utc>,
}

/// Inbound messages the engine understands.
#[derive(Debug, Clone)]
pub enum Inbound {
    DraftSummary(DraftSummary),
    TeamJoinLeave(TeamJoinLeave),
    WaitingForPick(WaitingForPick),
    PlayerRejected(PlayerRejected),
    Auction(AuctionUpdate),
    AuctionComplete(CompletedAuction),
    TimeResponse(TimeResponse),
}

impl Inbound {
    /// Decode a typed message from an envelope.
    ///
    /// Unrecognized types decode to `None`: unknown messages are ignored, not
    /// rejected, so newer servers can add message types without breaking this
    /// client. A recognized type with a malformed payload is an error for
    /// that message only.
    pub fn decode(envelope: &Envelope) -> Result<Option<Inbound>, serde_json::Error> {
        let data = envelope.data.clone();
        let msg = match envelope.kind.as_str() {
            "DraftSummary" => Inbound::DraftSummary(serde_json::from_value(data)?),
            "TeamJoinLeaveMessage" => Inbound::TeamJoinLeave(serde_json::from_value(data)?),
            "WaitingForPick" => Inbound::WaitingForPick(serde_json::from_value(data)?),
            "PlayerRejected" => Inbound::PlayerRejected(serde_json::from_value(data)?),
            "Auction" => Inbound::Auction(serde_json::from_value(data)?),
            "AuctionComplete" => Inbound::AuctionComplete(serde_json::from_value(data)?),
            "TimeResponse" => Inbound::TimeResponse(serde_json::from_value(data)?),
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }

    /// Parse a raw text frame into a typed message.
    pub fn parse(text: &str) -> Result<Option<Inbound>, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::decode(&envelope)
    }
}

// ---------------------------------------------------------------------------
// Outbound actions
// ---------------------------------------------------------------------------

/// Actions this client sends to the server.
///
/// These are thin envelopes; the server is authoritative and validates them
/// itself, so nothing here is checked before sending.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Clock-sync probe; carries no payload.
    TimeRequest,
    /// Nominate `player` at an opening bid.
    Pick { player: Player, bid: i64 },
    /// Bid on the player currently up for auction.
    Bid { player: Player, bid: i64 },
}

impl Outbound {
    /// Serialize to a text frame ready for the channel.
    pub fn encode(&self) -> String {
        let envelope = match self {
            Outbound::TimeRequest => serde_json::json!({
                "type": "TimeRequest",
                "data": {},
            }),
            Outbound::Pick { player, bid } => serde_json::json!({
                "type": "Pick",
                "data": { "player": player, "bid": bid },
            }),
            Outbound::Bid { player, bid } => serde_json::json!({
                "type": "Bid",
                "data": { "player": player, "bid": bid },
            }),
        };
        envelope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::position::Position;

    fn sample_player() -> Player {
        Player {
            id: 91,
            firstname: "Ben".into(),
            lastname: "Zobrist".into(),
            mlbteam: "Tampa Bay Rays".into(),
            positions: vec![Position::SecondBase, Position::Utility],
            salary: 0,
        }
    }

    #[test]
    fn parse_draft_summary() {
        let text = r#"{
            "type": "DraftSummary",
            "data": {
                "name": "Test Draft",
                "salary_cap": 13000,
                "positions": {"P": 10, "C": 2, "OF": 5, "U": 2},
                "teams": [
                    {"id": 1, "name": "RH Team", "players": []},
                    {"id": 2, "name": "Goog Team", "players": []}
                ],
                "picks": [],
                "team": 2
            }
        }"#;
        let msg = Inbound::parse(text).unwrap().unwrap();
        match msg {
            Inbound::DraftSummary(summary) => {
                assert_eq!(summary.name, "Test Draft");
                assert_eq!(summary.salary_cap, 13000);
                assert_eq!(summary.positions["P"], 10);
                assert_eq!(summary.teams.len(), 2);
                assert_eq!(summary.team, 2);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn parse_waiting_for_pick() {
        let msg = Inbound::parse(r#"{"type":"WaitingForPick","data":{"team":1}}"#)
            .unwrap()
            .unwrap();
        match msg {
            Inbound::WaitingForPick(w) => assert_eq!(w.team, 1),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn parse_auction_defaults_missing_bid_to_zero() {
        let text = r#"{
            "type": "Auction",
            "data": {
                "player": {
                    "id": 7, "firstname": "A", "lastname": "B",
                    "mlbteam": "T", "positions": ["OF"]
                },
                "team": 1,
                "end_time": "2014-06-01T00:00:30Z"
            }
        }"#;
        let msg = Inbound::parse(text).unwrap().unwrap();
        match msg {
            Inbound::Auction(a) => {
                assert_eq!(a.bid, 0);
                assert_eq!(a.team, 1);
                assert_eq!(a.player.id, 7);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_ignored_not_rejected() {
        let parsed = Inbound::parse(r#"{"type":"DraftComplete","data":{}}"#).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn missing_data_field_defaults_to_null() {
        // A bare envelope with no data still parses; the payload decode is
        // what fails (or succeeds for payload-less types).
        let parsed = Inbound::parse(r#"{"type":"SomethingNew"}"#).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let result = Inbound::parse(r#"{"type":"WaitingForPick","data":{"team":"not-a-number"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        assert!(Inbound::parse("not json at all").is_err());
        assert!(Inbound::parse(r#"{"data":{}}"#).is_err());
    }

    #[test]
    fn encode_time_request() {
        let text = Outbound::TimeRequest.encode();
        let envelope: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope.kind, "TimeRequest");
        assert_eq!(envelope.data, serde_json::json!({}));
    }

    #[test]
    fn encode_pick_carries_player_and_bid() {
        let text = Outbound::Pick {
            player: sample_player(),
            bid: 650,
        }
        .encode();
        let envelope: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope.kind, "Pick");
        assert_eq!(envelope.data["bid"], 650);
        assert_eq!(envelope.data["player"]["id"], 91);
        assert_eq!(envelope.data["player"]["positions"][0], "2B");
    }

    #[test]
    fn encode_bid_roundtrips_through_envelope() {
        let text = Outbound::Bid {
            player: sample_player(),
            bid: 700,
        }
        .encode();
        let envelope: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope.kind, "Bid");
        let player: Player = serde_json::from_value(envelope.data["player"].clone()).unwrap();
        assert_eq!(player.full_name(), "Ben Zobrist");
    }
}
