// Player lookup collaborator.

use async_trait::async_trait;

use crate::draft::player::Player;

/// Query-by-name lookup against an external player directory.
///
/// Implementations are opaque I/O; records come back in the same shape the
/// entity model consumes, ready for nomination.
#[async_trait]
pub trait PlayerSearch: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<Player>>;
}

/// Fixed in-memory directory. Serves tests and offline drafts where the
/// player pool is known up front.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    players: Vec<Player>,
}

impl StaticDirectory {
    pub fn new(players: Vec<Player>) -> Self {
        StaticDirectory { players }
    }
}

#[async_trait]
impl PlayerSearch for StaticDirectory {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<Player>> {
        let needle = query.to_lowercase();
        Ok(self
            .players
            .iter()
            .filter(|p| p.full_name().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::position::Position;

    fn directory() -> StaticDirectory {
        let player = |id, first: &str, last: &str| Player {
            id,
            firstname: first.into(),
            lastname: last.into(),
            mlbteam: "TST".into(),
            positions: vec![Position::Utility],
            salary: 0,
        };
        StaticDirectory::new(vec![
            player(1, "Ben", "Zobrist"),
            player(2, "Evan", "Longoria"),
        ])
    }

    #[tokio::test]
    async fn search_matches_substring_case_insensitive() {
        let dir = directory();
        let hits = dir.search("zobr").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        let hits = dir.search("EVAN LONG").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[tokio::test]
    async fn search_with_no_match_is_empty() {
        let dir = directory();
        assert!(dir.search("trout").await.unwrap().is_empty());
    }
}
