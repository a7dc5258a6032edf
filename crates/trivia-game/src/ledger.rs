//! Per-player scores. Outlives rounds; only an explicit end-game clears it.

use trivia_protocol::{Player, PlayerId};

/// One player's line in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub player: PlayerId,
    /// Name the player last scored under.
    pub name: String,
    pub score: u32,
}

/// Player → score, kept in arrival order so ties rank first-come first.
#[derive(Debug, Default)]
pub struct ScoreLedger {
    entries: Vec<LedgerEntry>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one point and returns the new score.
    pub fn increment(&mut self, player: &Player) -> u32 {
        match self.entries.iter_mut().find(|e| e.player == player.id) {
            Some(entry) => {
                entry.score += 1;
                entry.name.clone_from(&player.name);
                entry.score
            }
            None => {
                self.entries.push(LedgerEntry {
                    player: player.id,
                    name: player.name.clone(),
                    score: 1,
                });
                1
            }
        }
    }

    /// Score of `player`, 0 if they never scored.
    pub fn get(&self, player: PlayerId) -> u32 {
        self.entries
            .iter()
            .find(|e| e.player == player)
            .map_or(0, |e| e.score)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries by score, highest first. Stable: equal scores keep arrival
    /// order.
    pub fn snapshot(&self) -> Vec<LedgerEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted
    }

    /// `1. alice: 3 points` lines, or `None` when nobody has scored.
    pub fn rankings(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .snapshot()
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {}: {} points", i + 1, e.name, e.score))
            .collect();
        Some(lines.join("\n"))
    }
}
