// Roster feasibility: which position slots a team can still legally fill.

use std::collections::HashMap;

use super::player::Player;
use super::position::{Position, ALL_POSITIONS};

/// A single slot in a displayable roster layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterSlot {
    /// The position designation of this slot.
    pub position: Position,
    /// The player occupying this slot, if any.
    pub player: Option<Player>,
}

/// Key identifying which condition a cached witness layout satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LayoutKey {
    /// Some legal assignment of every current player exists.
    Default,
    /// A legal assignment exists that leaves at least one slot unfilled at
    /// this position.
    OpenAt(Position),
}

/// Result of the roster feasibility search for one team.
///
/// Produced by [`Feasibility::solve`] and cached on the team; recomputed
/// whenever a player is added (adding one player can change which slots are
/// reachable for every player already assigned, so the result is not
/// incrementally updatable).
#[derive(Debug, Clone, Default)]
pub struct Feasibility {
    layouts: HashMap<LayoutKey, Vec<RosterSlot>>,
    draftable: Vec<Position>,
}

impl Feasibility {
    /// Run the assignment search for `players` against the per-position slot
    /// requirements.
    ///
    /// Exhaustive backtracking over players in list order, branching over
    /// each player's eligible positions (in eligibility-list order) that
    /// still have spare capacity. The first complete assignment reached
    /// becomes the `default` witness; the first complete assignment leaving a
    /// slot open at position `P` becomes the witness for `P`. The search
    /// stops once every possible witness has been recorded, or when the tree
    /// is exhausted. This is an existence search: any single valid assignment
    /// per condition suffices, and first-found is deterministic with respect
    /// to the traversal order above.
    ///
    /// Positions a player lists that carry no slot requirement contribute no
    /// branch.
    pub fn solve(required: &HashMap<Position, usize>, players: &[Player]) -> Self {
        let assigned = required
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&pos, _)| (pos, Vec::new()))
            .collect::<HashMap<_, _>>();
        // One witness per position with a nonzero requirement, plus the
        // default witness. Not every key is necessarily reachable; the
        // search simply exhausts the tree in that case.
        let max_witnesses = 1 + assigned.len();

        let mut search = Search {
            required,
            players,
            assigned,
            layouts: HashMap::new(),
            max_witnesses,
        };
        search.explore(0);

        let draftable = ALL_POSITIONS
            .iter()
            .copied()
            .filter(|&pos| search.layouts.contains_key(&LayoutKey::OpenAt(pos)))
            .collect();

        Feasibility {
            layouts: search.layouts,
            draftable,
        }
    }

    /// Whether at least one legal assignment of all current players exists.
    pub fn is_feasible(&self) -> bool {
        self.layouts.contains_key(&LayoutKey::Default)
    }

    /// Positions at which the team could legally receive one more player,
    /// in canonical display order.
    pub fn draftable_positions(&self) -> &[Position] {
        &self.draftable
    }

    /// Whether some legal assignment leaves a slot unfilled at `pos`.
    pub fn has_open_slot(&self, pos: Position) -> bool {
        self.layouts.contains_key(&LayoutKey::OpenAt(pos))
    }

    /// The witness layout for display: slots in canonical position order,
    /// each position padded with empty slots up to its required count.
    ///
    /// `None` requests the default layout; `Some(pos)` requests the layout
    /// that keeps a slot open at `pos`. Returns `None` when no witness was
    /// found for the requested condition.
    pub fn roster(&self, open_at: Option<Position>) -> Option<&[RosterSlot]> {
        let key = match open_at {
            Some(pos) => LayoutKey::OpenAt(pos),
            None => LayoutKey::Default,
        };
        self.layouts.get(&key).map(|slots| slots.as_slice())
    }
}

/// Mutable state for one backtracking run.
struct Search<'a> {
    required: &'a HashMap<Position, usize>,
    players: &'a [Player],
    /// Partial assignment: position -> indices into `players`, in assignment
    /// order. Mutated in place with push/pop around each recursive call.
    assigned: HashMap<Position, Vec<usize>>,
    layouts: HashMap<LayoutKey, Vec<RosterSlot>>,
    max_witnesses: usize,
}

impl Search<'_> {
    fn explore(&mut self, next: usize) {
        if self.layouts.len() == self.max_witnesses {
            return;
        }
        if next == self.players.len() {
            self.record_leaf();
            return;
        }
        for k in 0..self.players[next].positions.len() {
            let pos = self.players[next].positions[k];
            let capacity = self.required.get(&pos).copied().unwrap_or(0);
            let filled = self.assigned.get(&pos).map_or(capacity, Vec::len);
            if filled < capacity {
                self.assigned.get_mut(&pos).expect("required position").push(next);
                self.explore(next + 1);
                self.assigned.get_mut(&pos).expect("required position").pop();
            }
        }
    }

    /// Every player is assigned; keep first-found witnesses for any
    /// conditions this leaf satisfies.
    fn record_leaf(&mut self) {
        if !self.layouts.contains_key(&LayoutKey::Default) {
            let layout = self.layout();
            self.layouts.insert(LayoutKey::Default, layout);
        }
        let open: Vec<Position> = self
            .assigned
            .iter()
            .filter(|&(pos, filled)| filled.len() < self.required[pos])
            .map(|(&pos, _)| pos)
            .collect();
        for pos in open {
            let key = LayoutKey::OpenAt(pos);
            if !self.layouts.contains_key(&key) {
                let layout = self.layout();
                self.layouts.insert(key, layout);
            }
        }
    }

    /// Materialize the current assignment as a padded display layout.
    fn layout(&self) -> Vec<RosterSlot> {
        let mut slots = Vec::new();
        for pos in ALL_POSITIONS {
            let capacity = self.required.get(&pos).copied().unwrap_or(0);
            let mut empty = capacity;
            if let Some(indices) = self.assigned.get(&pos) {
                for &idx in indices {
                    slots.push(RosterSlot {
                        position: pos,
                        player: Some(self.players[idx].clone()),
                    });
                    empty -= 1;
                }
            }
            for _ in 0..empty {
                slots.push(RosterSlot {
                    position: pos,
                    player: None,
                });
            }
        }
        slots
    }
}
