use crate::database::repository::SettingsRepo;
use crate::errors::Result;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(MoveDirection::Up),
            "down" => Some(MoveDirection::Down),
            _ => None,
        }
    }
}

/// Planned position writes: `(league_id, new_position)` pairs.
type PositionUpdates = Vec<(i64, i32)>;

/// Swap with the neighbouring league in position order. None at either
/// boundary or when the league is unknown.
pub fn plan_swap(
    ordered: &[(i64, i32)],
    league_id: i64,
    direction: MoveDirection,
) -> Option<PositionUpdates> {
    let index = ordered.iter().position(|(id, _)| *id == league_id)?;

    let target = match direction {
        MoveDirection::Up if index > 0 => index - 1,
        MoveDirection::Down if index + 1 < ordered.len() => index + 1,
        _ => return None,
    };

    Some(vec![
        (ordered[index].0, ordered[target].1),
        (ordered[target].0, ordered[index].1),
    ])
}

/// Absolute repositioning with shift semantics. The requested position is
/// clamped to `[1, N]`. When the slot is free the league is assigned
/// directly; when occupied, every league strictly between the old and new
/// position shifts by one to close the gap, so positions stay a
/// contiguous permutation of 1..N.
pub fn plan_reposition(
    ordered: &[(i64, i32)],
    league_id: i64,
    new_position: i32,
) -> Option<PositionUpdates> {
    if ordered.is_empty() {
        return None;
    }

    let (_, current_position) = *ordered.iter().find(|(id, _)| *id == league_id)?;
    let new_position = new_position.clamp(1, ordered.len() as i32);

    if new_position == current_position {
        return Some(vec![]);
    }

    let occupied = ordered
        .iter()
        .any(|(id, pos)| *id != league_id && *pos == new_position);

    let mut updates = vec![(league_id, new_position)];
    if !occupied {
        return Some(updates);
    }

    if new_position > current_position {
        // Moving down the list: (old, new] shift up by one
        for (id, pos) in ordered {
            if *id != league_id && *pos > current_position && *pos <= new_position {
                updates.push((*id, pos - 1));
            }
        }
    } else {
        // Moving up the list: [new, old) shift down by one
        for (id, pos) in ordered {
            if *id != league_id && *pos >= new_position && *pos < current_position {
                updates.push((*id, pos + 1));
            }
        }
    }

    Some(updates)
}

/// Maintains the dense 1-based `position` ordering across all league
/// settings documents.
pub struct PositionManager {
    settings: SettingsRepo,
}

impl PositionManager {
    pub fn new(state: &AppState) -> Self {
        PositionManager {
            settings: SettingsRepo::new(&state.db),
        }
    }

    async fn ordered(&self) -> Result<Vec<(i64, i32)>> {
        let all = self.settings.all_by_position().await?;
        Ok(all
            .iter()
            .enumerate()
            .map(|(i, s)| (s.league_id, s.position.unwrap_or(i as i32 + 1)))
            .collect())
    }

    pub async fn move_league(&self, league_id: i64, direction: MoveDirection) -> Result<bool> {
        let ordered = self.ordered().await?;
        match plan_swap(&ordered, league_id, direction) {
            Some(updates) => {
                self.apply(updates).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn set_position(&self, league_id: i64, new_position: i32) -> Result<bool> {
        let ordered = self.ordered().await?;
        match plan_reposition(&ordered, league_id, new_position) {
            Some(updates) => {
                self.apply(updates).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply(&self, updates: PositionUpdates) -> Result<()> {
        for (league_id, position) in updates {
            self.settings.set_position(league_id, position).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn five_leagues() -> Vec<(i64, i32)> {
        vec![(10, 1), (20, 2), (7, 3), (30, 4), (40, 5)]
    }

    /// Applies planned updates and asserts positions stay a contiguous
    /// permutation of 1..N.
    fn apply_and_check(ordered: &[(i64, i32)], updates: PositionUpdates) -> BTreeMap<i64, i32> {
        let mut result: BTreeMap<i64, i32> = ordered.iter().cloned().collect();
        for (id, pos) in updates {
            result.insert(id, pos);
        }
        let mut positions: Vec<i32> = result.values().cloned().collect();
        positions.sort_unstable();
        let expected: Vec<i32> = (1..=ordered.len() as i32).collect();
        assert_eq!(positions, expected, "positions must stay a permutation of 1..N");
        result
    }

    #[test]
    fn swap_up_exchanges_with_previous() {
        let ordered = five_leagues();
        let updates = plan_swap(&ordered, 7, MoveDirection::Up).unwrap();
        let result = apply_and_check(&ordered, updates);
        assert_eq!(result[&7], 2);
        assert_eq!(result[&20], 3);
    }

    #[test]
    fn swap_down_exchanges_with_next() {
        let ordered = five_leagues();
        let updates = plan_swap(&ordered, 7, MoveDirection::Down).unwrap();
        let result = apply_and_check(&ordered, updates);
        assert_eq!(result[&7], 4);
        assert_eq!(result[&30], 3);
    }

    #[test]
    fn swap_at_boundaries_fails() {
        let ordered = five_leagues();
        assert!(plan_swap(&ordered, 10, MoveDirection::Up).is_none());
        assert!(plan_swap(&ordered, 40, MoveDirection::Down).is_none());
        assert!(plan_swap(&ordered, 999, MoveDirection::Up).is_none());
    }

    #[test]
    fn reposition_upward_shifts_block_down() {
        // League 7 at position 5 moves to 3; previous 3 and 4 become 4 and 5
        let ordered = vec![(10, 1), (20, 2), (30, 3), (40, 4), (7, 5)];
        let updates = plan_reposition(&ordered, 7, 3).unwrap();
        let result = apply_and_check(&ordered, updates);
        assert_eq!(result[&7], 3);
        assert_eq!(result[&30], 4);
        assert_eq!(result[&40], 5);
        assert_eq!(result[&10], 1);
        assert_eq!(result[&20], 2);
    }

    #[test]
    fn reposition_downward_shifts_block_up() {
        let ordered = five_leagues(); // league 20 at 2
        let updates = plan_reposition(&ordered, 20, 4).unwrap();
        let result = apply_and_check(&ordered, updates);
        assert_eq!(result[&20], 4);
        assert_eq!(result[&7], 2);
        assert_eq!(result[&30], 3);
        assert_eq!(result[&40], 5);
    }

    #[test]
    fn reposition_clamps_past_the_end() {
        let ordered = five_leagues();
        let updates = plan_reposition(&ordered, 10, 99).unwrap();
        let result = apply_and_check(&ordered, updates);
        assert_eq!(result[&10], 5);
    }

    #[test]
    fn reposition_clamps_below_one() {
        let ordered = five_leagues();
        let updates = plan_reposition(&ordered, 30, -2).unwrap();
        let result = apply_and_check(&ordered, updates);
        assert_eq!(result[&30], 1);
    }

    #[test]
    fn reposition_to_current_slot_is_a_noop() {
        let ordered = five_leagues();
        let updates = plan_reposition(&ordered, 7, 3).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn reposition_unknown_league_fails() {
        assert!(plan_reposition(&five_leagues(), 999, 2).is_none());
    }

    #[test]
    fn direction_parsing() {
        assert_eq!(MoveDirection::parse("up"), Some(MoveDirection::Up));
        assert_eq!(MoveDirection::parse("down"), Some(MoveDirection::Down));
        assert_eq!(MoveDirection::parse("sideways"), None);
    }
}
