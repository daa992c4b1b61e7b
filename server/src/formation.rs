use soccer_shared::config::FieldConfig;
use soccer_shared::protocol::Team;
use soccer_shared::vec2::Vec2;
use std::collections::VecDeque;

/// Spawn points for one side of the pitch plus the pool of free slot indices.
#[derive(Debug, Clone)]
struct TeamSlots {
    spawns: Vec<Vec2>,
    free: VecDeque<usize>,
}

impl TeamSlots {
    fn new(spawns: Vec<Vec2>) -> Self {
        let free = (0..spawns.len()).collect();
        Self { spawns, free }
    }
}

/// Formation manager.
/// Hands out (team, slot) pairs to joining players and takes them back on leave.
#[derive(Debug, Clone)]
pub struct Formation {
    home: TeamSlots,
    away: TeamSlots,
}

impl Formation {
    /// Three-player formation: one central, two flanking the goal mouth.
    pub fn new(field: &FieldConfig) -> Self {
        let cy = field.center().y;
        let left = field.left();
        let right = field.right();
        let side = field.goal_side;

        let home = vec![
            Vec2::new(left + 200.0, cy),
            Vec2::new(left + 300.0, cy - side),
            Vec2::new(left + 300.0, cy + side),
        ];
        let away = vec![
            Vec2::new(right - 200.0, cy),
            Vec2::new(right - 300.0, cy - side),
            Vec2::new(right - 300.0, cy + side),
        ];

        Self {
            home: TeamSlots::new(home),
            away: TeamSlots::new(away),
        }
    }

    fn side(&self, team: Team) -> &TeamSlots {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }

    fn side_mut(&mut self, team: Team) -> &mut TeamSlots {
        match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        }
    }

    /// Allocate a slot on the team with more free places (home wins ties).
    /// Returns None when both teams are full.
    pub fn allocate(&mut self) -> Option<(Team, usize)> {
        if self.home.free.is_empty() && self.away.free.is_empty() {
            return None;
        }

        let team = if self.home.free.len() >= self.away.free.len() {
            Team::Home
        } else {
            Team::Away
        };
        let slot = self.side_mut(team).free.pop_front()?;
        Some((team, slot))
    }

    /// Release a slot back to its team's pool. Releasing a slot that is
    /// already free or out of range does nothing.
    pub fn release(&mut self, team: Team, slot: usize) {
        let side = self.side_mut(team);
        if slot < side.spawns.len() && !side.free.contains(&slot) {
            side.free.push_back(slot);
        }
    }

    /// Spawn coordinate for a slot.
    pub fn spawn(&self, team: Team, slot: usize) -> Option<Vec2> {
        self.side(team).spawns.get(slot).copied()
    }

    /// Number of free slots for a team
    pub fn available_count(&self, team: Team) -> usize {
        self.side(team).free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn formation() -> Formation {
        Formation::new(&FieldConfig::default())
    }

    #[test]
    fn spawns_mirror_across_center() {
        let f = formation();
        let field = FieldConfig::default();
        for slot in 0..3 {
            let home = f.spawn(Team::Home, slot).unwrap();
            let away = f.spawn(Team::Away, slot).unwrap();
            assert!((home.x - field.left() - (field.right() - away.x)).abs() < 1e-9);
            assert_eq!(home.y, away.y);
        }
        assert_eq!(f.spawn(Team::Home, 0), Some(Vec2::new(600.0, 775.0)));
        assert_eq!(f.spawn(Team::Away, 1), Some(Vec2::new(1200.0, 650.0)));
        assert_eq!(f.spawn(Team::Home, 3), None);
    }

    #[test]
    fn alternates_teams_home_first() {
        let mut f = formation();
        let teams: Vec<Team> = (0..4).map(|_| f.allocate().unwrap().0).collect();
        assert_eq!(teams, vec![Team::Home, Team::Away, Team::Home, Team::Away]);
        assert_eq!(f.available_count(Team::Home), 1);
        assert_eq!(f.available_count(Team::Away), 1);
    }

    #[test]
    fn allocates_unique_slots_until_full() {
        let mut f = formation();
        let mut seen = HashSet::new();
        for _ in 0..6 {
            let pair = f.allocate().unwrap();
            assert!(seen.insert(pair), "slot {:?} issued twice", pair);
        }
        assert!(f.allocate().is_none());
    }

    #[test]
    fn released_slot_is_reused_once() {
        let mut f = formation();
        let allocated: Vec<_> = (0..6).map(|_| f.allocate().unwrap()).collect();
        let (team, slot) = allocated[2];

        f.release(team, slot);
        f.release(team, slot);
        assert_eq!(f.available_count(team), 1);

        assert_eq!(f.allocate(), Some((team, slot)));
        assert!(f.allocate().is_none());
    }

    #[test]
    fn released_slot_goes_to_back_of_pool() {
        let mut f = formation();
        // Home takes slot 0, away takes slot 0
        let (team, slot) = f.allocate().unwrap();
        assert_eq!((team, slot), (Team::Home, 0));
        f.allocate().unwrap();

        f.release(Team::Home, 0);
        // Home pool is now [1, 2, 0] and wins the tie at 3 vs 2
        assert_eq!(f.allocate(), Some((Team::Home, 1)));
    }

    #[test]
    fn release_out_of_range_is_ignored() {
        let mut f = formation();
        f.release(Team::Away, 9);
        assert_eq!(f.available_count(Team::Away), f.away.spawns.len());
    }
}
