use arena_core::Vec3;

use crate::NavPath;

/// Planar distance at which a waypoint counts as reached.
///
/// This is a world-unit constant, not derived from the cell size; with cells
/// smaller than ten units a follower may skip waypoints.
pub const ARRIVAL_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowStatus {
    /// No path to follow.
    Idle,
    /// Head for `target`; `direction` is the unit XZ heading from the
    /// current position.
    Steering { target: Vec3, direction: Vec3 },
    /// The last waypoint was reached.
    Arrived,
}

/// Consumes a `NavPath` one waypoint at a time.
///
/// Waypoint 0 is where the unit already stands, so following starts at
/// waypoint 1. A waypoint is reached when the unit gets within the arrival
/// distance, or as soon as the distance to it grows again (the unit overshot).
#[derive(Debug, Clone)]
pub struct PathFollower {
    path: Option<NavPath>,
    next_index: usize,
    prev_distance: f32,
    arrival_distance: f32,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self {
            path: None,
            next_index: 1,
            prev_distance: f32::MAX,
            arrival_distance: ARRIVAL_DISTANCE,
        }
    }
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arrival_distance(mut self, arrival_distance: f32) -> Self {
        self.arrival_distance = arrival_distance;
        self
    }

    pub fn set_path(&mut self, path: NavPath) {
        self.path = Some(path);
        self.next_index = 1;
        self.prev_distance = f32::MAX;
    }

    pub fn clear(&mut self) {
        self.path = None;
    }

    pub fn path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    pub fn current_target(&self) -> Option<Vec3> {
        self.path
            .as_ref()
            .and_then(|p| p.points.get(self.next_index).copied())
    }

    /// Advance at most one waypoint and report where to head next.
    pub fn update(&mut self, position: Vec3) -> FollowStatus {
        let Some(path) = &self.path else {
            return FollowStatus::Idle;
        };
        let Some(&target) = path.points.get(self.next_index) else {
            return FollowStatus::Arrived;
        };

        let distance = position.distance_xz(target);
        let overshot = distance > self.prev_distance;
        self.prev_distance = distance;

        let target = if overshot || distance < self.arrival_distance {
            self.next_index += 1;
            self.prev_distance = f32::MAX;
            match path.points.get(self.next_index) {
                Some(&next) => next,
                None => return FollowStatus::Arrived,
            }
        } else {
            target
        };

        FollowStatus::Steering {
            target,
            direction: (target - position).flatten().normalize_or_zero(),
        }
    }
}
