//! Static pitch geometry
//!
//! Coordinates are meters with the origin at the corner of the total
//! (margin-inclusive) rectangle. `y` grows downward, so a goal mouth runs
//! from `y_top` (smaller) to `y_bottom` (larger).

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Pitch surface, keyed into the friction table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Surface {
    #[default]
    DryGrassStandard,
    WetGrass,
    VeryWetGrass,
    RoughSandy,
    Synthetic,
    IceSuperslippery,
}

impl Surface {
    pub const ALL: [Surface; 6] = [
        Surface::DryGrassStandard,
        Surface::WetGrass,
        Surface::VeryWetGrass,
        Surface::RoughSandy,
        Surface::Synthetic,
        Surface::IceSuperslippery,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Surface::DryGrassStandard => "dry-grass-standard",
            Surface::WetGrass => "wet-grass",
            Surface::VeryWetGrass => "very-wet-grass",
            Surface::RoughSandy => "rough-sandy",
            Surface::Synthetic => "synthetic",
            Surface::IceSuperslippery => "ice-superslippery",
        }
    }

    /// Per-tick velocity retention of an uncontrolled ball
    pub fn friction(&self) -> f32 {
        match self {
            Surface::DryGrassStandard => 0.985,
            Surface::WetGrass => 0.995,
            Surface::VeryWetGrass => 0.96,
            Surface::RoughSandy => 0.92,
            Surface::Synthetic => 0.98,
            Surface::IceSuperslippery => 0.999,
        }
    }

    /// Resolve a surface key, falling back to the default for unknown keys
    pub fn from_key_or_default(key: &str) -> Self {
        key.parse().unwrap_or_else(|err| {
            log::warn!("{err}; falling back to {}", Surface::default());
            Surface::default()
        })
    }
}

impl FromStr for Surface {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Surface::ALL
            .into_iter()
            .find(|surface| surface.key() == key)
            .ok_or_else(|| SimError::InvalidSurfaceCondition(s.to_string()))
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One of the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Defends the left goal, attacks right
    Home,
    /// Defends the right goal, attacks left
    Away,
}

impl Team {
    pub fn index(&self) -> usize {
        match self {
            Team::Home => 0,
            Team::Away => 1,
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::Home => Team::Away,
            Team::Away => Team::Home,
        }
    }

    /// Unit x direction this team attacks toward
    pub fn attack_dir(&self) -> Vec2 {
        match self {
            Team::Home => Vec2::X,
            Team::Away => Vec2::NEG_X,
        }
    }
}

/// Coarse field region relative to a team's attacking direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Defensive,
    Midfield,
    Attacking,
}

/// Which wall of the total rectangle the ball hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    Left,
    Right,
    Top,
    Bottom,
}

/// Goal mouth segment on a goal line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalMouth {
    pub x: f32,
    pub y_top: f32,
    pub y_bottom: f32,
}

impl GoalMouth {
    #[inline]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.y_top && y <= self.y_bottom
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, (self.y_top + self.y_bottom) * 0.5)
    }

    /// Does the segment `from -> to` cross this goal line inside the mouth?
    ///
    /// `to` must end strictly beyond the line; stopping on it is not a crossing.
    pub fn crossed_by(&self, from: Vec2, to: Vec2) -> bool {
        let crosses = (from.x <= self.x && to.x > self.x) || (from.x >= self.x && to.x < self.x);
        if !crosses {
            return false;
        }
        let t = (self.x - from.x) / (to.x - from.x);
        self.contains_y(from.y + (to.y - from.y) * t)
    }
}

/// Immutable pitch description for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    pub width: f32,
    pub height: f32,
    pub outer_margin: f32,
    pub total_width: f32,
    pub total_height: f32,
    pub surface: Surface,
    pub friction: f32,
    pub left_goal: GoalMouth,
    pub right_goal: GoalMouth,
}

impl FieldState {
    /// Standard 100 x 75 pitch with a 3 m margin
    pub fn standard(surface: Surface) -> Self {
        Self::with_dimensions(FIELD_WIDTH, FIELD_HEIGHT, OUTER_MARGIN, surface)
    }

    pub fn with_dimensions(width: f32, height: f32, outer_margin: f32, surface: Surface) -> Self {
        let mid_y = outer_margin + height / 2.0;
        let half_goal = GOAL_WIDTH / 2.0;
        Self {
            width,
            height,
            outer_margin,
            total_width: width + 2.0 * outer_margin,
            total_height: height + 2.0 * outer_margin,
            surface,
            friction: surface.friction(),
            left_goal: GoalMouth {
                x: outer_margin,
                y_top: mid_y - half_goal,
                y_bottom: mid_y + half_goal,
            },
            right_goal: GoalMouth {
                x: outer_margin + width,
                y_top: mid_y - half_goal,
                y_bottom: mid_y + half_goal,
            },
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.total_width / 2.0, self.total_height / 2.0)
    }

    pub fn diagonal(&self) -> f32 {
        Vec2::new(self.total_width, self.total_height).length()
    }

    /// Is the point inside the margin-inclusive rectangle?
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.total_width && p.y >= 0.0 && p.y <= self.total_height
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(0.0, self.total_width),
            p.y.clamp(0.0, self.total_height),
        )
    }

    pub fn goal_defended_by(&self, team: Team) -> &GoalMouth {
        match team {
            Team::Home => &self.left_goal,
            Team::Away => &self.right_goal,
        }
    }

    pub fn goal_attacked_by(&self, team: Team) -> &GoalMouth {
        self.goal_defended_by(team.opponent())
    }

    /// Team whose own half contains `p`
    pub fn half_owner(&self, p: Vec2) -> Team {
        if p.x < self.center().x {
            Team::Home
        } else {
            Team::Away
        }
    }

    /// Progress toward the attacked goal line, over the playable width
    pub fn progress(&self, team: Team, p: Vec2) -> f32 {
        let t = ((p.x - self.outer_margin) / self.width).clamp(0.0, 1.0);
        match team {
            Team::Home => t,
            Team::Away => 1.0 - t,
        }
    }

    pub fn zone_for(&self, team: Team, p: Vec2) -> Zone {
        let progress = self.progress(team, p);
        if progress < 1.0 / 3.0 {
            Zone::Defensive
        } else if progress < 2.0 / 3.0 {
            Zone::Midfield
        } else {
            Zone::Attacking
        }
    }
}
