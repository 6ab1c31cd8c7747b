//! Per-action options and the cursor-wide defaults they are drawn from.
//!
//! Every struct deserializes with `#[serde(default)]`, so configuration files
//! only need to name the fields they change. Delays are whole milliseconds.

use serde::{Deserialize, Serialize};

use crate::math::Vector;
use crate::page::MouseButton;

/// Shape and pacing of a planned path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    /// Lateral spread of the curve; derived from the distance when unset.
    pub spread_override: Option<f64>,
    /// `0`/unset picks a random speed; larger values mean fewer steps.
    pub move_speed: Option<f64>,
    /// Attach dispatch timestamps to every waypoint.
    pub use_timestamps: bool,
}

/// Where inside an element's box to aim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxOptions {
    /// Percentage of width/height excluded around the edges (0–100).
    pub padding_percentage: Option<f64>,
    /// Fixed offset from the box origin instead of a random point.
    pub destination: Option<Vector>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetElementOptions {
    /// Wait this long for the selector before giving up; query once if unset.
    pub wait_for_selector_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollOptions {
    /// 1–100. Below 90 it is the pixel size of a wheel step; 100 scrolls in one step.
    pub scroll_speed: f64,
    /// Pause after the last wheel event.
    pub scroll_delay_ms: u64,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            scroll_speed: 100.0,
            scroll_delay_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollIntoViewOptions {
    #[serde(flatten)]
    pub scroll: ScrollOptions,
    #[serde(flatten)]
    pub element: GetElementOptions,
    /// Extra room required around the element before it counts as visible.
    pub in_viewport_margin: f64,
}

/// Options for moving onto an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveOptions {
    #[serde(flatten)]
    pub path: PathOptions,
    #[serde(flatten)]
    pub target: BoxOptions,
    #[serde(flatten)]
    pub scroll: ScrollIntoViewOptions,
    /// Pause after the move.
    pub move_delay_ms: u64,
    /// Scale `move_delay_ms` by a random factor in `[0, 1)`.
    pub randomize_move_delay: bool,
    /// Attempts before giving up on an element that keeps moving.
    pub max_tries: u32,
    /// Distance above which the move overshoots and corrects.
    pub overshoot_threshold: f64,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            path: PathOptions::default(),
            target: BoxOptions::default(),
            scroll: ScrollIntoViewOptions::default(),
            move_delay_ms: 0,
            randomize_move_delay: true,
            max_tries: 10,
            overshoot_threshold: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickOptions {
    /// Options for the move onto the target; its own delay is ignored.
    #[serde(rename = "move")]
    pub movement: MoveOptions,
    /// Pause between arriving and pressing.
    pub hesitate_ms: u64,
    /// Pause between press and release.
    pub wait_for_click_ms: u64,
    /// Pause after releasing.
    pub move_delay_ms: u64,
    pub randomize_move_delay: bool,
    pub button: MouseButton,
    pub click_count: u32,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            movement: MoveOptions::default(),
            hesitate_ms: 0,
            wait_for_click_ms: 0,
            move_delay_ms: 2000,
            randomize_move_delay: true,
            button: MouseButton::Left,
            click_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveToOptions {
    #[serde(flatten)]
    pub path: PathOptions,
    pub move_delay_ms: u64,
    pub randomize_move_delay: bool,
}

impl Default for MoveToOptions {
    fn default() -> Self {
        Self {
            path: PathOptions::default(),
            move_delay_ms: 0,
            randomize_move_delay: true,
        }
    }
}

/// Options for the idle-movement scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomMoveOptions {
    #[serde(flatten)]
    pub path: PathOptions,
    /// Pause between idle moves.
    pub move_delay_ms: u64,
    pub randomize_move_delay: bool,
}

impl Default for RandomMoveOptions {
    fn default() -> Self {
        Self {
            path: PathOptions::default(),
            move_delay_ms: 2000,
            randomize_move_delay: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeOptions {
    /// Probability of typing a wrong character first and correcting it.
    pub mistake_rate: f64,
    pub min_keystroke_delay_ms: u64,
    pub max_keystroke_delay_ms: u64,
    /// Probability of a longer pause after any character.
    pub thinking_probability: f64,
    pub min_thinking_ms: u64,
    pub max_thinking_ms: u64,
    /// Click the target before typing.
    #[serde(flatten)]
    pub click: ClickOptions,
}

impl Default for TypeOptions {
    fn default() -> Self {
        Self {
            mistake_rate: 0.0,
            min_keystroke_delay_ms: 50,
            max_keystroke_delay_ms: 150,
            thinking_probability: 0.1,
            min_thinking_ms: 500,
            max_thinking_ms: 1500,
            click: ClickOptions::default(),
        }
    }
}

/// Defaults a cursor falls back to when a call passes no options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultOptions {
    #[serde(rename = "move")]
    pub movement: MoveOptions,
    pub move_to: MoveToOptions,
    pub click: ClickOptions,
    pub scroll: ScrollOptions,
    pub scroll_into_view: ScrollIntoViewOptions,
    pub get_element: GetElementOptions,
    pub random_move: RandomMoveOptions,
    pub typing: TypeOptions,
}
