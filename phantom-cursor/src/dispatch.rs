//! Replaying planned input against the page.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::context::CursorContext;
use crate::page::{InputEvent, MouseButton, Page};
use crate::path::Waypoint;

/// How a replay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    Completed,
    /// The idle gate closed mid-path.
    Aborted,
    /// The page went away; the remaining waypoints were dropped.
    Disconnected,
}

/// Dispatch one pointer move per waypoint, tracking the position as it goes.
///
/// With `abort_on_move`, the idle gate is checked before every waypoint and
/// the replay stops as soon as an explicit action has closed it.
pub async fn trace_path<P: Page>(
    ctx: &CursorContext<P>,
    path: &[Waypoint],
    abort_on_move: bool,
) -> TraceOutcome {
    for waypoint in path {
        if abort_on_move && !ctx.idle_allowed() {
            debug!(target: "cursor.dispatch", cursor = %ctx.id(), "idle path interrupted");
            return TraceOutcome::Aborted;
        }
        let event = InputEvent::MouseMoved {
            x: waypoint.x,
            y: waypoint.y,
            timestamp: waypoint.timestamp,
        };
        match ctx.page().dispatch(event).await {
            Ok(()) => ctx.set_location(waypoint.point()),
            Err(error) if error.is_disconnected() => {
                debug!(target: "cursor.dispatch", cursor = %ctx.id(), "target disconnected, dropping path");
                return TraceOutcome::Disconnected;
            }
            Err(error) => {
                warn!(
                    target: "cursor.dispatch",
                    cursor = %ctx.id(),
                    x = waypoint.x,
                    y = waypoint.y,
                    %error,
                    "failed to dispatch mouse move"
                );
            }
        }
    }
    TraceOutcome::Completed
}

/// Press and release `button` at the current position.
///
/// Failures are logged; a click never fails the surrounding action.
pub async fn click_at_location<P: Page>(
    ctx: &CursorContext<P>,
    button: MouseButton,
    click_count: u32,
    wait_for_click: Duration,
) {
    let at = ctx.location();
    let press = InputEvent::MousePressed {
        x: at.x,
        y: at.y,
        button,
        click_count,
    };
    if let Err(error) = ctx.page().dispatch(press).await {
        warn!(target: "cursor.click", cursor = %ctx.id(), %error, "failed to press mouse button");
    }
    tokio::time::sleep(wait_for_click).await;
    let release = InputEvent::MouseReleased {
        x: at.x,
        y: at.y,
        button,
        click_count,
    };
    if let Err(error) = ctx.page().dispatch(release).await {
        warn!(target: "cursor.click", cursor = %ctx.id(), %error, "failed to release mouse button");
    }
}

/// `ms`, scaled by a random factor in `[0, 1)` when `randomize` is set.
pub fn delay_duration(ms: u64, randomize: bool) -> Duration {
    let factor = if randomize {
        rand::thread_rng().gen::<f64>()
    } else {
        1.0
    };
    Duration::from_secs_f64(ms as f64 * factor / 1000.0)
}

pub async fn pause(ms: u64, randomize: bool) {
    let duration = delay_duration(ms, randomize);
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_delay_is_exact() {
        assert_eq!(delay_duration(250, false), Duration::from_millis(250));
    }

    #[test]
    fn randomized_delay_never_exceeds_base() {
        for _ in 0..100 {
            assert!(delay_duration(2000, true) < Duration::from_millis(2000));
        }
    }
}
