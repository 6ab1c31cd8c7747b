//! Background wandering between explicit actions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::CursorContext;
use crate::dispatch::{delay_duration, trace_path, TraceOutcome};
use crate::geometry::BoundingBox;
use crate::math::random_box_point;
use crate::options::{BoxOptions, RandomMoveOptions};
use crate::page::{Page, PageError};
use crate::path::path;

/// Floor on the wait while the gate is closed, so a zero delay cannot spin.
const GATE_POLL: Duration = Duration::from_millis(50);

/// Spawn the idle loop. It runs until `shutdown` is cancelled or a move fails.
pub fn spawn<P: Page>(
    ctx: Arc<CursorContext<P>>,
    options: RandomMoveOptions,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(target: "cursor.idle", cursor = %ctx.id(), "random movement started");
        run(&ctx, &options, &shutdown).await;
        info!(target: "cursor.idle", cursor = %ctx.id(), "random movement stopped");
    })
}

async fn run<P: Page>(
    ctx: &CursorContext<P>,
    options: &RandomMoveOptions,
    shutdown: &CancellationToken,
) {
    while !shutdown.is_cancelled() {
        let mut wait = delay_duration(options.move_delay_ms, options.randomize_move_delay);
        if ctx.idle_allowed() {
            if let Err(error) = wander(ctx, options).await {
                warn!(target: "cursor.idle", cursor = %ctx.id(), %error, "random movement failed");
                return;
            }
        } else {
            wait = wait.max(GATE_POLL);
        }
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(wait) => {}
        }
    }
}

/// One idle move to a random point of the page area.
///
/// Only the window's size matters: pointer coordinates are page-relative,
/// so the area is anchored at the origin and the curve is kept inside it.
async fn wander<P: Page>(ctx: &CursorContext<P>, options: &RandomMoveOptions) -> Result<(), PageError> {
    let bounds = ctx.page().window_bounds().await?;
    let area = BoundingBox::new(0.0, 0.0, bounds.width, bounds.height);
    let mut waypoints = {
        let mut rng = rand::thread_rng();
        let to = random_box_point(&mut rng, &area, &BoxOptions::default());
        path(&mut rng, ctx.location(), to, &options.path)
    };
    for waypoint in &mut waypoints {
        waypoint.x = waypoint.x.min(area.width);
        waypoint.y = waypoint.y.min(area.height);
    }
    match trace_path(ctx, &waypoints, true).await {
        TraceOutcome::Disconnected => Err(PageError::Disconnected),
        outcome => {
            debug!(target: "cursor.idle", cursor = %ctx.id(), ?outcome, "idle move finished");
            Ok(())
        }
    }
}
