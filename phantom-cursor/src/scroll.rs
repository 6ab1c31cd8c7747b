//! Wheel scrolling: delta decomposition, scroll-into-view and scroll-to.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::CursorContext;
use crate::error::Result;
use crate::geometry::element_box;
use crate::math::{scale, Vector};
use crate::options::{ScrollIntoViewOptions, ScrollOptions};
use crate::page::{InputEvent, Page, PageError};

/// Speed at and above which steps grow towards a single jump.
const FAST_SCROLL_SPEED: f64 = 90.0;

const METRICS_SCRIPT: &str = "const d = document.documentElement; return { \
     viewportWidth: d.clientWidth, viewportHeight: d.clientHeight, \
     docWidth: d.scrollWidth, docHeight: d.scrollHeight, \
     scrollX: window.scrollX, scrollY: window.scrollY };";

const SCROLL_INTO_VIEW_SCRIPT: &str =
    "arguments[0].scrollIntoView({ block: 'center' }); return null;";

/// Where [`scroll_to`] should go.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDestination {
    Top,
    Bottom,
    Left,
    Right,
    /// Absolute scroll position; a missing axis stays where it is.
    #[serde(untagged)]
    Position { x: Option<f64>, y: Option<f64> },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMetrics {
    viewport_width: f64,
    viewport_height: f64,
    doc_width: f64,
    doc_height: f64,
    scroll_x: f64,
    scroll_y: f64,
}

async fn page_metrics<P: Page>(page: &P) -> Result<PageMetrics, PageError> {
    let value = page.evaluate(METRICS_SCRIPT).await?;
    serde_json::from_value(value).map_err(|e| PageError::Script(e.to_string()))
}

/// Split `delta` into per-event wheel deltas, whole pixels.
///
/// The larger axis moves `scroll_speed` pixels per event below speed 90;
/// from 90 to 100 the step grows linearly up to the full distance. The other
/// axis is spread evenly and remainders land on the final event, so the
/// steps always sum to the rounded delta.
///
/// ```
/// use phantom_cursor::{math::Vector, scroll::plan_scroll};
///
/// let steps = plan_scroll(Vector::new(0.0, 1000.0), 100.0);
/// assert_eq!(steps, vec![(0, 1000)]);
/// ```
pub fn plan_scroll(delta: Vector, scroll_speed: f64) -> Vec<(i64, i64)> {
    let (dx, dy) = (delta.x.round() as i64, delta.y.round() as i64);
    let y_primary = dy.abs() > dx.abs();
    let (primary, secondary) = if y_primary {
        (dy.abs(), dx.abs())
    } else {
        (dx.abs(), dy.abs())
    };
    if primary == 0 {
        return Vec::new();
    }

    let raw_step = if scroll_speed < FAST_SCROLL_SPEED {
        scroll_speed
    } else {
        scale(
            scroll_speed,
            (FAST_SCROLL_SPEED, 100.0),
            (FAST_SCROLL_SPEED, primary as f64),
        )
    };
    let step = (raw_step.round() as i64).clamp(1, primary);
    let num_steps = primary / step;
    let secondary_step = secondary / num_steps;

    let mut steps = vec![(step, secondary_step); num_steps as usize];
    if let Some(last) = steps.last_mut() {
        last.0 += primary - step * num_steps;
        last.1 += secondary - secondary_step * num_steps;
    }
    steps
        .into_iter()
        .map(|(p, s)| {
            let (x, y) = if y_primary { (s, p) } else { (p, s) };
            (x * dx.signum(), y * dy.signum())
        })
        .collect()
}

/// Wheel-scroll by `delta` at the current pointer position.
pub async fn scroll<P: Page>(
    ctx: &CursorContext<P>,
    delta: Vector,
    options: &ScrollOptions,
) -> Result<(), PageError> {
    let steps = plan_scroll(delta, options.scroll_speed);
    debug!(
        target: "cursor.scroll",
        cursor = %ctx.id(),
        dx = delta.x,
        dy = delta.y,
        steps = steps.len(),
        "scrolling"
    );
    let at = ctx.location();
    for (delta_x, delta_y) in steps {
        ctx.page()
            .dispatch(InputEvent::MouseWheel {
                x: at.x,
                y: at.y,
                delta_x: delta_x as f64,
                delta_y: delta_y as f64,
            })
            .await?;
    }
    tokio::time::sleep(Duration::from_millis(options.scroll_delay_ms)).await;
    Ok(())
}

/// Scroll so the whole document position `destination` is reached.
pub async fn scroll_to<P: Page>(
    ctx: &CursorContext<P>,
    destination: ScrollDestination,
    options: &ScrollOptions,
) -> Result<(), PageError> {
    let metrics = page_metrics(ctx.page()).await?;
    let (to_x, to_y) = match destination {
        ScrollDestination::Top => (None, Some(0.0)),
        ScrollDestination::Bottom => (None, Some(metrics.doc_height)),
        ScrollDestination::Left => (Some(0.0), None),
        ScrollDestination::Right => (Some(metrics.doc_width), None),
        ScrollDestination::Position { x, y } => (x, y),
    };
    let delta = Vector::new(
        to_x.map_or(0.0, |x| x - metrics.scroll_x),
        to_y.map_or(0.0, |y| y - metrics.scroll_y),
    );
    scroll(ctx, delta, options).await
}

/// Delta that brings `target` (viewport-relative edges) into the viewport.
fn manual_delta(target: [f64; 4], metrics: &PageMetrics) -> Vector {
    let [top, left, bottom, right] = target;
    let dy = if top < 0.0 {
        top
    } else if bottom > metrics.viewport_height {
        bottom - metrics.viewport_height
    } else {
        0.0
    };
    let dx = if left < 0.0 {
        left
    } else if right > metrics.viewport_width {
        right - metrics.viewport_width
    } else {
        0.0
    };
    Vector::new(dx, dy)
}

/// Scroll until `element`, padded by `in_viewport_margin`, is visible.
///
/// Speed 100 without margin asks the page to scroll natively; any other
/// configuration, or a native failure, scrolls with the wheel. If that fails
/// too, the element is scrolled to the centre through the DOM.
pub async fn scroll_into_view<P: Page>(
    ctx: &CursorContext<P>,
    element: &P::Element,
    options: &ScrollIntoViewOptions,
) -> Result<()> {
    let page = ctx.page();
    let metrics = page_metrics(page).await?;
    let bbox = element_box(page, element, false).await?;
    let margin = options.in_viewport_margin;

    // Margined box, restricted to the document.
    let target = [
        (bbox.y - margin).max(-metrics.scroll_y),
        (bbox.x - margin).max(-metrics.scroll_x),
        (bbox.y + bbox.height + margin).min(metrics.doc_height - metrics.scroll_y),
        (bbox.x + bbox.width + margin).min(metrics.doc_width - metrics.scroll_x),
    ];
    let [top, left, bottom, right] = target;
    if top >= 0.0
        && left >= 0.0
        && bottom <= metrics.viewport_height
        && right <= metrics.viewport_width
    {
        return Ok(());
    }

    let scroll_options = &options.scroll;
    let manual = || scroll(ctx, manual_delta(target, &metrics), scroll_options);
    let scrolled = if scroll_options.scroll_speed == 100.0 && margin <= 0.0 {
        match page.scroll_into_view_if_needed(element).await {
            Ok(()) => Ok(()),
            Err(error) => {
                debug!(target: "cursor.scroll", %error, "native scroll failed, scrolling manually");
                manual().await
            }
        }
    } else {
        manual().await
    };

    if let Err(error) = scrolled {
        if error.is_disconnected() {
            return Err(error.into());
        }
        warn!(target: "cursor.scroll", cursor = %ctx.id(), %error, "falling back to DOM scrollIntoView");
        page.evaluate_on(element, SCROLL_INTO_VIEW_SCRIPT).await?;
    }
    Ok(())
}
