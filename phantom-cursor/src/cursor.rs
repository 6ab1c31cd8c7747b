//! The public cursor: one per page, owning its position and idle loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::context::CursorContext;
use crate::dispatch::{click_at_location, pause, trace_path, TraceOutcome};
use crate::error::{CursorError, Result};
use crate::geometry::{element_box, get_element, intersects_box};
use crate::math::{random_box_point, Vector};
use crate::options::{
    ClickOptions, DefaultOptions, GetElementOptions, MoveOptions, MoveToOptions,
    ScrollIntoViewOptions, ScrollOptions, TypeOptions,
};
use crate::page::Page;
use crate::path::{path, plan_move};
use crate::scroll::{self, ScrollDestination};
use crate::typing;

/// What an action is aimed at.
#[derive(Debug, Clone)]
pub enum Target<E> {
    /// CSS selector, or XPath when it starts with `//` or `(//`.
    Selector(String),
    Element(E),
}

impl<E> Target<E> {
    pub fn element(element: E) -> Self {
        Target::Element(element)
    }
}

impl<E> From<&str> for Target<E> {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl<E> From<String> for Target<E> {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

/// A human-looking pointer and keyboard bound to one page.
///
/// Explicit actions pause the idle loop for their duration and restore it
/// afterwards. Dropping the cursor stops the idle loop.
pub struct Cursor<P: Page> {
    ctx: Arc<CursorContext<P>>,
    shutdown: CancellationToken,
    idle: Option<JoinHandle<()>>,
}

/// Create a cursor at `start` (the origin when unset).
///
/// With `perform_random_moves` an idle loop is spawned on the current tokio
/// runtime and wanders the pointer whenever no explicit action is running.
pub fn create_cursor<P: Page>(
    page: Arc<P>,
    start: Option<Vector>,
    perform_random_moves: bool,
    defaults: DefaultOptions,
) -> Cursor<P> {
    let random_move = defaults.random_move.clone();
    let ctx = Arc::new(CursorContext::new(
        page,
        start.unwrap_or(Vector::ORIGIN),
        defaults,
    ));
    let shutdown = CancellationToken::new();
    let idle = perform_random_moves.then(|| {
        ctx.set_idle_allowed(true);
        crate::idle::spawn(ctx.clone(), random_move, shutdown.child_token())
    });
    info!(target: "cursor", cursor = %ctx.id(), random_moves = perform_random_moves, "cursor created");
    Cursor {
        ctx,
        shutdown,
        idle,
    }
}

impl<P: Page> Cursor<P> {
    pub fn id(&self) -> Uuid {
        self.ctx.id()
    }

    pub fn page(&self) -> &P {
        self.ctx.page()
    }

    pub fn defaults(&self) -> &DefaultOptions {
        self.ctx.defaults()
    }

    /// Current tracked pointer position.
    pub fn location(&self) -> Vector {
        self.ctx.location()
    }

    /// Allow or forbid idle movement between explicit actions.
    pub fn toggle_random_move(&self, enabled: bool) {
        self.ctx.set_idle_allowed(enabled);
    }

    /// Whether the idle loop is still running.
    pub fn is_wandering(&self) -> bool {
        self.idle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn get_element(
        &self,
        selector: &str,
        options: Option<GetElementOptions>,
    ) -> Result<P::Element> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().get_element.clone());
        get_element(self.ctx.page(), selector, &options).await
    }

    async fn resolve(&self, target: Target<P::Element>, options: &GetElementOptions) -> Result<P::Element> {
        match target {
            Target::Selector(selector) => get_element(self.ctx.page(), &selector, options).await,
            Target::Element(element) => Ok(element),
        }
    }

    /// Trace a path straight to `point`.
    pub async fn move_to_point(&self, point: Vector, options: Option<MoveToOptions>) -> Result<()> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().move_to.clone());
        let _action = self.ctx.begin_action();
        let waypoints = {
            let mut rng = rand::thread_rng();
            path(&mut rng, self.ctx.location(), point, &options.path)
        };
        debug!(target: "cursor.move", cursor = %self.id(), x = point.x, y = point.y, steps = waypoints.len(), "moving to point");
        if trace_path(&self.ctx, &waypoints, false).await == TraceOutcome::Disconnected {
            return Ok(());
        }
        pause(options.move_delay_ms, options.randomize_move_delay).await;
        Ok(())
    }

    /// Move onto a random point of the target, scrolling it into view first.
    ///
    /// Long moves overshoot and correct. If the element's box no longer
    /// contains the destination afterwards the move is retried, up to
    /// `max_tries` times.
    pub async fn move_to(&self, target: impl Into<Target<P::Element>>, options: Option<MoveOptions>) -> Result<()> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().movement.clone());
        let _action = self.ctx.begin_action();
        let element = self.resolve(target.into(), &options.scroll.element).await?;
        let max_tries = options.max_tries.max(1);

        for attempt in 1..=max_tries {
            scroll::scroll_into_view(&self.ctx, &element, &options.scroll).await?;
            let bbox = element_box(self.ctx.page(), &element, false).await?;
            let (destination, legs) = {
                let mut rng = rand::thread_rng();
                let destination = random_box_point(&mut rng, &bbox, &options.target);
                let legs = plan_move(
                    &mut rng,
                    self.ctx.location(),
                    destination,
                    bbox.width,
                    options.overshoot_threshold,
                    &options.path,
                );
                (destination, legs)
            };
            debug!(
                target: "cursor.move",
                cursor = %self.id(),
                attempt,
                x = destination.x,
                y = destination.y,
                overshoot = legs.len() > 1,
                "moving to element"
            );
            for leg in &legs {
                if trace_path(&self.ctx, leg, false).await == TraceOutcome::Disconnected {
                    return Ok(());
                }
            }

            let moved = element_box(self.ctx.page(), &element, false).await?;
            if intersects_box(destination, &moved) {
                pause(options.move_delay_ms, options.randomize_move_delay).await;
                return Ok(());
            }
            debug!(target: "cursor.move", cursor = %self.id(), attempt, "element moved away, retrying");
        }
        Err(CursorError::MaxTries { tries: max_tries })
    }

    /// Click the target, or the current position when `target` is `None`.
    pub async fn click(&self, target: Option<Target<P::Element>>, options: Option<ClickOptions>) -> Result<()> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().click.clone());
        let _action = self.ctx.begin_action();
        if let Some(target) = target {
            let movement = MoveOptions {
                move_delay_ms: 0,
                ..options.movement.clone()
            };
            self.move_to(target, Some(movement)).await?;
        }
        tokio::time::sleep(Duration::from_millis(options.hesitate_ms)).await;
        debug!(
            target: "cursor.click",
            cursor = %self.id(),
            button = ?options.button,
            count = options.click_count,
            "clicking"
        );
        click_at_location(
            &self.ctx,
            options.button,
            options.click_count,
            Duration::from_millis(options.wait_for_click_ms),
        )
        .await;
        pause(options.move_delay_ms, options.randomize_move_delay).await;
        Ok(())
    }

    /// Wheel-scroll by `delta`.
    pub async fn scroll(&self, delta: Vector, options: Option<ScrollOptions>) -> Result<()> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().scroll.clone());
        let _action = self.ctx.begin_action();
        scroll::scroll(&self.ctx, delta, &options).await?;
        Ok(())
    }

    pub async fn scroll_to(&self, destination: ScrollDestination, options: Option<ScrollOptions>) -> Result<()> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().scroll.clone());
        let _action = self.ctx.begin_action();
        scroll::scroll_to(&self.ctx, destination, &options).await?;
        Ok(())
    }

    pub async fn scroll_into_view(
        &self,
        target: impl Into<Target<P::Element>>,
        options: Option<ScrollIntoViewOptions>,
    ) -> Result<()> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().scroll_into_view.clone());
        let _action = self.ctx.begin_action();
        let element = self.resolve(target.into(), &options.element).await?;
        scroll::scroll_into_view(&self.ctx, &element, &options).await
    }

    /// Type `text`, clicking the target first to focus it.
    pub async fn type_text(
        &self,
        target: Option<Target<P::Element>>,
        text: &str,
        options: Option<TypeOptions>,
    ) -> Result<()> {
        let options = options.unwrap_or_else(|| self.ctx.defaults().typing.clone());
        let _action = self.ctx.begin_action();
        if target.is_some() {
            self.click(target, Some(options.click.clone())).await?;
        }
        let plan = {
            let mut rng = rand::thread_rng();
            typing::plan_typing(&mut rng, text, &options)
        };
        typing::play(&self.ctx, &plan).await?;
        Ok(())
    }
}

impl<P: Page> Drop for Cursor<P> {
    fn drop(&mut self) {
        self.ctx.set_idle_allowed(false);
        self.shutdown.cancel();
    }
}
