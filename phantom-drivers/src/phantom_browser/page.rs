use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::actions::{
    InputSource, KeyAction, KeyActions, MouseActions, PointerAction, MOUSE_BUTTON_LEFT,
    MOUSE_BUTTON_MIDDLE, MOUSE_BUTTON_RIGHT,
};
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, Locator};
use phantom_cursor::page::{InputEvent, Key, MouseButton, Page, PageError, Selector};
use phantom_cursor::{BoundingBox, Quad};
use serde_json::{json, Value};
use tracing::{debug, trace};

const MOUSE_SOURCE: &str = "phantom-mouse";
const KEYBOARD_SOURCE: &str = "phantom-keyboard";
/// WebDriver code point for the Backspace key.
const BACKSPACE: char = '\u{E003}';
/// Upper bound for a single pointer move, whatever the timestamps say.
const MAX_MOVE_DURATION: Duration = Duration::from_millis(100);

const SCROLL_OFFSET_SCRIPT: &str = "return [window.scrollX, window.scrollY];";
const VIEWPORT_SCRIPT: &str = "return [window.innerWidth, window.innerHeight];";

/// [`Page`] implementation on top of a `fantoccini` WebDriver session.
///
/// WebDriver exposes neither content quads nor a native "scroll into view
/// if needed", so those report nothing and the cursor falls back to client
/// rects and wheel scrolling. Wheel events become `window.scrollBy` calls.
/// Pointer moves carry no timestamps on the wire; the gap between two
/// waypoint timestamps becomes the duration of the move action instead.
pub struct WebDriverPage {
    client: Client,
    last_move_at: Mutex<Option<f64>>,
}

impl WebDriverPage {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            last_move_at: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn move_duration(&self, timestamp: Option<f64>) -> Option<Duration> {
        let mut last = self
            .last_move_at
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = std::mem::replace(&mut *last, timestamp);
        match (previous, timestamp) {
            (Some(prev), Some(now)) if now > prev => {
                Some(Duration::from_secs_f64((now - prev) / 1000.0).min(MAX_MOVE_DURATION))
            }
            _ => None,
        }
    }

    async fn pointer(&self, actions: Vec<PointerAction>) -> Result<(), PageError> {
        let mut source = MouseActions::new(MOUSE_SOURCE.to_string());
        for action in actions {
            source = source.then(action);
        }
        self.client.perform_actions(source).await.map_err(map_cmd_error)
    }

    async fn key(&self, action: KeyAction) -> Result<(), PageError> {
        let source = KeyActions::new(KEYBOARD_SOURCE.to_string()).then(action);
        self.client.perform_actions(source).await.map_err(map_cmd_error)
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, PageError> {
        self.client.execute(script, args).await.map_err(map_cmd_error)
    }

    async fn scroll_offset(&self) -> Result<(f64, f64), PageError> {
        let raw = self.execute(SCROLL_OFFSET_SCRIPT, vec![]).await?;
        let (x, y): (f64, f64) = serde_json::from_value(raw)
            .map_err(|e| PageError::Script(format!("scroll offset: {e}")))?;
        Ok((x, y))
    }
}

/// The layout viewport as a page-relative box anchored at the origin.
fn viewport_box(raw: Value) -> Result<BoundingBox, PageError> {
    let (width, height): (f64, f64) =
        serde_json::from_value(raw).map_err(|e| PageError::Script(format!("viewport size: {e}")))?;
    Ok(BoundingBox::new(0.0, 0.0, width, height))
}

fn locator(selector: &Selector) -> Locator<'_> {
    match selector {
        Selector::Css(css) => Locator::Css(css),
        Selector::XPath(xpath) => Locator::XPath(xpath),
    }
}

fn button_code(button: MouseButton) -> u64 {
    match button {
        MouseButton::Left => MOUSE_BUTTON_LEFT,
        MouseButton::Middle => MOUSE_BUTTON_MIDDLE,
        MouseButton::Right => MOUSE_BUTTON_RIGHT,
    }
}

fn key_value(key: Key) -> char {
    match key {
        Key::Char(ch) => ch,
        Key::Backspace => BACKSPACE,
    }
}

fn move_to(x: f64, y: f64, duration: Option<Duration>) -> PointerAction {
    PointerAction::MoveTo {
        duration,
        x: x.round() as _,
        y: y.round() as _,
    }
}

/// Sessions that are gone surface as [`PageError::Disconnected`].
pub(crate) fn map_cmd_error(err: CmdError) -> PageError {
    match err {
        CmdError::Lost(_) => PageError::Disconnected,
        CmdError::Standard(ref wd)
            if matches!(
                wd.error,
                ErrorStatus::InvalidSessionId | ErrorStatus::NoSuchWindow
            ) =>
        {
            PageError::Disconnected
        }
        CmdError::Standard(ref wd) if matches!(wd.error, ErrorStatus::JavascriptError) => {
            PageError::Script(err.to_string())
        }
        other => PageError::Protocol(other.to_string()),
    }
}

#[async_trait]
impl Page for WebDriverPage {
    type Element = Element;

    async fn query(&self, selector: &Selector) -> Result<Option<Element>, PageError> {
        match self.client.find(locator(selector)).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(map_cmd_error(e)),
        }
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Option<Element>, PageError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(locator(selector))
            .await
        {
            Ok(element) => Ok(Some(element)),
            Err(CmdError::WaitTimeout) => {
                debug!(target: "browser.selector", %selector, ?timeout, "wait timed out");
                Ok(None)
            }
            Err(e) => Err(map_cmd_error(e)),
        }
    }

    async fn content_quads(&self, _element: &Element) -> Result<Option<Vec<Quad>>, PageError> {
        Ok(None)
    }

    async fn bounding_box(&self, element: &Element) -> Result<Option<BoundingBox>, PageError> {
        // element rects are document-relative
        let (x, y, width, height) = element.rectangle().await.map_err(map_cmd_error)?;
        let (scroll_x, scroll_y) = self.scroll_offset().await?;
        Ok(Some(BoundingBox::new(x - scroll_x, y - scroll_y, width, height)))
    }

    async fn frame_box(&self, _element: &Element) -> Result<Option<BoundingBox>, PageError> {
        // lookups never leave the current browsing context
        Ok(None)
    }

    async fn scroll_into_view_if_needed(&self, _element: &Element) -> Result<(), PageError> {
        Err(PageError::Unsupported("scroll into view if needed"))
    }

    async fn evaluate(&self, script: &str) -> Result<Value, PageError> {
        self.execute(script, vec![]).await
    }

    async fn evaluate_on(&self, element: &Element, script: &str) -> Result<Value, PageError> {
        let arg = serde_json::to_value(element)
            .map_err(|e| PageError::Script(format!("element reference: {e}")))?;
        self.execute(script, vec![arg]).await
    }

    async fn window_bounds(&self) -> Result<BoundingBox, PageError> {
        // the outer window rect includes browser chrome and screen position
        viewport_box(self.execute(VIEWPORT_SCRIPT, vec![]).await?)
    }

    async fn dispatch(&self, event: InputEvent) -> Result<(), PageError> {
        trace!(target: "browser.input", ?event, "dispatch");
        match event {
            InputEvent::MouseMoved { x, y, timestamp } => {
                let duration = self.move_duration(timestamp);
                self.pointer(vec![move_to(x, y, duration)]).await
            }
            InputEvent::MousePressed {
                x,
                y,
                button,
                click_count,
            } => {
                // WebDriver infers click counts from repeated presses
                let code = button_code(button);
                let mut actions = vec![move_to(x, y, None)];
                for _ in 1..click_count.max(1) {
                    actions.push(PointerAction::Down { button: code });
                    actions.push(PointerAction::Up { button: code });
                }
                actions.push(PointerAction::Down { button: code });
                self.pointer(actions).await
            }
            InputEvent::MouseReleased { x, y, button, .. } => {
                self.pointer(vec![
                    move_to(x, y, None),
                    PointerAction::Up {
                        button: button_code(button),
                    },
                ])
                .await
            }
            InputEvent::MouseWheel {
                delta_x, delta_y, ..
            } => self
                .execute(
                    "window.scrollBy(arguments[0], arguments[1]);",
                    vec![json!(delta_x), json!(delta_y)],
                )
                .await
                .map(|_| ()),
            InputEvent::KeyDown(key) => {
                self.key(KeyAction::Down {
                    value: key_value(key),
                })
                .await
            }
            InputEvent::KeyUp(key) => {
                self.key(KeyAction::Up {
                    value: key_value(key),
                })
                .await
            }
        }
    }
}
