//! The remote page a cursor drives.
//!
//! [`Page`] is the boundary to the hosting environment: element queries,
//! geometry, script evaluation, window metrics and low-level input dispatch.
//! Implementations translate [`InputEvent`]s into their protocol's commands
//! (`Input.dispatchMouseEvent` for CDP, action chains for WebDriver, ...).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geometry::{BoundingBox, Quad};

/// Errors reported by a [`Page`] implementation.
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    /// The browser or page went away; further commands will not succeed.
    #[error("target disconnected")]
    Disconnected,

    /// The protocol has no equivalent for the requested command.
    #[error("unsupported by this page: {0}")]
    Unsupported(&'static str),

    /// The protocol rejected the command.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A script failed or returned something unexpected.
    #[error("script error: {0}")]
    Script(String),
}

impl PageError {
    pub fn is_disconnected(&self) -> bool {
        matches!(self, PageError::Disconnected)
    }
}

/// A parsed element selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    /// Selectors starting with `//` or `(//` are XPath, everything else CSS.
    ///
    /// ```
    /// use phantom_cursor::page::Selector;
    ///
    /// assert_eq!(Selector::parse("//button"), Selector::XPath("//button".into()));
    /// assert_eq!(Selector::parse("#submit"), Selector::Css("#submit".into()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("//") || raw.starts_with("(//") {
            Selector::XPath(raw.to_string())
        } else {
            Selector::Css(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(s) | Selector::XPath(s) => s,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// A key as far as the typing synthesizer is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Backspace,
}

/// One low-level input event. Coordinates are CSS pixels in the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    MouseMoved {
        x: f64,
        y: f64,
        /// Milliseconds since the UNIX epoch.
        timestamp: Option<f64>,
    },
    MousePressed {
        x: f64,
        y: f64,
        button: MouseButton,
        click_count: u32,
    },
    MouseReleased {
        x: f64,
        y: f64,
        button: MouseButton,
        click_count: u32,
    },
    MouseWheel {
        x: f64,
        y: f64,
        delta_x: f64,
        delta_y: f64,
    },
    KeyDown(Key),
    KeyUp(Key),
}

/// A remotely controlled page.
///
/// Scripts passed to [`Page::evaluate`] and [`Page::evaluate_on`] are
/// function bodies that `return` their result; for `evaluate_on` the element
/// is available as `arguments[0]`.
#[async_trait]
pub trait Page: Send + Sync + 'static {
    /// Handle to an element living in the page.
    type Element: Clone + Send + Sync + 'static;

    /// Look the selector up once.
    async fn query(&self, selector: &Selector) -> Result<Option<Self::Element>, PageError>;

    /// Wait up to `timeout` for the selector to match.
    async fn wait_for(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Option<Self::Element>, PageError>;

    /// Protocol-level content quads of the element, outer-frame coordinates.
    async fn content_quads(&self, element: &Self::Element) -> Result<Option<Vec<Quad>>, PageError>;

    /// Protocol-level bounding box of the element, outer-frame coordinates.
    async fn bounding_box(&self, element: &Self::Element) -> Result<Option<BoundingBox>, PageError>;

    /// Box of the iframe hosting the element, `None` for top-level elements.
    async fn frame_box(&self, element: &Self::Element) -> Result<Option<BoundingBox>, PageError>;

    /// Native "scroll into view if needed".
    async fn scroll_into_view_if_needed(&self, element: &Self::Element) -> Result<(), PageError>;

    async fn evaluate(&self, script: &str) -> Result<Value, PageError>;

    async fn evaluate_on(&self, element: &Self::Element, script: &str) -> Result<Value, PageError>;

    /// Area the page is shown in. Only the size is used; idle movement
    /// treats it as anchored at the page origin.
    async fn window_bounds(&self) -> Result<BoundingBox, PageError>;

    async fn dispatch(&self, event: InputEvent) -> Result<(), PageError>;
}
