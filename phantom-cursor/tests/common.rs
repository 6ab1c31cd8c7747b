#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use phantom_common::observability::{LogConfig, LogFormat};
use phantom_cursor::page::{InputEvent, Key, Page, PageError, Selector};
use phantom_cursor::{BoundingBox, Quad, Vector};
use serde_json::{json, Value};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "phantom-tests".into(),
            log_dir: Some(std::env::temp_dir().join("phantom-tests")),
            emit_stderr: true,
            format: if std::env::var("PHANTOM_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".into(),
            ..LogConfig::default()
        };

        phantom_common::observability::init_logging(config).unwrap_or_default()
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeElement(pub usize);

/// Geometry of one fake element. Every protocol read shifts the box right
/// by `drift`, so a non-zero drift models an element that keeps moving.
#[derive(Debug, Clone)]
struct Geometry {
    bbox: BoundingBox,
    drift: f64,
    reads: usize,
    frame: Option<BoundingBox>,
}

/// In-memory page that records every dispatched event.
pub struct FakePage {
    selectors: Mutex<HashMap<String, usize>>,
    geometry: Mutex<Vec<Geometry>>,
    pub events: Mutex<Vec<InputEvent>>,
    pub queried: Mutex<Vec<Selector>>,
    pub waited: Mutex<Vec<Duration>>,
    pub native_scrolls: AtomicUsize,
    pub dom_scrolls: AtomicUsize,
    pub quads: AtomicBool,
    pub protocol_box_fails: AtomicBool,
    pub native_scroll_fails: AtomicBool,
    pub wheel_fails: AtomicBool,
    pub failing_moves: AtomicUsize,
    pub disconnected: AtomicBool,
    pub window: BoundingBox,
    pub viewport: (f64, f64),
    pub document: (f64, f64),
    pub scroll_offset: (f64, f64),
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            selectors: Mutex::default(),
            geometry: Mutex::default(),
            events: Mutex::default(),
            queried: Mutex::default(),
            waited: Mutex::default(),
            native_scrolls: AtomicUsize::new(0),
            dom_scrolls: AtomicUsize::new(0),
            quads: AtomicBool::new(false),
            protocol_box_fails: AtomicBool::new(false),
            native_scroll_fails: AtomicBool::new(false),
            wheel_fails: AtomicBool::new(false),
            failing_moves: AtomicUsize::new(0),
            disconnected: AtomicBool::new(false),
            window: BoundingBox::new(0.0, 0.0, 1280.0, 800.0),
            viewport: (1280.0, 800.0),
            document: (1280.0, 4000.0),
            scroll_offset: (0.0, 0.0),
        }
    }
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: BoundingBox) -> Self {
        self.window = window;
        self
    }

    pub fn with_scroll_offset(mut self, x: f64, y: f64) -> Self {
        self.scroll_offset = (x, y);
        self
    }

    pub fn with_element(self, selector: &str, bbox: BoundingBox) -> Self {
        self.add(selector, bbox, 0.0, None);
        self
    }

    pub fn with_moving_element(self, selector: &str, bbox: BoundingBox, drift: f64) -> Self {
        self.add(selector, bbox, drift, None);
        self
    }

    pub fn with_framed_element(self, selector: &str, bbox: BoundingBox, frame: BoundingBox) -> Self {
        self.add(selector, bbox, 0.0, Some(frame));
        self
    }

    fn add(&self, selector: &str, bbox: BoundingBox, drift: f64, frame: Option<BoundingBox>) {
        let mut geometry = self.geometry.lock().unwrap();
        geometry.push(Geometry {
            bbox,
            drift,
            reads: 0,
            frame,
        });
        self.selectors
            .lock()
            .unwrap()
            .insert(selector.to_string(), geometry.len() - 1);
    }

    pub fn element(&self, selector: &str) -> FakeElement {
        FakeElement(self.selectors.lock().unwrap()[selector])
    }

    fn read_box(&self, element: &FakeElement) -> BoundingBox {
        let mut geometry = self.geometry.lock().unwrap();
        let g = &mut geometry[element.0];
        let shifted = BoundingBox::new(
            g.bbox.x + g.drift * g.reads as f64,
            g.bbox.y,
            g.bbox.width,
            g.bbox.height,
        );
        g.reads += 1;
        shifted
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn moves(&self) -> Vec<Vector> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::MouseMoved { x, y, .. } => Some(Vector::new(x, y)),
                _ => None,
            })
            .collect()
    }

    pub fn wheel_deltas(&self) -> Vec<(f64, f64)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::MouseWheel {
                    delta_x, delta_y, ..
                } => Some((delta_x, delta_y)),
                _ => None,
            })
            .collect()
    }

    pub fn keys_down(&self) -> Vec<Key> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::KeyDown(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    fn check_connected(&self) -> Result<(), PageError> {
        if self.disconnected.load(Ordering::SeqCst) {
            Err(PageError::Disconnected)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Page for FakePage {
    type Element = FakeElement;

    async fn query(&self, selector: &Selector) -> Result<Option<FakeElement>, PageError> {
        self.check_connected()?;
        self.queried.lock().unwrap().push(selector.clone());
        Ok(self
            .selectors
            .lock()
            .unwrap()
            .get(selector.as_str())
            .copied()
            .map(FakeElement))
    }

    async fn wait_for(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Option<FakeElement>, PageError> {
        self.waited.lock().unwrap().push(timeout);
        self.query(selector).await
    }

    async fn content_quads(&self, element: &FakeElement) -> Result<Option<Vec<Quad>>, PageError> {
        self.check_connected()?;
        if !self.quads.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let b = self.read_box(element);
        Ok(Some(vec![Quad([
            Vector::new(b.x, b.y),
            Vector::new(b.x + b.width, b.y),
            Vector::new(b.x + b.width, b.y + b.height),
            Vector::new(b.x, b.y + b.height),
        ])]))
    }

    async fn bounding_box(&self, element: &FakeElement) -> Result<Option<BoundingBox>, PageError> {
        self.check_connected()?;
        if self.protocol_box_fails.load(Ordering::SeqCst) {
            return Err(PageError::Protocol("box model unavailable".into()));
        }
        Ok(Some(self.read_box(element)))
    }

    async fn frame_box(&self, element: &FakeElement) -> Result<Option<BoundingBox>, PageError> {
        Ok(self.geometry.lock().unwrap()[element.0].frame)
    }

    async fn scroll_into_view_if_needed(&self, _element: &FakeElement) -> Result<(), PageError> {
        self.check_connected()?;
        if self.native_scroll_fails.load(Ordering::SeqCst) {
            return Err(PageError::Unsupported("scroll into view"));
        }
        self.native_scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<Value, PageError> {
        self.check_connected()?;
        Ok(json!({
            "viewportWidth": self.viewport.0,
            "viewportHeight": self.viewport.1,
            "docWidth": self.document.0,
            "docHeight": self.document.1,
            "scrollX": self.scroll_offset.0,
            "scrollY": self.scroll_offset.1,
        }))
    }

    async fn evaluate_on(&self, element: &FakeElement, script: &str) -> Result<Value, PageError> {
        self.check_connected()?;
        if script.contains("scrollIntoView") {
            self.dom_scrolls.fetch_add(1, Ordering::SeqCst);
            return Ok(Value::Null);
        }
        // client rects are frame-local
        let geometry = self.geometry.lock().unwrap()[element.0].clone();
        let offset = geometry.frame.map(|f| f.origin()).unwrap_or_default();
        let b = geometry.bbox.relative_to(offset);
        Ok(json!({ "x": b.x, "y": b.y, "width": b.width, "height": b.height }))
    }

    async fn window_bounds(&self) -> Result<BoundingBox, PageError> {
        self.check_connected()?;
        Ok(self.window)
    }

    async fn dispatch(&self, event: InputEvent) -> Result<(), PageError> {
        self.check_connected()?;
        if matches!(event, InputEvent::MouseWheel { .. }) && self.wheel_fails.load(Ordering::SeqCst) {
            return Err(PageError::Protocol("wheel rejected".into()));
        }
        if matches!(event, InputEvent::MouseMoved { .. })
            && self
                .failing_moves
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(PageError::Protocol("transient".into()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
