//! Element resolution and bounding-box geometry.
//!
//! Boxes come from an ordered chain of strategies. Each strategy either
//! produces a box, declines with `None`, or fails; failures are logged at
//! debug level and the next strategy is tried.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CursorError, Result};
use crate::math::Vector;
use crate::options::GetElementOptions;
use crate::page::{Page, PageError, Selector};

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    pub fn center(&self) -> Vector {
        Vector::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Same box shifted by `-offset`.
    pub fn relative_to(&self, offset: Vector) -> Self {
        Self::new(self.x - offset.x, self.y - offset.y, self.width, self.height)
    }

    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = Vector>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}

/// Whether `point` lies inside `bbox`, edges included.
pub fn intersects_box(point: Vector, bbox: &BoundingBox) -> bool {
    point.x >= bbox.x
        && point.x <= bbox.x + bbox.width
        && point.y >= bbox.y
        && point.y <= bbox.y + bbox.height
}

/// Four corners of a rendered element fragment, as reported by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad(pub [Vector; 4]);

impl Quad {
    pub fn bounding_box(&self) -> BoundingBox {
        // four points, never empty
        BoundingBox::enclosing(self.0).unwrap_or_default()
    }
}

const CLIENT_RECT_SCRIPT: &str = "const r = arguments[0].getBoundingClientRect(); \
     return { x: r.left, y: r.top, width: r.width, height: r.height };";

/// One way of asking the page for an element's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryStrategy {
    /// Protocol content quads, outer-frame coordinates.
    ContentQuads,
    /// Protocol bounding box, outer-frame coordinates.
    ProtocolBox,
    /// DOM `getBoundingClientRect()`, coordinates of the hosting frame.
    ClientRect,
}

impl GeometryStrategy {
    pub const CHAIN: [GeometryStrategy; 3] = [
        GeometryStrategy::ContentQuads,
        GeometryStrategy::ProtocolBox,
        GeometryStrategy::ClientRect,
    ];

    fn frame_local(self) -> bool {
        matches!(self, GeometryStrategy::ClientRect)
    }

    pub async fn resolve<P: Page>(
        self,
        page: &P,
        element: &P::Element,
    ) -> Result<Option<BoundingBox>, PageError> {
        match self {
            GeometryStrategy::ContentQuads => Ok(page
                .content_quads(element)
                .await?
                .and_then(|quads| quads.first().map(Quad::bounding_box))),
            GeometryStrategy::ProtocolBox => page.bounding_box(element).await,
            GeometryStrategy::ClientRect => {
                let value = page.evaluate_on(element, CLIENT_RECT_SCRIPT).await?;
                if value.is_null() {
                    return Ok(None);
                }
                serde_json::from_value(value)
                    .map(Some)
                    .map_err(|e| PageError::Script(e.to_string()))
            }
        }
    }
}

/// Box of `element`, in outer-frame coordinates unless `frame_relative`.
///
/// For elements inside an iframe, the frame's box is used to translate
/// between the two coordinate spaces.
pub async fn element_box<P: Page>(
    page: &P,
    element: &P::Element,
    frame_relative: bool,
) -> Result<BoundingBox> {
    for strategy in GeometryStrategy::CHAIN {
        let bbox = match strategy.resolve(page, element).await {
            Ok(Some(bbox)) => bbox,
            Ok(None) => {
                debug!(target: "cursor.geometry", ?strategy, "strategy produced no box");
                continue;
            }
            Err(PageError::Disconnected) => return Err(PageError::Disconnected.into()),
            Err(error) => {
                debug!(target: "cursor.geometry", ?strategy, %error, "strategy failed");
                continue;
            }
        };
        if strategy.frame_local() == frame_relative {
            return Ok(bbox);
        }
        let frame = match page.frame_box(element).await {
            Ok(frame) => frame,
            Err(error) => {
                debug!(target: "cursor.geometry", %error, "frame box unavailable");
                None
            }
        };
        return Ok(match frame {
            Some(frame) if frame_relative => bbox.relative_to(frame.origin()),
            Some(frame) => bbox.relative_to(frame.origin() * -1.0),
            None => bbox,
        });
    }
    Err(CursorError::GeometryUnavailable)
}

/// Look `selector` up, waiting when `wait_for_selector_ms` is set.
pub async fn get_element<P: Page>(
    page: &P,
    selector: &str,
    options: &GetElementOptions,
) -> Result<P::Element> {
    let parsed = Selector::parse(selector);
    let found = match options.wait_for_selector_ms {
        Some(ms) => {
            debug!(target: "cursor.geometry", %parsed, wait_ms = ms, "waiting for selector");
            page.wait_for(&parsed, Duration::from_millis(ms)).await?
        }
        None => page.query(&parsed).await?,
    };
    found.ok_or_else(|| CursorError::ElementNotFound {
        selector: selector.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_box_spans_all_corners() {
        let quad = Quad([
            Vector::new(10.0, 5.0),
            Vector::new(40.0, 8.0),
            Vector::new(38.0, 30.0),
            Vector::new(12.0, 25.0),
        ]);
        assert_eq!(quad.bounding_box(), BoundingBox::new(10.0, 5.0, 30.0, 25.0));
    }

    #[test]
    fn intersection_includes_edges() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(intersects_box(Vector::new(10.0, 0.0), &bbox));
        assert!(intersects_box(Vector::new(5.0, 5.0), &bbox));
        assert!(!intersects_box(Vector::new(10.1, 5.0), &bbox));
    }

    #[test]
    fn client_rect_json_parses() {
        let value = serde_json::json!({ "x": 1.5, "y": 2.0, "width": 3.0, "height": 4.0 });
        let bbox: BoundingBox = serde_json::from_value(value).unwrap();
        assert_eq!(bbox.center(), Vector::new(3.0, 4.0));
    }
}
