//! Synthetic human input for remotely controlled browser pages.
//!
//! The crate turns intents such as "click this element" or "type this text"
//! into curved, Fitts'-law paced pointer paths, wheel steps and keystrokes,
//! dispatched through the [`page::Page`] trait.
//!
//! # Overview
//!
//! - [`math`] and [`bezier`]: vectors, randomized curves and curve analysis
//! - [`path`] and [`timing`]: waypoint planning and dispatch timestamps
//! - [`geometry`]: element lookup and bounding boxes
//! - [`scroll`] and [`typing`]: wheel and keyboard planners
//! - [`Cursor`] / [`create_cursor`]: the per-page API, with an optional idle loop
//! - [`human`]: one-call helpers for scripts
//!
//! # Examples
//!
//! Planning a path needs no page at all:
//!
//! ```rust
//! use phantom_cursor::{math::Vector, options::PathOptions, path::path};
//!
//! let points = path(
//!     &mut rand::thread_rng(),
//!     Vector::new(0.0, 0.0),
//!     Vector::new(640.0, 480.0),
//!     &PathOptions { move_speed: Some(10.0), ..PathOptions::default() },
//! );
//! assert!(points.len() > 2);
//! assert!(points.iter().all(|w| w.x >= 0.0 && w.y >= 0.0));
//! ```
pub mod bezier;
pub mod context;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod human;
pub mod idle;
pub mod math;
pub mod options;
pub mod page;
pub mod path;
pub mod scroll;
pub mod timing;
pub mod typing;

pub use cursor::{create_cursor, Cursor, Target};
pub use error::{CursorError, Result};
pub use geometry::{BoundingBox, Quad};
pub use math::Vector;
pub use options::DefaultOptions;
pub use page::{InputEvent, Page, PageError};
pub use path::Waypoint;
pub use scroll::ScrollDestination;
