//! WebDriver backend for the Phantom cursor.
//!
//! - [`phantom_browser::driver::PhantomDriver`]: session setup and navigation
//! - [`phantom_browser::page::WebDriverPage`]: the [`phantom_cursor::Page`]
//!   implementation that turns cursor input into WebDriver actions
pub mod phantom_browser;

pub use phantom_browser::driver::PhantomDriver;
pub use phantom_browser::page::WebDriverPage;
