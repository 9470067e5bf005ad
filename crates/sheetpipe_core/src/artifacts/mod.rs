//! Stage output artifact discovery.

mod locator;

pub use locator::locate;
