//! Rendering of failure reports

mod color;
mod diff;

pub use color::Palette;
pub use color::Styled;
pub use diff::write_diff;
pub use diff::Sides;
