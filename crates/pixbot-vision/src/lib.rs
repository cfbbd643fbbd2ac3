pub mod classifier;
pub mod color;
pub mod grid;
pub mod layout;
pub mod template_finder;

pub use classifier::{classify_potion, classify_presence, skill_is_available, slot_has_item};
pub use color::color_filter;
pub use grid::{cell_region, Cell, SlotGrid};
pub use layout::UiLayout;
pub use template_finder::{SearchRequest, TemplateFinder, TemplateMatcher};
