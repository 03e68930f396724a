pub mod pattern;

pub use pattern::{is_formula_text, shift_formula_rows};
