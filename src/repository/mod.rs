pub mod templates;

pub use templates::{TemplateCandidate, locate_template, template_candidates};
