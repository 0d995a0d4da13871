pub mod coerce;
pub mod error;
pub mod path;
pub mod value;

pub use coerce::{display_text, format_number, Dialect, EditorKind, Step};
pub use error::HoneyPotError;
pub use path::{humanize_label, Path};
pub use value::*;
