mod suggest_error;

pub use suggest_error::{SuggestError, SuggestErrorKind};
