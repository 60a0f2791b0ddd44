pub mod note;
pub mod process;
pub mod sanitize;
pub mod time_serde;

pub use note::{ContextMessage, Note, NoteInput, ReceiptStyle, Role, SourceRef};
pub use process::{TitleGenerator, fingerprint, keywords_of, title_of};
pub use sanitize::{sanitize_identifier, sanitize_tenant};
