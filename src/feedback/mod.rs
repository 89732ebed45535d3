mod reconciler;

pub use reconciler::{attach, AttachOutcome, AttachPath};
