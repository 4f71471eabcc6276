pub mod drag;
pub mod editor;
pub mod events;
pub mod history;
pub mod input;
pub mod selection;
pub mod shortcuts;
pub mod store;

pub use editor::{Editor, KeyOutcome};
pub use events::{EditorEvent, SubscriptionId};
pub use input::{InputEvent, Modifiers};
pub use selection::Selection;
pub use store::{LayoutStore, PendingWrite};
