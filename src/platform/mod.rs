//! Platform abstraction layer
//!
//! Handles the seams between the simulation and its host:
//! - Input events reduced to a movement/fire/special intent
//! - Key-value storage (LocalStorage on web, in-memory elsewhere)
//! - Optional collaborators (audio, terminal, visual effects)

pub mod input;
pub mod notify;
pub mod storage;

pub use input::{InputState, Intent};
pub use notify::{AudioNotifier, Collaborators, LineStyle, TextSink, VisualNotifier};
pub use storage::{MemoryStorage, Storage};
