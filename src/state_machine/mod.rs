mod ritual;
mod state;

pub use ritual::{ProcessedImage, ReadingMode, Ritual, RitualRecord, Strategy};
pub use state::{RitualEvent, RitualState, StateMachine, Transition};
