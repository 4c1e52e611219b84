mod encode;
mod sequencer;
#[cfg(test)]
mod tests;

pub use encode::encode_frame;
pub use sequencer::{CaptureSequencer, CountdownOutcome, SequencerState};
