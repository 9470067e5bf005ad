//! Pipeline stage implementations.
//!
//! Each stage wraps one external processor invocation (the audio stage
//! wraps two) behind the `PipelineStep` trait.

mod derive_midi;
mod recognize;
mod render_audio;
mod render_pdf;

pub use derive_midi::DeriveMidiStep;
pub use recognize::RecognizeStep;
pub use render_audio::RenderAudioStep;
pub use render_pdf::RenderPdfStep;
