pub mod coherence;
pub mod grad;

pub use coherence::{coherence_boost, CoherenceOptions};
pub use grad::{sobel_gradients, Grad};
