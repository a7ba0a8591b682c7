pub mod rules;

// Re-export for convenience
pub use rules::*;
