//! Terminal colouring for the summary output

pub mod colours;

pub use colours::ColourManager;
