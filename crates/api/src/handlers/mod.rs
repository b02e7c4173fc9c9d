pub mod entries;
pub mod fields;
pub mod forms;
pub mod public;
pub mod sections;
