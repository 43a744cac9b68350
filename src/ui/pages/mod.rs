pub mod settings;
pub mod splitter;

pub use settings::SettingsPage;
pub use splitter::SplitterPage;
