pub mod level;
pub mod logic;
pub mod round;
pub mod serde_duration;
pub mod settings;
pub mod sfx;
pub mod state;
pub mod ui;
pub mod view;
