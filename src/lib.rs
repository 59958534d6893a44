pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod schema;
pub mod source;
pub mod ui;
pub mod verify;
pub mod writer;

pub use cli::Cli;
pub use config::ImportOptions;
pub use error::ImportError;
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
