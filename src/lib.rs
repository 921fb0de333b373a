pub mod cli;
pub mod companion;
pub mod config;
pub mod core;
pub mod logging;
pub mod scheduler;
pub mod transport;

pub use companion::{ChatTurn, Companion, CompanionEvent, TurnOutcome};
pub use config::Config;
pub use transport::{ChatTransport, ProviderClient};
