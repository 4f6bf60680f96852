pub mod amount;
pub mod audit;
pub mod chains;
pub mod cli;
pub mod config;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod facade;
pub mod handlers;
pub mod key_management;
pub mod keystore;
pub mod middleware;
pub mod networks;
pub mod security;
pub mod server;
pub mod services;
pub mod utils;
pub mod wallet;

pub use chains::{AttestationFeeState, ChainAdapter, FeeKind, WriteReceipt};
pub use config::Config;
pub use controller::{AdminController, ControllerSnapshot, PendingOperation};
pub use errors::AdminError;
pub use facade::{AdapterSource, NetworkFacade};
pub use keystore::Keystore;
pub use networks::{ChainFamily, NetworkDescriptor, NetworkId, NetworkRegistry};
pub use server::{AppState, Server};
pub use wallet::WalletSessions;

// Re-export CLI types for main.rs
pub use cli::*;
