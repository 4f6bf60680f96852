pub mod descriptor;
pub mod registry;

#[cfg(test)]
mod tests;

pub use descriptor::{ChainFamily, NativeCurrency, NetworkDescriptor, NetworkId};
pub use registry::NetworkRegistry;
