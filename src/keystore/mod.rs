pub mod backends;
pub mod core;
pub mod encryption;
pub mod key_material;


pub use backends::{BackendConfig, KeystoreBackend};
pub use core::Keystore;
pub use encryption::EncryptedKeystore;
pub use key_material::KeyMaterial;

pub use backends::{EnvironmentBackend, OsKeyringBackend, SoftwareBackend};
