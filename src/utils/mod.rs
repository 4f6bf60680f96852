pub mod ip;
pub mod password;
pub mod secure_string;
pub mod tls;

pub use ip::extract_real_ip;
pub use password::{get_passphrase_securely, prompt_for_passphrase_with_confirmation};
pub use secure_string::SecureString;
pub use tls::TlsManager;
