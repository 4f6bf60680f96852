use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// String that is zeroized on drop; used for passphrases and API tokens
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureString {
    data: Vec<u8>,
}

impl SecureString {
    pub fn new(s: String) -> Self {
        Self {
            data: s.into_bytes(),
        }
    }

    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Constant-time comparison against raw bytes
    pub fn secure_eq_bytes(&self, other: &[u8]) -> bool {
        use subtle::ConstantTimeEq;

        if self.data.len() != other.len() {
            return false;
        }

        self.data.as_slice().ct_eq(other).into()
    }

    pub fn secure_eq(&self, other: &SecureString) -> bool {
        self.secure_eq_bytes(&other.data)
    }

    /// Convert to a String; the buffer held here is zeroized
    pub fn into_string(mut self) -> Result<String, std::string::FromUtf8Error> {
        let result = String::from_utf8(self.data.clone());
        self.data.zeroize();
        result
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("data", &"[REDACTED]")
            .field("len", &self.data.len())
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED SecureString of {} bytes]", self.data.len())
    }
}
