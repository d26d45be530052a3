use serde::{Serialize, Serializer};

/// Length in bytes of a SHA-1 digest.
pub const SHA1_LEN: usize = 20;

/// A CRC-32 checksum, as stored by zip containers and listed in DAT files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Crc32(pub u32);

impl Crc32 {
    /// Parse a CRC from hex. Leading zeros may be omitted, as some
    /// DAT exporters do.
    pub fn from_hex(s: &str) -> Result<Self, DigestParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.len() > 8 {
            return Err(DigestParseError::new("CRC-32", s, "expected 1 to 8 hex digits"));
        }
        u32::from_str_radix(trimmed, 16)
            .map(Crc32)
            .map_err(|e| DigestParseError::new("CRC-32", s, e.to_string()))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Crc32 {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Crc32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl std::str::FromStr for Crc32 {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Crc32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A 160-bit SHA-1 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Digest(pub [u8; SHA1_LEN]);

impl Sha1Digest {
    /// Parse a digest from exactly 40 hex digits (either case).
    pub fn from_hex(s: &str) -> Result<Self, DigestParseError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| DigestParseError::new("SHA-1", s, e.to_string()))?;
        let array: [u8; SHA1_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            DigestParseError::new(
                "SHA-1",
                s,
                format!("expected {SHA1_LEN} bytes, got {}", v.len()),
            )
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; SHA1_LEN] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; SHA1_LEN]> for Sha1Digest {
    fn from(bytes: [u8; SHA1_LEN]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl std::str::FromStr for Sha1Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Sha1Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a hex string cannot be parsed into a digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestParseError {
    pub algorithm: &'static str,
    pub input: String,
    pub reason: String,
}

impl DigestParseError {
    fn new(algorithm: &'static str, input: &str, reason: impl Into<String>) -> Self {
        Self {
            algorithm,
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for DigestParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} value '{}': {}",
            self.algorithm, self.input, self.reason
        )
    }
}

impl std::error::Error for DigestParseError {}

#[cfg(test)]
#[path = "tests/checksum_tests.rs"]
mod tests;
