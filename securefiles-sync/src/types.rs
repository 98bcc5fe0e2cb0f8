//! Shared types for secure file sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Header carrying a CI job token.
pub const JOB_TOKEN_HEADER: &str = "JOB-TOKEN";

/// Header carrying a personal or project access token.
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// The authentication header resolved from a client's coordinates.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCredential {
    pub header: &'static str,
    pub value: String,
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredential")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// One secure file record as returned by the list endpoint.
///
/// The endpoint returns more columns than are modelled here; anything unknown
/// is ignored. Missing fields use defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecureFileRecord {
    /// Opaque identifier used in per-file URLs. The API sends a number.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    /// Slash-separated logical path; the last segment is the filename.
    #[serde(default)]
    pub name: String,
    /// Hex-encoded SHA-256 of the file contents.
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub checksum_algorithm: Option<String>,
    #[serde(default, deserialize_with = "deserialize_permissions")]
    pub permissions: PermissionClass,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Accepts either a JSON number or a string id.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct IdVisitor;
    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = String;
        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or string id")
        }
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }
        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// `null`, non-string and unrecognized values all decode to `Unknown`.
fn deserialize_permissions<'de, D>(deserializer: D) -> Result<PermissionClass, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// RFC 3339 timestamp; anything unparseable is dropped to `None`.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc)))
}

/// Permission class assigned to a secure file by the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionClass {
    ReadOnly,
    ReadWrite,
    Execute,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PermissionClass {
    /// Maps the class to the mode applied on disk. Unknown classes get the
    /// most restrictive mode.
    pub fn file_mode(self) -> FileMode {
        match self {
            Self::ReadOnly | Self::Unknown => FileMode::OwnerRead,
            Self::ReadWrite => FileMode::OwnerReadWrite,
            Self::Execute => FileMode::OwnerReadWriteExecute,
        }
    }
}

/// Symbolic file mode: owner bits set exactly, group/other read removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// `u=r,go-r`
    OwnerRead,
    /// `u=wr,go-r`
    OwnerReadWrite,
    /// `u=wrx,go-r`
    OwnerReadWriteExecute,
}

impl FileMode {
    const GROUP_OTHER_READ: u32 = 0o044;
    const OWNER_MASK: u32 = 0o700;

    pub fn owner_bits(self) -> u32 {
        match self {
            Self::OwnerRead => 0o400,
            Self::OwnerReadWrite => 0o600,
            Self::OwnerReadWriteExecute => 0o700,
        }
    }

    pub fn owner_writable(self) -> bool {
        self.owner_bits() & 0o200 != 0
    }

    /// Applies the symbolic mode to an existing mode. Group/other write and
    /// execute bits and the special bits are left as they were.
    pub fn apply(self, current: u32) -> u32 {
        (current & !Self::OWNER_MASK & !Self::GROUP_OTHER_READ) | self.owner_bits()
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = match self {
            Self::OwnerRead => "r",
            Self::OwnerReadWrite => "wr",
            Self::OwnerReadWriteExecute => "wrx",
        };
        write!(f, "u={owner},go-r")
    }
}

/// Non-fatal result of a download attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Written, permissioned and checksum-verified.
    Verified { path: PathBuf },
    /// The request failed; nothing was verified.
    Failed { name: String, reason: String },
}

impl DownloadOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}
