use std::fmt;

use mime_guess::Mime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image extensions accepted for upload, in their stored (lowercase) form.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Length of the hex token that prefixes every stored name.
const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("File name has no extension")]
    MissingExtension,
    #[error("Unsupported image type '.{0}' (allowed: jpg, jpeg, png, gif, webp)")]
    UnsupportedExtension(String),
    #[error("Malformed stored file name: {0}")]
    Malformed(String),
}

/// Server-generated name of a file inside the content directory.
///
/// Always `<token>.<ext>`: a 32-character lowercase hex UUIDv7 followed by an
/// allow-listed extension. Nothing user-supplied survives except the
/// extension, so a stored name can never address anything outside the
/// content directory.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StoredName(String);

impl StoredName {
    /// Generate a fresh name for an upload whose client-side name was `original`.
    pub fn generate(original: &str) -> Result<Self, NameError> {
        let ext = image_extension(original)?;
        Ok(Self(format!("{}.{ext}", Uuid::now_v7().simple())))
    }

    /// Validate a name previously produced by [`StoredName::generate`].
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let (token, ext) = s
            .split_once('.')
            .ok_or_else(|| NameError::Malformed(s.to_string()))?;

        let token_ok = token.len() == TOKEN_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !token_ok || !ALLOWED_EXTENSIONS.contains(&ext) {
            return Err(NameError::Malformed(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn extension(&self) -> &str {
        self.0.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default()
    }

    /// MIME type served for this file.
    pub fn content_type(&self) -> Mime {
        mime_guess::from_ext(self.extension()).first_or_octet_stream()
    }
}

/// Extract the lowercased, allow-listed extension from a client filename.
///
/// Directory components (either separator) are dropped before looking for
/// the extension, so `../../etc/passwd.png` yields `png` and `a.png/evil`
/// yields nothing.
pub fn image_extension(original: &str) -> Result<String, NameError> {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    let (_, ext) = base.rsplit_once('.').ok_or(NameError::MissingExtension)?;
    if ext.is_empty() {
        return Err(NameError::MissingExtension);
    }

    let ext = ext.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(NameError::UnsupportedExtension(ext));
    }
    Ok(ext)
}

impl fmt::Debug for StoredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoredName({})", self.0)
    }
}

impl fmt::Display for StoredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StoredName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StoredName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
