//! Newtype wrappers for string fields of artifact records.
//!
//! All newtypes serialize/deserialize as plain strings, so ledgers stay plain
//! JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Return the inner string as a slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<String> for $name {
            fn eq(&self, other: &String) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Target platform / architecture label, e.g. `x86_64-unknown-linux-gnu`.
    Platform
);

string_newtype!(
    /// Build flavor tag distinguishing artifacts of the same platform.
    Variant
);

string_newtype!(
    /// Hex-encoded SHA-256 digest of an artifact.
    Sha256Digest
);

impl Sha256Digest {
    /// Extract the digest from the body of a `.sha256` sidecar file.
    ///
    /// Sidecars follow the `sha256sum` layout (`<digest>  <filename>`), so the
    /// digest is the first whitespace-delimited token. Returns `None` for an
    /// empty body.
    pub fn from_sidecar(body: &str) -> Option<Self> {
        body.split_whitespace()
            .next()
            .map(|token| Self(token.to_ascii_lowercase()))
    }
}
