//! # Category-Tagged Identifiers
//!
//! A 128-bit identifier whose first byte carries a 6-bit [`EntityCategory`]
//! tag in its top bits. The remaining 122 bits are random. Sessions, users,
//! datasets, jobs, and audit nodes are all named by identifiers, and the
//! category is always recoverable by masking byte 0, so an identifier
//! substituted across namespaces is detectable without a lookup.
//!
//! ## Text Shapes
//!
//! Exactly three shapes are accepted and produced:
//!
//! | Style        | Example                                  | Length |
//! |--------------|------------------------------------------|--------|
//! | `Plain`      | `08e1c2d3a4b5c6d7e8f90a1b2c3d4e5f`       | 32     |
//! | `Hyphenated` | `08e1c2d3-a4b5-c6d7-e8f9-0a1b2c3d4e5f`   | 36     |
//! | `Braced`     | `{08e1c2d3-a4b5-c6d7-e8f9-0a1b2c3d4e5f}` | 38     |
//!
//! Hex groups map to fixed byte ranges in textual order: `[0,4)`, `[4,6)`,
//! `[6,8)`, `[8,10)`, `[10,16)`. This is the same byte order `uuid` uses, so
//! conversion to and from [`Uuid`] is a plain byte copy.
//!
//! ## Randomness
//!
//! There is no shared generator. [`Identifier::new`] builds an `OsRng` per
//! call; [`Identifier::new_with_rng`] takes any caller-scoped cryptographic
//! generator.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentifierError;

/// Number of identifier categories.
pub const ENTITY_CATEGORY_COUNT: usize = 17;

/// Mask selecting the category bits of byte 0.
const CATEGORY_MASK: u8 = 0b1111_1100;

/// Entity kinds an identifier can name. The discriminant is the 6-bit tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EntityCategory {
    /// A participating organization.
    Organization = 1,
    /// A human or service user.
    User = 2,
    /// A data-sharing agreement between organizations.
    DigitalContract = 3,
    /// A dataset package.
    Dataset = 4,
    /// A table inside a dataset.
    Table = 5,
    /// A column inside a table.
    Column = 6,
    /// A secure computation host.
    VirtualMachine = 7,
    /// Interior node of the audit log tree.
    AuditEventBranchNode = 8,
    /// Encrypted audit leaf.
    AuditEventEncryptedLeafNode = 9,
    /// Plain-text audit leaf.
    AuditEventPlainTextLeafNode = 10,
    /// A federation of datasets.
    DataFederation = 11,
    /// A family of dataset versions.
    DatasetFamily = 12,
    /// A connector pushing data from a remote source.
    RemoteDataConnector = 13,
    /// A function approved for execution on confidential data.
    SafeFunction = 14,
    /// A sandboxed job.
    Job = 15,
    /// A login session.
    Session = 16,
    /// A user access token.
    UserAccessToken = 17,
}

impl EntityCategory {
    /// All categories, in tag order.
    pub const ALL: [EntityCategory; ENTITY_CATEGORY_COUNT] = [
        Self::Organization,
        Self::User,
        Self::DigitalContract,
        Self::Dataset,
        Self::Table,
        Self::Column,
        Self::VirtualMachine,
        Self::AuditEventBranchNode,
        Self::AuditEventEncryptedLeafNode,
        Self::AuditEventPlainTextLeafNode,
        Self::DataFederation,
        Self::DatasetFamily,
        Self::RemoteDataConnector,
        Self::SafeFunction,
        Self::Job,
        Self::Session,
        Self::UserAccessToken,
    ];

    /// The 6-bit tag stored in byte 0.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Look up a category by tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.tag() == tag)
    }

    /// Returns the category name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::User => "user",
            Self::DigitalContract => "digital_contract",
            Self::Dataset => "dataset",
            Self::Table => "table",
            Self::Column => "column",
            Self::VirtualMachine => "virtual_machine",
            Self::AuditEventBranchNode => "audit_event_branch_node",
            Self::AuditEventEncryptedLeafNode => "audit_event_encrypted_leaf_node",
            Self::AuditEventPlainTextLeafNode => "audit_event_plain_text_leaf_node",
            Self::DataFederation => "data_federation",
            Self::DatasetFamily => "dataset_family",
            Self::RemoteDataConnector => "remote_data_connector",
            Self::SafeFunction => "safe_function",
            Self::Job => "job",
            Self::Session => "session",
            Self::UserAccessToken => "user_access_token",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityCategory {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| IdentifierError::InvalidFormat(s.to_string()))
    }
}

/// Text rendering of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierStyle {
    /// 32 contiguous hex digits.
    Plain,
    /// 8-4-4-4-12 groups separated by hyphens.
    #[default]
    Hyphenated,
    /// Hyphenated, wrapped in braces.
    Braced,
}

/// A 128-bit identifier with an embedded entity category.
///
/// # Invariants
///
/// - The top six bits of byte 0 always hold a valid [`EntityCategory`] tag.
/// - Equality is byte-wise over all 16 bytes, category included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; 16]);

impl Identifier {
    /// Generate a fresh identifier for `category` from the operating system RNG.
    pub fn new(category: EntityCategory) -> Self {
        Self::new_with_rng(category, &mut OsRng)
    }

    /// Generate a fresh identifier for `category` from a caller-supplied RNG.
    pub fn new_with_rng<R: RngCore + CryptoRng>(category: EntityCategory, rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        // Clock-sequence field is stored high byte first.
        bytes.swap(8, 9);
        bytes[0] = (category.tag() << 2) | (bytes[0] & !CATEGORY_MASK);
        Self(bytes)
    }

    /// Build an identifier from raw bytes, validating the category tag.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::UnknownCategory`] if byte 0 does not carry
    /// a known category.
    pub fn from_bytes(bytes: [u8; 16]) -> Result<Self, IdentifierError> {
        let tag = bytes[0] >> 2;
        if EntityCategory::from_tag(tag).is_none() {
            return Err(IdentifierError::UnknownCategory(tag));
        }
        Ok(Self(bytes))
    }

    /// Parse any of the three accepted text shapes.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidFormat`] if the text is not 32 hex
    /// digits, the 36-character hyphenated form, or the 38-character braced
    /// form, and [`IdentifierError::UnknownCategory`] if it decodes to an
    /// unknown category.
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        let invalid = || IdentifierError::InvalidFormat(text.to_string());

        // Gate the shapes first: `Uuid::try_parse` also takes the `urn:uuid:`
        // prefix, which is not an identifier shape.
        match text.len() {
            32 | 36 => {}
            38 if text.starts_with('{') && text.ends_with('}') => {}
            _ => return Err(invalid()),
        }
        let uuid = Uuid::try_parse(text).map_err(|_| invalid())?;

        Self::from_bytes(*uuid.as_bytes())
    }

    /// Render in the requested style, lowercase hex.
    pub fn format(&self, style: IdentifierStyle) -> String {
        let uuid = self.to_uuid();
        match style {
            IdentifierStyle::Plain => uuid.simple().to_string(),
            IdentifierStyle::Hyphenated => uuid.hyphenated().to_string(),
            IdentifierStyle::Braced => uuid.braced().to_string(),
        }
    }

    /// The category encoded in byte 0.
    pub fn category(&self) -> EntityCategory {
        EntityCategory::from_tag(self.category_tag()).expect("validated at construction")
    }

    /// The raw 6-bit category tag.
    pub fn category_tag(&self) -> u8 {
        (self.0[0] & CATEGORY_MASK) >> 2
    }

    /// The 16 identifier bytes in textual order.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// View as a `uuid::Uuid` with identical bytes.
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }
}

impl TryFrom<Uuid> for Identifier {
    type Error = IdentifierError;

    fn try_from(uuid: Uuid) -> Result<Self, Self::Error> {
        Self::from_bytes(*uuid.as_bytes())
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        id.to_uuid()
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format(IdentifierStyle::Hyphenated))
    }
}

impl std::str::FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format(IdentifierStyle::Hyphenated))
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
