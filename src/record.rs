//! Person records and the closed set of comparable attributes
//!
//! A record exposes a fixed set of named string attributes. Attribute names
//! are a closed enumeration so that configuration can be resolved to typed
//! accessors once, instead of mapping column names to fields at comparison
//! time.

use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A comparable attribute of a person record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    #[serde(alias = "firstname")]
    FirstName,
    #[serde(alias = "lastname")]
    LastName,
    #[serde(alias = "contact")]
    ContactNumber,
    #[serde(alias = "ssn")]
    SsnNumber,
}

impl Attribute {
    /// Every attribute, in canonical order.
    pub const ALL: [Attribute; 4] = [
        Attribute::FirstName,
        Attribute::LastName,
        Attribute::ContactNumber,
        Attribute::SsnNumber,
    ];

    /// Machine name used in configuration and serialized output.
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::FirstName => "firstName",
            Attribute::LastName => "lastName",
            Attribute::ContactNumber => "contactNumber",
            Attribute::SsnNumber => "ssnNumber",
        }
    }

    /// Human-readable label used in breakdown text.
    pub fn label(&self) -> &'static str {
        match self {
            Attribute::FirstName => "First Name",
            Attribute::LastName => "Last Name",
            Attribute::ContactNumber => "Contact Number",
            Attribute::SsnNumber => "SSN Number",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "firstname" | "first_name" => Ok(Attribute::FirstName),
            "lastname" | "last_name" => Ok(Attribute::LastName),
            "contactnumber" | "contact_number" | "contact" => Ok(Attribute::ContactNumber),
            "ssnnumber" | "ssn_number" | "ssn" => Ok(Attribute::SsnNumber),
            _ => Err(ConfigError::UnknownAttribute(s.to_string())),
        }
    }
}

/// Read access to attribute values by typed attribute.
pub trait AttributeSource {
    /// Value for `attribute`, or `None` when absent.
    fn attribute(&self, attribute: Attribute) -> Option<&str>;
}

/// The named string attributes shared by stored records and candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn_number: Option<String>,
}

impl AttributeValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set one attribute
    pub fn with(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn set(&mut self, attribute: Attribute, value: impl Into<String>) {
        *self.slot_mut(attribute) = Some(value.into());
    }

    pub fn clear(&mut self, attribute: Attribute) -> Option<String> {
        self.slot_mut(attribute).take()
    }

    fn slot_mut(&mut self, attribute: Attribute) -> &mut Option<String> {
        match attribute {
            Attribute::FirstName => &mut self.first_name,
            Attribute::LastName => &mut self.last_name,
            Attribute::ContactNumber => &mut self.contact_number,
            Attribute::SsnNumber => &mut self.ssn_number,
        }
    }
}

impl AttributeSource for AttributeValues {
    fn attribute(&self, attribute: Attribute) -> Option<&str> {
        let slot = match attribute {
            Attribute::FirstName => &self.first_name,
            Attribute::LastName => &self.last_name,
            Attribute::ContactNumber => &self.contact_number,
            Attribute::SsnNumber => &self.ssn_number,
        };
        slot.as_deref()
    }
}

/// A persisted person record. Only the store creates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    /// Opaque identity, immutable after creation
    pub id: Uuid,

    /// Human-facing record code
    pub record_code: String,

    #[serde(flatten)]
    pub attributes: AttributeValues,

    /// Not used for similarity scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl PersonRecord {
    pub fn new(
        id: Uuid,
        record_code: impl Into<String>,
        attributes: AttributeValues,
        date_of_birth: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            record_code: record_code.into(),
            attributes,
            date_of_birth,
        }
    }
}

impl AttributeSource for PersonRecord {
    fn attribute(&self, attribute: Attribute) -> Option<&str> {
        self.attributes.attribute(attribute)
    }
}

/// An incoming record that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInput {
    #[serde(flatten)]
    pub attributes: AttributeValues,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl CandidateInput {
    pub fn new(attributes: AttributeValues) -> Self {
        Self {
            attributes,
            date_of_birth: None,
        }
    }

    /// Builder: set the date of birth
    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }
}

impl AttributeSource for CandidateInput {
    fn attribute(&self, attribute: Attribute) -> Option<&str> {
        self.attributes.attribute(attribute)
    }
}
