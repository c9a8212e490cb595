//! PII entity data models

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// PII category enumeration for legal documents
///
/// Serialized with the names used by the labelled dataset
/// (`Company_Name`, `PPS_Number`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PiiCategory {
    /// Full names, partial names or titles
    Name,
    /// Organization names
    CompanyName,
    /// Street addresses, cities, postal codes, countries
    Address,
    /// Dates identifying a birth date
    DateOfBirth,
    /// Email addresses
    EmailAddress,
    /// Phone or fax numbers
    PhoneNumber,
    /// Irish Personal Public Service numbers
    PpsNumber,
    /// Driver's, professional, VAT/tax licence numbers
    LicenseNumber,
    /// Passport document numbers
    PassportNumber,
    /// Account numbers, IBANs, sort codes
    BankInformation,
    /// National or other ID numbers
    IdNumber,
    /// Legal, tax, employer or case reference numbers
    ReferenceNumber,
}

impl PiiCategory {
    /// All categories in canonical order
    pub const ALL: [PiiCategory; 12] = [
        Self::Name,
        Self::CompanyName,
        Self::Address,
        Self::DateOfBirth,
        Self::EmailAddress,
        Self::PhoneNumber,
        Self::PpsNumber,
        Self::LicenseNumber,
        Self::PassportNumber,
        Self::BankInformation,
        Self::IdNumber,
        Self::ReferenceNumber,
    ];

    /// Name used in label files and model output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::CompanyName => "Company_Name",
            Self::Address => "Address",
            Self::DateOfBirth => "Date_of_Birth",
            Self::EmailAddress => "Email_Address",
            Self::PhoneNumber => "Phone_Number",
            Self::PpsNumber => "PPS_Number",
            Self::LicenseNumber => "License_Number",
            Self::PassportNumber => "Passport_Number",
            Self::BankInformation => "Bank_Information",
            Self::IdNumber => "ID_Number",
            Self::ReferenceNumber => "Reference_Number",
        }
    }

    /// Placeholder label used by redaction (`[LABEL]`)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::CompanyName => "COMPANY_NAME",
            Self::Address => "ADDRESS",
            Self::DateOfBirth => "DATE_OF_BIRTH",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::PpsNumber => "PPS_NUMBER",
            Self::LicenseNumber => "LICENSE_NUMBER",
            Self::PassportNumber => "PASSPORT_NUMBER",
            Self::BankInformation => "BANK_INFORMATION",
            Self::IdNumber => "ID_NUMBER",
            Self::ReferenceNumber => "REFERENCE_NUMBER",
        }
    }

    /// One-line description rendered into prompts
    pub fn description(&self) -> &'static str {
        match self {
            Self::Name => "Full names, partial names, or titles (e.g., Orval O'Riocht, Mr. Shingali)",
            Self::CompanyName => "Organization names (e.g., The Right Brothers, Bank of Ireland)",
            Self::Address => "Full or partial street addresses, city, postal codes, and country (e.g., 15 Grafton Street, Dublin 2, Ireland)",
            Self::DateOfBirth => "Dates specifically identifying a birth date (e.g., 23 August 1987)",
            Self::EmailAddress => "Standard email formats",
            Self::PhoneNumber => "Complete phone or fax numbers",
            Self::PpsNumber => "Irish Personal Public Service numbers (e.g., 8472639T)",
            Self::LicenseNumber => "Driver's licenses, professional licenses, VAT/Tax numbers (e.g., AML-IE-8472639, IE8472639T)",
            Self::PassportNumber => "Passport document numbers (e.g., P8472639)",
            Self::BankInformation => "Account numbers, IBANs, and Sort Codes (e.g., IE64 BOFI..., 90-73-28)",
            Self::IdNumber => "National/other ID numbers (e.g., 19870823-1234-567)",
            Self::ReferenceNumber => "Any unique legal, tax, employer, or case reference number (e.g., RC-RB-2025-847263, C-247/25)",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiCategory {
    type Err = String;

    /// Case, space, hyphen and underscore insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().replace('_', "").to_lowercase() == key)
            .ok_or_else(|| format!("Unknown PII category: '{}'", s.trim()))
    }
}

impl Serialize for PiiCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PiiCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Character span of an entity in the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Creates a span, rejecting `start > end`
    pub fn new(start: usize, end: usize) -> Result<Self, String> {
        if start > end {
            return Err(format!("Invalid span: start {start} is after end {end}"));
        }
        Ok(Self { start, end })
    }
}

/// Detected or labelled PII entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiiEntity {
    /// Entity text as it appears in the document
    pub text: String,
    /// Category of PII
    pub category: PiiCategory,
    /// Optional character span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl PiiEntity {
    /// Create a new PII entity, rejecting blank text
    pub fn new(text: impl Into<String>, category: PiiCategory) -> Result<Self, String> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(format!("Entity text for category {category} cannot be blank"));
        }
        Ok(Self {
            text,
            category,
            span: None,
        })
    }

    /// Attach a character span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}
