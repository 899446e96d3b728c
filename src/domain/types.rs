//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! normalized/validated email, non-negative money) so that once a value reaches
//! the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::{ops::Deref, str::FromStr};

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Provided url failed format validation.
    #[error("invalid url address")]
    InvalidUrl,
    /// Monetary amount was negative.
    #[error("amount cannot be negative")]
    NegativeAmount,
    /// Password shorter than [`Password::MIN_LENGTH`].
    #[error("password must be at least {0} characters long")]
    PasswordTooShort(usize),
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(OrganizationId, "Unique identifier for an organization (tenant).");
id_newtype!(UserId, "Unique identifier for a user account.");
id_newtype!(ClientId, "Unique identifier for a client.");
id_newtype!(TechnicianId, "Unique identifier for a technician.");
id_newtype!(ProjectId, "Unique identifier for a project.");
id_newtype!(WorkOrderId, "Unique identifier for a work order.");
id_newtype!(InvoiceId, "Unique identifier for an invoice.");
id_newtype!(InvoiceItemId, "Unique identifier for an invoice line.");
id_newtype!(VendorId, "Unique identifier for a vendor.");
id_newtype!(ChemicalPriceId, "Unique identifier for a chemical price quote.");
id_newtype!(ProviderId, "Unique identifier for a communication provider.");

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(OrganizationName, "Organization display name.");
non_empty_string_newtype!(PersonName, "Name of a user, client contact or technician.");
non_empty_string_newtype!(ProjectName, "Project name.");
non_empty_string_newtype!(WorkOrderTitle, "Short work order title.");
non_empty_string_newtype!(VendorName, "Vendor name, unique within an organization.");
non_empty_string_newtype!(ChemicalName, "Chemical product name, e.g. `Liquid chlorine`.");
non_empty_string_newtype!(ChemicalUnit, "Unit a chemical is priced in, e.g. `gallon`.");
non_empty_string_newtype!(ProviderName, "Display name of a communication provider.");
non_empty_string_newtype!(InvoiceNumber, "Human readable invoice number.");

/// Free text sanitized with `ammonia` and trimmed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Description(String);

impl Description {
    /// Constructs a sanitized, trimmed, non-empty value.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let sanitized = ammonia::clean(&value.into());
        let inner = NonEmptyString::new(sanitized)?;
        Ok(Self(inner.into_inner()))
    }

    /// Same as [`Description::new`] but maps empty input to `None`.
    pub fn optional<S: Into<String>>(value: Option<S>) -> Option<Self> {
        value.and_then(|value| Self::new(value).ok())
    }

    /// Borrow the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Description {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalizes a phone number string to E.164 format.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(None, trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Normalized phone number wrapper (expected E.164).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Constructs a phone number ensuring it is valid and normalizes to E.164 format.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_phone_to_e164(&value.into())?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PhoneNumber {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated absolute URL (vendor websites).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WebsiteUrl(String);

impl WebsiteUrl {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let url = NonEmptyString::new(value)?;

        if !url.as_str().validate_url() {
            Err(TypeConstraintError::InvalidUrl)
        } else {
            Ok(Self(url.into_inner()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for WebsiteUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative amount of money in minor units (cents).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
        if value < 0 {
            Err(TypeConstraintError::NegativeAmount)
        } else {
            Ok(Self(value))
        }
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Adds two amounts, saturating at `i64::MAX`.
    pub fn saturating_add(self, other: Cents) -> Cents {
        Cents(self.0.saturating_add(other.0))
    }

    /// Multiplies by a positive quantity, saturating at `i64::MAX`.
    pub fn saturating_mul(self, quantity: Quantity) -> Cents {
        Cents(self.0.saturating_mul(i64::from(quantity.get())))
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<i64> for Cents {
    type Error = TypeConstraintError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Positive line item quantity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidValue(format!(
                "quantity must be positive, got {value}"
            )))
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Tax rate expressed in basis points (1/100 of a percent).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaxRate(i32);

impl TaxRate {
    pub const MAX_BASIS_POINTS: i32 = 10_000;

    pub fn new(basis_points: i32) -> Result<Self, TypeConstraintError> {
        if (0..=Self::MAX_BASIS_POINTS).contains(&basis_points) {
            Ok(Self(basis_points))
        } else {
            Err(TypeConstraintError::InvalidValue(format!(
                "tax rate must be between 0 and {} basis points",
                Self::MAX_BASIS_POINTS
            )))
        }
    }

    pub const fn basis_points(self) -> i32 {
        self.0
    }

    /// Tax owed on `amount`, rounded half up to the nearest cent.
    pub fn apply(self, amount: Cents) -> Cents {
        let numerator = i128::from(amount.get()) * i128::from(self.0);
        let divisor = i128::from(Self::MAX_BASIS_POINTS);
        let rounded = (numerator + divisor / 2) / divisor;
        Cents(i64::try_from(rounded).unwrap_or(i64::MAX))
    }
}

/// Plain-text password accepted from users before hashing.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into();
        if value.chars().count() < Self::MIN_LENGTH {
            return Err(TypeConstraintError::PasswordTooShort(Self::MIN_LENGTH));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Generates a string-backed enum with `Display`, `FromStr` and `as_str`.
///
/// Values are persisted as their snake_case string form.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Persisted string form.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        concat!("unknown ", stringify!($name), " `{}`"),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(
    /// Role of a user inside their organization.
    UserRole {
        Admin => "admin",
        Office => "office",
        Technician => "technician",
    }
);

text_enum!(
    /// Lifecycle of a project.
    ProjectStatus {
        Planned => "planned",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// Kind of field work. Maintenance visits and repairs are the common ones.
    WorkOrderKind {
        Maintenance => "maintenance",
        Repair => "repair",
        Installation => "installation",
        Inspection => "inspection",
    }
);

text_enum!(
    /// Lifecycle of a work order.
    WorkOrderStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// How often a maintenance visit repeats.
    Recurrence {
        None => "none",
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
    }
);

text_enum!(
    /// Lifecycle of an invoice.
    InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Void => "void",
    }
);

text_enum!(
    /// Supported outbound messaging providers.
    ProviderKind {
        Smtp => "smtp",
        Sendgrid => "sendgrid",
        Twilio => "twilio",
        Gmail => "gmail",
    }
);

text_enum!(
    /// Channel a provider delivers messages through.
    ProviderChannel {
        Email => "email",
        Sms => "sms",
    }
);

impl ProviderKind {
    pub const fn channel(self) -> ProviderChannel {
        match self {
            ProviderKind::Smtp | ProviderKind::Sendgrid | ProviderKind::Gmail => {
                ProviderChannel::Email
            }
            ProviderKind::Twilio => ProviderChannel::Sms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive() {
        assert!(ClientId::new(1).is_ok());
        assert_eq!(ClientId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(
            WorkOrderId::try_from(-4),
            Err(TypeConstraintError::NonPositiveId)
        );
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = EmailAddress::new("  Pool.Owner@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "pool.owner@example.com");
        assert_eq!(
            EmailAddress::new("not-an-email"),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn phone_is_normalized_to_e164() {
        let phone = PhoneNumber::new("+1 (415) 555-2671").unwrap();
        assert_eq!(phone.as_str(), "+14155552671");
        assert!(PhoneNumber::new("   ").is_err());
    }

    #[test]
    fn description_is_sanitized() {
        let text = Description::new("Filter <script>alert(1)</script>clogged").unwrap();
        assert_eq!(text.as_str(), "Filter clogged");
        assert!(Description::optional(Some("   ")).is_none());
    }

    #[test]
    fn money_rejects_negative_amounts() {
        assert_eq!(Cents::new(-1), Err(TypeConstraintError::NegativeAmount));
        assert_eq!(Cents::new(12_345).unwrap().to_string(), "123.45");
    }

    #[test]
    fn tax_rounds_half_up() {
        let rate = TaxRate::new(825).unwrap();
        // 8.25% of 10.10 = 0.83325
        assert_eq!(rate.apply(Cents::new(1010).unwrap()).get(), 83);
        // 5% of 0.10 = 0.005 -> 0.01
        assert_eq!(TaxRate::new(500).unwrap().apply(Cents::new(10).unwrap()).get(), 1);
        assert!(TaxRate::new(10_001).is_err());
    }

    #[test]
    fn password_enforces_minimum_length() {
        assert_eq!(
            Password::new("short").unwrap_err(),
            TypeConstraintError::PasswordTooShort(Password::MIN_LENGTH)
        );
        assert_eq!(format!("{:?}", Password::new("long enough").unwrap()), "Password(***)");
    }

    #[test]
    fn text_enums_round_trip_through_strings() {
        for status in WorkOrderStatus::ALL {
            assert_eq!(status.as_str().parse::<WorkOrderStatus>().unwrap(), *status);
        }
        assert!("paused".parse::<WorkOrderStatus>().is_err());
        assert_eq!(ProviderKind::Twilio.channel(), ProviderChannel::Sms);
    }
}
