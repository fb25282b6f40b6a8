//! Profile aggregate and the request/projection shapes around it.
//!
//! A [`Profile`] is keyed by its [`EmailAddress`]. Create and update requests
//! arrive as [`ProfileCreateRequest`]; reads hand back a
//! [`ProfileProjection`], which is derived from the entity by a plain mapping
//! and never stored.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Maximum accepted length for an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised by profile value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
    PropertiesNotAnObject,
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "profile id must not be empty"),
            Self::InvalidId => write!(f, "profile id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
            Self::PropertiesNotAnObject => write!(f, "profile properties must be a JSON object"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Stable profile identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Validate and construct a [`ProfileId`] from a string.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(ProfileValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| ProfileValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Generate a new random [`ProfileId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID, e.g. one read back from the database.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProfileId> for String {
    fn from(value: ProfileId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ProfileId {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, non-empty local part and domain, no whitespace.
        let pattern = r"^[^@\s]+@[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address used as the unique profile key.
///
/// Input is trimmed and lower-cased, so two addresses differing only in case
/// name the same profile.
///
/// # Examples
/// ```
/// use profile_backend::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// assert!(EmailAddress::new("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProfileValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(ProfileValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(ProfileValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Kind of person a profile describes.
///
/// # Examples
///
/// ```
/// # use profile_backend::domain::ProfileCategory;
/// assert_eq!(ProfileCategory::Candidate.as_str(), "candidate");
/// assert_eq!("consultant".parse(), Ok(ProfileCategory::Consultant));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileCategory {
    /// Someone applying for a position.
    Candidate,
    /// Someone placed with or working for a client.
    Consultant,
}

impl ProfileCategory {
    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Consultant => "consultant",
        }
    }
}

impl fmt::Display for ProfileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProfileCategoryError {
    /// The unrecognised input value.
    pub input: String,
}

impl fmt::Display for ParseProfileCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown profile category: {}", self.input)
    }
}

impl std::error::Error for ParseProfileCategoryError {}

impl std::str::FromStr for ProfileCategory {
    type Err = ParseProfileCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(Self::Candidate),
            "consultant" => Ok(Self::Consultant),
            _ => Err(ParseProfileCategoryError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Open-ended key/value attributes attached to a profile.
///
/// Keys are kept sorted so serialised output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileProperties(BTreeMap<String, Value>);

impl ProfileProperties {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a single property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterate over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Property values rendered as text, keys excluded.
    ///
    /// Strings yield their contents unquoted, `null` yields nothing, and other
    /// values yield their JSON text. This matches PostgreSQL's
    /// `jsonb_each_text`.
    ///
    /// # Examples
    /// ```
    /// use profile_backend::domain::ProfileProperties;
    /// use serde_json::json;
    ///
    /// let props = ProfileProperties::try_from(json!({"a": "x", "b": 2, "c": null}))?;
    /// let texts: Vec<String> = props.value_texts().map(|text| text.into_owned()).collect();
    /// assert_eq!(texts, ["x", "2"]);
    /// # Ok::<(), profile_backend::domain::ProfileValidationError>(())
    /// ```
    pub fn value_texts(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.iter().filter_map(|(_, value)| match value {
            Value::Null => None,
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        })
    }

    /// Merge `incoming` into this map.
    ///
    /// Keys present in `incoming` overwrite existing values; keys absent from
    /// it are preserved.
    ///
    /// # Examples
    /// ```
    /// use profile_backend::domain::ProfileProperties;
    /// use serde_json::json;
    ///
    /// let mut stored: ProfileProperties =
    ///     [("a", json!(1)), ("b", json!(2))].into_iter().collect();
    /// let incoming: ProfileProperties =
    ///     [("b", json!(3)), ("c", json!(4))].into_iter().collect();
    /// stored.merge(incoming);
    ///
    /// let expected: ProfileProperties =
    ///     [("a", json!(1)), ("b", json!(3)), ("c", json!(4))].into_iter().collect();
    /// assert_eq!(stored, expected);
    /// ```
    pub fn merge(&mut self, incoming: ProfileProperties) {
        self.0.extend(incoming.0);
    }

    /// Render the map as a JSON object value.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ProfileProperties {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

impl From<BTreeMap<String, Value>> for ProfileProperties {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self(value)
    }
}

impl TryFrom<Value> for ProfileProperties {
    type Error = ProfileValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(ProfileValidationError::PropertiesNotAnObject),
        }
    }
}

/// Payload used both to create a profile and to update one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreateRequest {
    /// Key identifying the profile.
    pub email: EmailAddress,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Contact number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Candidate or consultant.
    #[serde(default)]
    pub category: Option<ProfileCategory>,
    /// Extra attributes; merged on update.
    #[serde(default)]
    pub properties: ProfileProperties,
}

impl ProfileCreateRequest {
    /// Request carrying only an email; other fields take their defaults.
    pub fn for_email(email: EmailAddress) -> Self {
        Self {
            email,
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            category: None,
            properties: ProfileProperties::new(),
        }
    }
}

/// Persisted profile entity.
///
/// ## Invariants
/// - `email` is unique across all profiles (enforced by the store).
/// - `creation_date` is fixed when the profile is built and has no mutator.
/// - `id` is `None` until the store has inserted the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<ProfileId>,
    email: EmailAddress,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    category: Option<ProfileCategory>,
    properties: ProfileProperties,
    creation_date: DateTime<Utc>,
}

impl Profile {
    /// Build a new, not yet persisted profile from a create request.
    pub fn from_request(request: ProfileCreateRequest, creation_date: DateTime<Utc>) -> Self {
        let ProfileCreateRequest {
            email,
            first_name,
            last_name,
            phone,
            category,
            properties,
        } = request;
        Self {
            id: None,
            email,
            first_name,
            last_name,
            phone,
            category,
            properties,
            creation_date,
        }
    }

    /// Create a builder, typically used by storage adapters rehydrating rows.
    pub fn builder(email: EmailAddress, creation_date: DateTime<Utc>) -> ProfileBuilder {
        ProfileBuilder::new(email, creation_date)
    }

    /// Overwrite the request-mapped fields.
    ///
    /// Identity, creation date and properties are left untouched; properties
    /// are combined separately through [`Profile::merge_properties`].
    pub fn apply_request(&mut self, request: &ProfileCreateRequest) {
        self.email = request.email.clone();
        self.first_name = request.first_name.clone();
        self.last_name = request.last_name.clone();
        self.phone = request.phone.clone();
        self.category = request.category;
    }

    /// Merge incoming properties over the stored ones.
    pub fn merge_properties(&mut self, incoming: ProfileProperties) {
        self.properties.merge(incoming);
    }

    /// Attach the identifier assigned by the store.
    pub fn with_id(mut self, id: ProfileId) -> Self {
        self.id = Some(id);
        self
    }

    /// Store-assigned identifier, if persisted.
    pub fn id(&self) -> Option<&ProfileId> {
        self.id.as_ref()
    }

    /// Unique email key.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Contact number.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Candidate or consultant, when known.
    pub fn category(&self) -> Option<ProfileCategory> {
        self.category
    }

    /// Extensible attributes.
    pub fn properties(&self) -> &ProfileProperties {
        &self.properties
    }

    /// When the profile was first created.
    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    /// Read-shaped view of this profile.
    pub fn projection(&self) -> ProfileProjection {
        ProfileProjection::from(self)
    }
}

/// Builder for constructing [`Profile`] instances field by field.
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    id: Option<ProfileId>,
    email: EmailAddress,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    category: Option<ProfileCategory>,
    properties: ProfileProperties,
    creation_date: DateTime<Utc>,
}

impl ProfileBuilder {
    /// Create a builder for the given email and creation timestamp.
    pub fn new(email: EmailAddress, creation_date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            email,
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            category: None,
            properties: ProfileProperties::new(),
            creation_date,
        }
    }

    /// Set the identifier.
    pub fn id(mut self, id: ProfileId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the given name.
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    /// Set the family name.
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    /// Set the phone number.
    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    /// Set the category.
    pub fn category(mut self, category: Option<ProfileCategory>) -> Self {
        self.category = category;
        self
    }

    /// Set the property map.
    pub fn properties(mut self, properties: ProfileProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Build the final [`Profile`] instance.
    pub fn build(self) -> Profile {
        Profile {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            category: self.category,
            properties: self.properties,
            creation_date: self.creation_date,
        }
    }
}

/// Read view of a profile returned by lookups, creates and updates.
///
/// `full_name` is derived from the first and last name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileProjection {
    /// Store-assigned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,
    /// Unique email key.
    pub email: EmailAddress,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// `"<first> <last>"` with empty parts dropped.
    pub full_name: String,
    /// Contact number.
    pub phone: Option<String>,
    /// Candidate or consultant.
    pub category: Option<ProfileCategory>,
    /// Extensible attributes.
    pub properties: ProfileProperties,
}

impl ProfileProjection {
    /// Join first and last name, skipping blank parts.
    pub fn full_name_of(first_name: &str, last_name: &str) -> String {
        [first_name.trim(), last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&Profile> for ProfileProjection {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            full_name: Self::full_name_of(&profile.first_name, &profile.last_name),
            phone: profile.phone.clone(),
            category: profile.category,
            properties: profile.properties.clone(),
        }
    }
}
