//! Persisted session model: the token pair plus the identity cached next to it.
//!
//! The four fields are always written together and cleared together; stores receive a whole
//! [`Session`] (or a clear request) and never a single field.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Keys under which a session is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionField {
	/// Short-lived bearer credential.
	AccessToken,
	/// Credential exchanged for a new pair.
	RefreshToken,
	/// Display label of the signed-in office.
	OfficeName,
	/// Wallet address bound to the signed-in office.
	WalletAddress,
}
impl SessionField {
	/// Every persisted field, in storage order.
	pub const ALL: [SessionField; 4] =
		[Self::AccessToken, Self::RefreshToken, Self::OfficeName, Self::WalletAddress];

	/// Returns the storage key for the field.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::AccessToken => "access_token",
			Self::RefreshToken => "refresh_token",
			Self::OfficeName => "office_name",
			Self::WalletAddress => "wallet_address",
		}
	}
}
impl Display for SessionField {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Access and refresh credentials; replaced wholesale on every refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret; callers must avoid logging it.
	pub refresh_token: TokenSecret,
}
impl TokenPair {
	/// Creates a pair from raw token strings.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}

/// Identity cached alongside the token pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
	/// Display label of the signed-in office.
	pub office_name: String,
	/// Wallet address bound to the office.
	pub wallet_address: String,
}

/// Complete persisted session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	/// Credential pair.
	pub tokens: TokenPair,
	/// Cached identity.
	pub identity: SessionIdentity,
}
impl Session {
	/// Returns the stored value for a single field.
	pub fn field(&self, field: SessionField) -> &str {
		match field {
			SessionField::AccessToken => self.tokens.access_token.expose(),
			SessionField::RefreshToken => self.tokens.refresh_token.expose(),
			SessionField::OfficeName => &self.identity.office_name,
			SessionField::WalletAddress => &self.identity.wallet_address,
		}
	}

	/// Flattens the session into its four key/value entries.
	pub fn to_entries(&self) -> [(SessionField, String); 4] {
		SessionField::ALL.map(|field| (field, self.field(field).to_owned()))
	}

	/// Rebuilds a session from raw entries; `None` unless all four fields are present.
	pub fn from_entries(entries: &HashMap<SessionField, String>) -> Option<Self> {
		let value = |field: SessionField| entries.get(&field).cloned();

		Some(Self {
			tokens: TokenPair {
				access_token: value(SessionField::AccessToken)?.into(),
				refresh_token: value(SessionField::RefreshToken)?.into(),
			},
			identity: SessionIdentity {
				office_name: value(SessionField::OfficeName)?,
				wallet_address: value(SessionField::WalletAddress)?,
			},
		})
	}
}

/// Body returned by the sign-in and refresh endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct SessionGrant {
	/// Newly minted access token.
	pub access_token: TokenSecret,
	/// Refresh token to persist (may equal the one just presented).
	pub refresh_token: TokenSecret,
	/// Office label of the session owner.
	pub office_name: String,
	/// Wallet address of the session owner.
	pub wallet_address: String,
	/// Token type hint, typically `bearer`.
	#[serde(default)]
	pub token_type: Option<String>,
}
impl From<SessionGrant> for Session {
	fn from(grant: SessionGrant) -> Self {
		Self {
			tokens: TokenPair {
				access_token: grant.access_token,
				refresh_token: grant.refresh_token,
			},
			identity: SessionIdentity {
				office_name: grant.office_name,
				wallet_address: grant.wallet_address,
			},
		}
	}
}

/// Body returned by the registration endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
	/// Human-readable confirmation.
	#[serde(default)]
	pub message: Option<String>,
	/// Wallet address generated for the new office.
	pub wallet_address: String,
}

/// Credentials posted to the sign-in and registration endpoints.
#[derive(Clone, Serialize)]
pub(crate) struct OfficeCredentials<'a> {
	pub(crate) office_name: &'a str,
	pub(crate) password: &'a str,
}
