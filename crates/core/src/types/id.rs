//! Newtype IDs for type-safe document references.
//!
//! Document stores assign opaque string identifiers. Use the `define_id!`
//! macro to create type-safe wrappers that prevent accidentally mixing IDs
//! from different collections.

/// Macro to define a type-safe document ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use bizdesk_core::define_id;
/// define_id!(InvoiceId);
/// define_id!(VehicleId);
///
/// let invoice_id = InvoiceId::new("a1b2c3");
/// let vehicle_id = VehicleId::new("a1b2c3");
///
/// // These are different types, so this won't compile:
/// // let _: InvoiceId = vehicle_id;
/// assert_eq!(invoice_id.as_str(), vehicle_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a document identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying identifier.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard document IDs
define_id!(ProfileId);
define_id!(CustomerId);
define_id!(PasswordHelpRequestId);

// Identity-provider user ID (Firebase `localId`). A profile document links
// to its identity-provider account through this value once it is resolved.
define_id!(AuthUid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_conversions() {
        let id = CustomerId::new("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id.as_str(), "abc123");

        let from_str: CustomerId = "abc123".into();
        assert_eq!(from_str, id);

        let raw: String = id.into();
        assert_eq!(raw, "abc123");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProfileId::new("u-1");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"u-1\""));
    }
}
