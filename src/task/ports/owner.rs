//! Owner resolution port.

use crate::task::domain::{OwnerKind, OwnerRef, TaskDomainError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Domain records that may own background tasks.
///
/// # Examples
///
/// ```
/// use taskwatch::task::ports::TaskOwner;
///
/// struct Invoice {
///     id: u64,
/// }
///
/// impl TaskOwner for Invoice {
///     const KIND: &'static str = "invoice";
///
///     fn owner_id(&self) -> u64 {
///         self.id
///     }
/// }
///
/// let owner = Invoice { id: 12 }.owner_ref().expect("valid owner");
/// assert_eq!(owner.to_string(), "invoice:12");
/// ```
pub trait TaskOwner {
    /// Type tag shared by every record of this kind.
    const KIND: &'static str;

    /// Returns the record identifier.
    fn owner_id(&self) -> u64;

    /// Returns the owner reference of this record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the kind tag or identifier is invalid.
    fn owner_ref(&self) -> Result<OwnerRef, TaskDomainError> {
        OwnerRef::from_parts(Self::KIND, self.owner_id())
    }

    /// Returns the owner kind of this record type.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidOwnerKind`] when the tag is invalid.
    fn owner_kind() -> Result<OwnerKind, TaskDomainError>
    where
        Self: Sized,
    {
        OwnerKind::new(Self::KIND)
    }
}

/// Resolves owner references to live domain records.
#[async_trait]
pub trait OwnerRegistry: Send + Sync {
    /// Returns a display label for the owner, or `None` when it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`OwnerRegistryError`] when the lookup itself fails.
    async fn resolve(&self, owner: &OwnerRef) -> Result<Option<String>, OwnerRegistryError>;
}

/// Errors returned by owner registry adapters.
#[derive(Debug, Clone, Error)]
pub enum OwnerRegistryError {
    /// The backing store could not be read or written.
    #[error("owner lookup failed: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl OwnerRegistryError {
    /// Wraps a lookup failure.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
