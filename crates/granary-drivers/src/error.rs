//! Driver error types
//!
//! Every way a bucket, object or backend operation can fail has its own type
//! here. Drivers return them wrapped in [`DriverError`] so callers can match
//! on the variant instead of parsing messages.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed failure produced below the driver layer (disk, codec, network)
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias used throughout the driver layer
pub type DriverResult<T> = Result<T, DriverError>;

/// Backend error shape: a location on the storage medium
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub path: String,
}

/// Bucket error shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericBucketError {
    pub bucket: String,
}

/// Object error shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericObjectError {
    pub bucket: String,
    pub object: String,
}

/// Digest error shape
///
/// `digest` is the Content-MD5 value exactly as the client supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestError {
    pub bucket: String,
    pub key: String,
    pub digest: String,
}

impl BackendError {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl GenericBucketError {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl GenericObjectError {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
        }
    }
}

impl DigestError {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            digest: digest.into(),
        }
    }
}

// Backend

/// Data at `path` is corrupted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Backend corrupted: {}", .0.path)]
pub struct BackendCorrupted(pub BackendError);

impl BackendCorrupted {
    pub fn new(path: impl Into<String>) -> Self {
        Self(BackendError::new(path))
    }
}

// Capability

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Api not implemented: {api}")]
pub struct ApiNotImplemented {
    pub api: String,
}

impl ApiNotImplemented {
    pub fn new(api: impl Into<String>) -> Self {
        Self { api: api.into() }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Operation {operation} not permitted for reason: {reason}")]
pub struct OperationNotPermitted {
    pub operation: String,
    pub reason: String,
}

impl OperationNotPermitted {
    pub fn new(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

// Access control

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Requested ACL is {acl} invalid")]
pub struct InvalidAcl {
    pub acl: String,
}

impl InvalidAcl {
    pub fn new(acl: impl Into<String>) -> Self {
        Self { acl: acl.into() }
    }
}

// Buckets

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Bucket name invalid: {}", .0.bucket)]
pub struct BucketNameInvalid(pub GenericBucketError);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Bucket exists: {}", .0.bucket)]
pub struct BucketExists(pub GenericBucketError);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Bucket not Found: {}", .0.bucket)]
pub struct BucketNotFound(pub GenericBucketError);

/// Bucket creation refused because the bucket limit is reached
///
/// The message always names 100, whatever limit the driver enforces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Bucket limit exceeded beyond 100, cannot create bucket: {}", .0.bucket)]
pub struct TooManyBuckets(pub GenericBucketError);

impl BucketNameInvalid {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self(GenericBucketError::new(bucket))
    }
}

impl BucketExists {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self(GenericBucketError::new(bucket))
    }
}

impl BucketNotFound {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self(GenericBucketError::new(bucket))
    }
}

impl TooManyBuckets {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self(GenericBucketError::new(bucket))
    }
}

// Objects

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Object not Found: {}#{}", .0.bucket, .0.object)]
pub struct ObjectNotFound(pub GenericObjectError);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Object exists: {}#{}", .0.bucket, .0.object)]
pub struct ObjectExists(pub GenericObjectError);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Object name invalid: {}#{}", .0.bucket, .0.object)]
pub struct ObjectNameInvalid(pub GenericObjectError);

/// Object size exceeds the maximum the driver accepts
///
/// `size` and `total_size` are preformatted by the caller. The message joins
/// them without separating spaces and must stay that way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{}#{}with {}reached maximum allowed size limit {}",
    .object.bucket, .object.object, .size, .total_size
)]
pub struct EntityTooLarge {
    pub object: GenericObjectError,
    pub size: String,
    pub total_size: String,
}

impl ObjectNotFound {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self(GenericObjectError::new(bucket, object))
    }
}

impl ObjectExists {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self(GenericObjectError::new(bucket, object))
    }
}

impl ObjectNameInvalid {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self(GenericObjectError::new(bucket, object))
    }
}

impl EntityTooLarge {
    pub fn new(
        bucket: impl Into<String>,
        object: impl Into<String>,
        size: impl Into<String>,
        total_size: impl Into<String>,
    ) -> Self {
        Self {
            object: GenericObjectError::new(bucket, object),
            size: size.into(),
            total_size: total_size.into(),
        }
    }
}

// Digests

/// Supplied MD5 does not match the received data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Md5 provided {} mismatches for: {}#{}", .0.digest, .0.bucket, .0.key)]
pub struct BadDigest(pub DigestError);

/// Supplied MD5 could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Md5 provided {} is invalid", .0.digest)]
pub struct InvalidDigest(pub DigestError);

impl BadDigest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self(DigestError::new(bucket, key, digest))
    }
}

impl InvalidDigest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self(DigestError::new(bucket, key, digest))
    }
}

// Requests

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid range start:{start} length:{length}")]
pub struct InvalidRange {
    pub start: i64,
    pub length: i64,
}

impl InvalidRange {
    pub fn new(start: i64, length: i64) -> Self {
        Self { start, length }
    }
}

/// Lower-level failure annotated with the bucket and object it concerns
///
/// Either context field may be empty, in which case it is left out of the
/// rendered message. The cause is kept intact and exposed through
/// [`StdError::source`].
#[derive(Debug)]
pub struct ImplementationError {
    bucket: String,
    object: String,
    cause: BoxError,
}

impl ImplementationError {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// Borrow the wrapped failure
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Borrow the wrapped failure as a concrete type, if it is one
    pub fn downcast_cause_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.cause.downcast_ref::<T>()
    }

    /// Unwrap, discarding the context
    pub fn into_cause(self) -> BoxError {
        self.cause
    }
}

impl fmt::Display for ImplementationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.bucket.is_empty() {
            write!(f, "Bucket: {} ", self.bucket)?;
        }
        if !self.object.is_empty() {
            write!(f, "Object: {} ", self.object)?;
        }
        write!(f, "Error: {}", self.cause)
    }
}

impl StdError for ImplementationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Attach bucket and object context to a lower-level failure
///
/// Pass an empty string for context that does not apply.
pub fn embed_error(
    bucket: impl Into<String>,
    object: impl Into<String>,
    cause: impl Into<BoxError>,
) -> ImplementationError {
    ImplementationError {
        bucket: bucket.into(),
        object: object.into(),
        cause: cause.into(),
    }
}

/// Any failure a storage driver can report
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    BackendCorrupted(#[from] BackendCorrupted),

    #[error(transparent)]
    ApiNotImplemented(#[from] ApiNotImplemented),

    #[error(transparent)]
    OperationNotPermitted(#[from] OperationNotPermitted),

    #[error(transparent)]
    InvalidAcl(#[from] InvalidAcl),

    #[error(transparent)]
    BucketNameInvalid(#[from] BucketNameInvalid),

    #[error(transparent)]
    BucketExists(#[from] BucketExists),

    #[error(transparent)]
    BucketNotFound(#[from] BucketNotFound),

    #[error(transparent)]
    TooManyBuckets(#[from] TooManyBuckets),

    #[error(transparent)]
    ObjectNotFound(#[from] ObjectNotFound),

    #[error(transparent)]
    ObjectExists(#[from] ObjectExists),

    #[error(transparent)]
    ObjectNameInvalid(#[from] ObjectNameInvalid),

    #[error(transparent)]
    EntityTooLarge(#[from] EntityTooLarge),

    #[error(transparent)]
    BadDigest(#[from] BadDigest),

    #[error(transparent)]
    InvalidDigest(#[from] InvalidDigest),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),

    #[error(transparent)]
    Implementation(#[from] ImplementationError),
}
