//! Granary Storage Drivers
//!
//! This crate defines the error vocabulary shared by all Granary storage
//! drivers, the driver trait, and the configuration every driver honors.

pub mod config;
pub mod driver;
pub mod error;
pub mod kind;

pub use config::{ConfigError, DriverConfig};
pub use driver::{
    compute_md5_hex, decode_content_md5, is_valid_bucket, is_valid_object_name, BucketAcl,
    BucketMetadata, ByteStream, Driver, ObjectMetadata, MAX_OBJECT_NAME_LEN,
};
pub use error::{
    embed_error, ApiNotImplemented, BackendCorrupted, BackendError, BadDigest, BoxError,
    BucketExists, BucketNameInvalid, BucketNotFound, DigestError, DriverError, DriverResult,
    EntityTooLarge, GenericBucketError, GenericObjectError, ImplementationError, InvalidAcl,
    InvalidDigest, InvalidRange, ObjectExists, ObjectNameInvalid, ObjectNotFound,
    OperationNotPermitted, TooManyBuckets,
};
pub use kind::{classify, ErrorFamily, ErrorKind};
