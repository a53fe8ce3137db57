//! Storage driver trait

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use crate::error::{ApiNotImplemented, DriverResult, InvalidAcl, InvalidDigest};

/// Type alias for a boxed stream of object data
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Maximum object name length in bytes
pub const MAX_OBJECT_NAME_LEN: usize = 1024;

/// Canned bucket ACL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketAcl {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
}

impl BucketAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketAcl::Private => "private",
            BucketAcl::PublicRead => "public-read",
            BucketAcl::PublicReadWrite => "public-read-write",
        }
    }
}

impl FromStr for BucketAcl {
    type Err = InvalidAcl;

    /// An empty string means the default (private) ACL
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "private" => Ok(BucketAcl::Private),
            "public-read" => Ok(BucketAcl::PublicRead),
            "public-read-write" => Ok(BucketAcl::PublicReadWrite),
            other => Err(InvalidAcl::new(other)),
        }
    }
}

impl fmt::Display for BucketAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub acl: BucketAcl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub created: DateTime<Utc>,
    /// Hex-encoded MD5 of the object data
    pub md5: String,
    pub size: u64,
}

/// Storage driver trait
///
/// Every failure is reported as a [`DriverError`](crate::DriverError) so
/// callers can react to the specific kind.
#[async_trait]
pub trait Driver: Send + Sync {
    /// List all buckets, sorted by name
    async fn list_buckets(&self) -> DriverResult<Vec<BucketMetadata>>;

    /// Create a bucket with the given canned ACL (empty means private)
    async fn create_bucket(&self, bucket: &str, acl: &str) -> DriverResult<()>;

    async fn get_bucket_metadata(&self, bucket: &str) -> DriverResult<BucketMetadata>;

    /// Replace the ACL of an existing bucket
    async fn set_bucket_metadata(&self, bucket: &str, acl: &str) -> DriverResult<()>;

    /// Remove an empty bucket
    async fn delete_bucket(&self, _bucket: &str) -> DriverResult<()> {
        Err(ApiNotImplemented::new("DeleteBucket").into())
    }

    /// Read an object fully into memory
    async fn get_object(&self, bucket: &str, object: &str) -> DriverResult<Bytes>;

    /// Read `length` bytes starting at `start`
    async fn get_partial_object(
        &self,
        bucket: &str,
        object: &str,
        start: i64,
        length: i64,
    ) -> DriverResult<Bytes>;

    async fn get_object_metadata(&self, bucket: &str, object: &str) -> DriverResult<ObjectMetadata>;

    /// List objects whose key starts with `prefix`, sorted by key
    async fn list_objects(&self, bucket: &str, prefix: &str) -> DriverResult<Vec<ObjectMetadata>>;

    /// Store an object, returning its hex MD5
    ///
    /// `expected_md5` is the base64 Content-MD5 supplied by the client, if any.
    async fn create_object(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        expected_md5: Option<&str>,
        data: Bytes,
    ) -> DriverResult<String>;

    /// Store an object from a stream, returning its hex MD5
    async fn create_object_stream(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        expected_md5: Option<&str>,
        stream: ByteStream,
    ) -> DriverResult<String>;
}

/// Check a bucket name against the naming rules
///
/// 3 to 63 characters of lowercase letters, digits, `.` and `-`, starting
/// and ending with a letter or digit, without consecutive dots.
pub fn is_valid_bucket(bucket: &str) -> bool {
    if bucket.len() < 3 || bucket.len() > 63 {
        return false;
    }

    let bytes = bucket.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
        return false;
    }

    if bucket.contains("..") {
        return false;
    }

    bytes
        .iter()
        .all(|&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
}

/// Check an object name: non-empty, bounded length, no NUL, no leading `/`
pub fn is_valid_object_name(object: &str) -> bool {
    !object.is_empty()
        && object.len() <= MAX_OBJECT_NAME_LEN
        && !object.contains('\0')
        && !object.starts_with('/')
}

/// Decode a base64 Content-MD5 value into the raw 16-byte digest
pub fn decode_content_md5(bucket: &str, key: &str, content_md5: &str) -> DriverResult<[u8; 16]> {
    let invalid = || InvalidDigest::new(bucket, key, content_md5);

    let raw = STANDARD.decode(content_md5.trim()).map_err(|_| invalid())?;
    let digest: [u8; 16] = raw.try_into().map_err(|_| invalid())?;
    Ok(digest)
}

/// Compute the hex-encoded MD5 of data
pub fn compute_md5_hex(data: &[u8]) -> String {
    use md5::{Digest, Md5};
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
