//! In-memory storage driver

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::StreamExt;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use granary_drivers::{
    compute_md5_hex, decode_content_md5, embed_error, is_valid_bucket, is_valid_object_name,
    BadDigest, BucketAcl, BucketExists, BucketMetadata, BucketNameInvalid, BucketNotFound,
    ByteStream, Driver, DriverConfig, DriverResult, EntityTooLarge, InvalidRange,
    ObjectExists, ObjectMetadata, ObjectNameInvalid, ObjectNotFound, OperationNotPermitted,
    TooManyBuckets,
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

struct StoredObject {
    metadata: ObjectMetadata,
    data: Bytes,
}

struct StoredBucket {
    metadata: BucketMetadata,
    objects: BTreeMap<String, StoredObject>,
}

/// In-memory storage driver
///
/// Buckets and objects live in ordered maps behind a single lock, so listings
/// come out sorted and bucket-limit checks are atomic with insertion.
pub struct MemoryDriver {
    config: DriverConfig,
    buckets: RwLock<BTreeMap<String, StoredBucket>>,
}

impl MemoryDriver {
    pub fn new(config: DriverConfig) -> Self {
        info!(
            "Initialized memory driver (max_buckets: {}, max_object_size: {} bytes, read_only: {})",
            config.max_buckets, config.max_object_size, config.read_only
        );

        Self {
            config,
            buckets: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn ensure_writable(&self, operation: &str) -> DriverResult<()> {
        if self.config.read_only {
            return Err(OperationNotPermitted::new(operation, "driver is read-only").into());
        }
        Ok(())
    }

    fn check_bucket(bucket: &str) -> DriverResult<()> {
        if !is_valid_bucket(bucket) {
            return Err(BucketNameInvalid::new(bucket).into());
        }
        Ok(())
    }

    fn check_object(bucket: &str, object: &str) -> DriverResult<()> {
        Self::check_bucket(bucket)?;
        if !is_valid_object_name(object) {
            return Err(ObjectNameInvalid::new(bucket, object).into());
        }
        Ok(())
    }

    /// Run `f` against a stored object under the read lock
    fn with_object<T>(
        &self,
        bucket: &str,
        object: &str,
        f: impl FnOnce(&StoredObject) -> DriverResult<T>,
    ) -> DriverResult<T> {
        Self::check_object(bucket, object)?;

        let buckets = self.buckets.read();
        let stored = buckets
            .get(bucket)
            .ok_or_else(|| BucketNotFound::new(bucket))?;
        let entry = stored
            .objects
            .get(object)
            .ok_or_else(|| ObjectNotFound::new(bucket, object))?;
        f(entry)
    }

    /// Checks that can run before any object data is received
    fn precheck_create(
        &self,
        bucket: &str,
        object: &str,
        expected_md5: Option<&str>,
    ) -> DriverResult<Option<[u8; 16]>> {
        self.ensure_writable("CreateObject")?;
        Self::check_object(bucket, object)?;

        let expected = expected_md5
            .map(|md5| decode_content_md5(bucket, object, md5))
            .transpose()?;

        let buckets = self.buckets.read();
        let stored = buckets
            .get(bucket)
            .ok_or_else(|| BucketNotFound::new(bucket))?;
        if stored.objects.contains_key(object) {
            return Err(ObjectExists::new(bucket, object).into());
        }

        Ok(expected)
    }

    fn too_large(&self, bucket: &str, object: &str, size: u64) -> EntityTooLarge {
        warn!(
            "Rejecting {}/{}: {} bytes exceeds limit of {} bytes",
            bucket, object, size, self.config.max_object_size
        );
        EntityTooLarge::new(
            bucket,
            object,
            size.to_string(),
            self.config.max_object_size.to_string(),
        )
    }

    fn store_object(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        expected_md5: Option<(&str, [u8; 16])>,
        data: Bytes,
    ) -> DriverResult<String> {
        let size = data.len() as u64;
        if size > self.config.max_object_size {
            return Err(self.too_large(bucket, object, size).into());
        }

        let md5 = compute_md5_hex(&data);
        if let Some((supplied, expected)) = expected_md5
            && hex::encode(expected) != md5
        {
            warn!(
                "Digest mismatch for {}/{}: supplied {}, computed {}",
                bucket, object, supplied, md5
            );
            return Err(BadDigest::new(bucket, object, supplied).into());
        }

        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        let mut buckets = self.buckets.write();
        let stored = buckets
            .get_mut(bucket)
            .ok_or_else(|| BucketNotFound::new(bucket))?;
        if stored.objects.contains_key(object) {
            return Err(ObjectExists::new(bucket, object).into());
        }

        debug!("Stored {} bytes at {}/{}", size, bucket, object);

        stored.objects.insert(
            object.to_string(),
            StoredObject {
                metadata: ObjectMetadata {
                    bucket: bucket.to_string(),
                    key: object.to_string(),
                    content_type: content_type.to_string(),
                    created: Utc::now(),
                    md5: md5.clone(),
                    size,
                },
                data,
            },
        );

        Ok(md5)
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn list_buckets(&self) -> DriverResult<Vec<BucketMetadata>> {
        let buckets = self.buckets.read();
        Ok(buckets.values().map(|b| b.metadata.clone()).collect())
    }

    async fn create_bucket(&self, bucket: &str, acl: &str) -> DriverResult<()> {
        self.ensure_writable("CreateBucket")?;
        Self::check_bucket(bucket)?;
        let acl: BucketAcl = acl.parse()?;

        let mut buckets = self.buckets.write();
        if buckets.contains_key(bucket) {
            return Err(BucketExists::new(bucket).into());
        }
        if buckets.len() >= self.config.max_buckets {
            return Err(TooManyBuckets::new(bucket).into());
        }

        buckets.insert(
            bucket.to_string(),
            StoredBucket {
                metadata: BucketMetadata {
                    name: bucket.to_string(),
                    created: Utc::now(),
                    acl,
                },
                objects: BTreeMap::new(),
            },
        );

        info!("Created bucket {} ({})", bucket, acl);
        Ok(())
    }

    async fn get_bucket_metadata(&self, bucket: &str) -> DriverResult<BucketMetadata> {
        Self::check_bucket(bucket)?;

        let buckets = self.buckets.read();
        buckets
            .get(bucket)
            .map(|b| b.metadata.clone())
            .ok_or_else(|| BucketNotFound::new(bucket).into())
    }

    async fn set_bucket_metadata(&self, bucket: &str, acl: &str) -> DriverResult<()> {
        self.ensure_writable("SetBucketMetadata")?;
        Self::check_bucket(bucket)?;
        let acl: BucketAcl = acl.parse()?;

        let mut buckets = self.buckets.write();
        let stored = buckets
            .get_mut(bucket)
            .ok_or_else(|| BucketNotFound::new(bucket))?;
        stored.metadata.acl = acl;

        debug!("Set ACL of bucket {} to {}", bucket, acl);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, object: &str) -> DriverResult<Bytes> {
        debug!("Reading object {}/{}", bucket, object);
        self.with_object(bucket, object, |entry| Ok(entry.data.clone()))
    }

    async fn get_partial_object(
        &self,
        bucket: &str,
        object: &str,
        start: i64,
        length: i64,
    ) -> DriverResult<Bytes> {
        debug!(
            "Reading object range {}+{} from {}/{}",
            start, length, bucket, object
        );

        self.with_object(bucket, object, |entry| {
            let size = entry.data.len() as i64;
            if start < 0 || length < 0 || start > size || length > size - start {
                return Err(InvalidRange::new(start, length).into());
            }

            let begin = start as usize;
            let end = begin + length as usize;
            Ok(entry.data.slice(begin..end))
        })
    }

    async fn get_object_metadata(&self, bucket: &str, object: &str) -> DriverResult<ObjectMetadata> {
        self.with_object(bucket, object, |entry| Ok(entry.metadata.clone()))
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> DriverResult<Vec<ObjectMetadata>> {
        Self::check_bucket(bucket)?;

        let buckets = self.buckets.read();
        let stored = buckets
            .get(bucket)
            .ok_or_else(|| BucketNotFound::new(bucket))?;

        Ok(stored
            .objects
            .values()
            .filter(|entry| entry.metadata.key.starts_with(prefix))
            .map(|entry| entry.metadata.clone())
            .collect())
    }

    async fn create_object(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        expected_md5: Option<&str>,
        data: Bytes,
    ) -> DriverResult<String> {
        debug!("Writing {} bytes to {}/{}", data.len(), bucket, object);

        let expected = self.precheck_create(bucket, object, expected_md5)?;
        let expected = expected_md5.zip(expected);
        self.store_object(bucket, object, content_type, expected, data)
    }

    async fn create_object_stream(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        expected_md5: Option<&str>,
        mut stream: ByteStream,
    ) -> DriverResult<String> {
        debug!("Writing object stream to {}/{}", bucket, object);

        let expected = self.precheck_create(bucket, object, expected_md5)?;
        let expected = expected_md5.zip(expected);

        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Stream for {}/{} failed: {}", bucket, object, e);
                    return Err(embed_error(bucket, object, e).into());
                }
            };

            let received = (buffer.len() + chunk.len()) as u64;
            if received > self.config.max_object_size {
                return Err(self.too_large(bucket, object, received).into());
            }
            buffer.extend_from_slice(&chunk);
        }

        self.store_object(bucket, object, content_type, expected, buffer.freeze())
    }
}
