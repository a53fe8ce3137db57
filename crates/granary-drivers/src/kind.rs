//! Error classification
//!
//! Callers that only need to know *what sort* of failure occurred (to pick a
//! response status, decide whether to retry, or raise an alarm) can use
//! [`ErrorKind`] and [`ErrorFamily`] without matching on every payload.

use std::error::Error as StdError;
use std::fmt;

use crate::error::*;

/// Fieldless tag for every driver error type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BackendCorrupted,
    ApiNotImplemented,
    OperationNotPermitted,
    InvalidAcl,
    BucketNameInvalid,
    BucketExists,
    BucketNotFound,
    TooManyBuckets,
    ObjectNotFound,
    ObjectExists,
    ObjectNameInvalid,
    EntityTooLarge,
    BadDigest,
    InvalidDigest,
    InvalidRange,
    Implementation,
}

/// Broad grouping of error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorFamily {
    /// The storage medium itself is unreliable
    Backend,
    /// The driver cannot or will not perform the operation
    Capability,
    Bucket,
    Object,
    /// Content checksum problems
    Digest,
    AccessControl,
    /// The request parameters are unusable
    Request,
    /// A lower-level failure with bucket/object context attached
    Implementation,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 16] = [
        ErrorKind::BackendCorrupted,
        ErrorKind::ApiNotImplemented,
        ErrorKind::OperationNotPermitted,
        ErrorKind::InvalidAcl,
        ErrorKind::BucketNameInvalid,
        ErrorKind::BucketExists,
        ErrorKind::BucketNotFound,
        ErrorKind::TooManyBuckets,
        ErrorKind::ObjectNotFound,
        ErrorKind::ObjectExists,
        ErrorKind::ObjectNameInvalid,
        ErrorKind::EntityTooLarge,
        ErrorKind::BadDigest,
        ErrorKind::InvalidDigest,
        ErrorKind::InvalidRange,
        ErrorKind::Implementation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BackendCorrupted => "BackendCorrupted",
            ErrorKind::ApiNotImplemented => "APINotImplemented",
            ErrorKind::OperationNotPermitted => "OperationNotPermitted",
            ErrorKind::InvalidAcl => "InvalidACL",
            ErrorKind::BucketNameInvalid => "BucketNameInvalid",
            ErrorKind::BucketExists => "BucketExists",
            ErrorKind::BucketNotFound => "BucketNotFound",
            ErrorKind::TooManyBuckets => "TooManyBuckets",
            ErrorKind::ObjectNotFound => "ObjectNotFound",
            ErrorKind::ObjectExists => "ObjectExists",
            ErrorKind::ObjectNameInvalid => "ObjectNameInvalid",
            ErrorKind::EntityTooLarge => "EntityTooLarge",
            ErrorKind::BadDigest => "BadDigest",
            ErrorKind::InvalidDigest => "InvalidDigest",
            ErrorKind::InvalidRange => "InvalidRange",
            ErrorKind::Implementation => "ImplementationError",
        }
    }

    pub fn family(&self) -> ErrorFamily {
        match self {
            ErrorKind::BackendCorrupted => ErrorFamily::Backend,
            ErrorKind::ApiNotImplemented | ErrorKind::OperationNotPermitted => {
                ErrorFamily::Capability
            }
            ErrorKind::InvalidAcl => ErrorFamily::AccessControl,
            ErrorKind::BucketNameInvalid
            | ErrorKind::BucketExists
            | ErrorKind::BucketNotFound
            | ErrorKind::TooManyBuckets => ErrorFamily::Bucket,
            ErrorKind::ObjectNotFound
            | ErrorKind::ObjectExists
            | ErrorKind::ObjectNameInvalid
            | ErrorKind::EntityTooLarge => ErrorFamily::Object,
            ErrorKind::BadDigest | ErrorKind::InvalidDigest => ErrorFamily::Digest,
            ErrorKind::InvalidRange => ErrorFamily::Request,
            ErrorKind::Implementation => ErrorFamily::Implementation,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identify a driver error behind a type-erased error reference
///
/// Recognizes both the standalone kind types and [`DriverError`]. Returns
/// `None` for anything else.
pub fn classify(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    if let Some(driver) = err.downcast_ref::<DriverError>() {
        return Some(driver.kind());
    }

    let kind = if err.is::<BackendCorrupted>() {
        ErrorKind::BackendCorrupted
    } else if err.is::<ApiNotImplemented>() {
        ErrorKind::ApiNotImplemented
    } else if err.is::<OperationNotPermitted>() {
        ErrorKind::OperationNotPermitted
    } else if err.is::<InvalidAcl>() {
        ErrorKind::InvalidAcl
    } else if err.is::<BucketNameInvalid>() {
        ErrorKind::BucketNameInvalid
    } else if err.is::<BucketExists>() {
        ErrorKind::BucketExists
    } else if err.is::<BucketNotFound>() {
        ErrorKind::BucketNotFound
    } else if err.is::<TooManyBuckets>() {
        ErrorKind::TooManyBuckets
    } else if err.is::<ObjectNotFound>() {
        ErrorKind::ObjectNotFound
    } else if err.is::<ObjectExists>() {
        ErrorKind::ObjectExists
    } else if err.is::<ObjectNameInvalid>() {
        ErrorKind::ObjectNameInvalid
    } else if err.is::<EntityTooLarge>() {
        ErrorKind::EntityTooLarge
    } else if err.is::<BadDigest>() {
        ErrorKind::BadDigest
    } else if err.is::<InvalidDigest>() {
        ErrorKind::InvalidDigest
    } else if err.is::<InvalidRange>() {
        ErrorKind::InvalidRange
    } else if err.is::<ImplementationError>() {
        ErrorKind::Implementation
    } else {
        return None;
    };
    Some(kind)
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::BackendCorrupted(_) => ErrorKind::BackendCorrupted,
            DriverError::ApiNotImplemented(_) => ErrorKind::ApiNotImplemented,
            DriverError::OperationNotPermitted(_) => ErrorKind::OperationNotPermitted,
            DriverError::InvalidAcl(_) => ErrorKind::InvalidAcl,
            DriverError::BucketNameInvalid(_) => ErrorKind::BucketNameInvalid,
            DriverError::BucketExists(_) => ErrorKind::BucketExists,
            DriverError::BucketNotFound(_) => ErrorKind::BucketNotFound,
            DriverError::TooManyBuckets(_) => ErrorKind::TooManyBuckets,
            DriverError::ObjectNotFound(_) => ErrorKind::ObjectNotFound,
            DriverError::ObjectExists(_) => ErrorKind::ObjectExists,
            DriverError::ObjectNameInvalid(_) => ErrorKind::ObjectNameInvalid,
            DriverError::EntityTooLarge(_) => ErrorKind::EntityTooLarge,
            DriverError::BadDigest(_) => ErrorKind::BadDigest,
            DriverError::InvalidDigest(_) => ErrorKind::InvalidDigest,
            DriverError::InvalidRange(_) => ErrorKind::InvalidRange,
            DriverError::Implementation(_) => ErrorKind::Implementation,
        }
    }

    pub fn family(&self) -> ErrorFamily {
        self.kind().family()
    }

    /// Kind of the innermost driver error, looking through context wrappers
    ///
    /// Stops at the first wrapper whose cause is not a driver error and
    /// reports [`ErrorKind::Implementation`] for it.
    pub fn root_kind(&self) -> ErrorKind {
        let DriverError::Implementation(wrapped) = self else {
            return self.kind();
        };

        let mut current: &(dyn StdError + 'static) = wrapped;
        loop {
            if let Some(DriverError::Implementation(inner)) =
                current.downcast_ref::<DriverError>()
            {
                current = inner;
                continue;
            }
            let Some(inner) = current.downcast_ref::<ImplementationError>() else {
                break;
            };
            let cause: &(dyn StdError + 'static) = inner.cause();
            match classify(cause) {
                Some(_) => current = cause,
                None => return ErrorKind::Implementation,
            }
        }
        classify(current).unwrap_or(ErrorKind::Implementation)
    }

    /// Bucket or object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DriverError::BucketNotFound(_) | DriverError::ObjectNotFound(_)
        )
    }

    /// Data integrity is in question: corrupted backend or digest failure
    pub fn is_integrity(&self) -> bool {
        matches!(
            self.kind().family(),
            ErrorFamily::Backend | ErrorFamily::Digest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io;

    fn one_of_each() -> Vec<DriverError> {
        vec![
            BackendCorrupted::new("/p").into(),
            ApiNotImplemented::new("api").into(),
            OperationNotPermitted::new("op", "why").into(),
            InvalidAcl::new("acl").into(),
            BucketNameInvalid::new("b").into(),
            BucketExists::new("b").into(),
            BucketNotFound::new("b").into(),
            TooManyBuckets::new("b").into(),
            ObjectNotFound::new("b", "o").into(),
            ObjectExists::new("b", "o").into(),
            ObjectNameInvalid::new("b", "o").into(),
            EntityTooLarge::new("b", "o", "2", "1").into(),
            BadDigest::new("b", "k", "d").into(),
            InvalidDigest::new("b", "k", "d").into(),
            InvalidRange::new(0, 0).into(),
            embed_error("b", "o", io::Error::other("boom")).into(),
        ]
    }

    #[test]
    fn test_every_kind_is_distinct() {
        let errors = one_of_each();
        let kinds: Vec<ErrorKind> = errors.iter().map(DriverError::kind).collect();
        assert_eq!(kinds, ErrorKind::ALL.to_vec());

        let unique: HashSet<ErrorKind> = kinds.iter().copied().collect();
        assert_eq!(unique.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_classification_is_order_independent() {
        let mut errors = one_of_each();
        errors.reverse();
        for err in &errors {
            assert_eq!(classify(err), Some(err.kind()));
        }
    }

    #[test]
    fn test_classify_standalone_kinds() {
        assert_eq!(
            classify(&BucketNotFound::new("b")),
            Some(ErrorKind::BucketNotFound)
        );
        assert_eq!(
            classify(&EntityTooLarge::new("b", "o", "2", "1")),
            Some(ErrorKind::EntityTooLarge)
        );
        assert_eq!(classify(&io::Error::other("boom")), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(ErrorKind::BackendCorrupted.family(), ErrorFamily::Backend);
        assert_eq!(ErrorKind::ApiNotImplemented.family(), ErrorFamily::Capability);
        assert_eq!(
            ErrorKind::OperationNotPermitted.family(),
            ErrorFamily::Capability
        );
        assert_eq!(ErrorKind::TooManyBuckets.family(), ErrorFamily::Bucket);
        assert_eq!(ErrorKind::EntityTooLarge.family(), ErrorFamily::Object);
        assert_eq!(ErrorKind::InvalidDigest.family(), ErrorFamily::Digest);
        assert_eq!(ErrorKind::InvalidAcl.family(), ErrorFamily::AccessControl);
        assert_eq!(ErrorKind::InvalidRange.family(), ErrorFamily::Request);
        assert_eq!(
            ErrorKind::Implementation.family(),
            ErrorFamily::Implementation
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::ApiNotImplemented.to_string(), "APINotImplemented");
        assert_eq!(ErrorKind::InvalidAcl.as_str(), "InvalidACL");
        assert_eq!(ErrorKind::Implementation.as_str(), "ImplementationError");
    }

    #[test]
    fn test_root_kind_through_wrappers() {
        let inner: DriverError = ObjectNotFound::new("b", "o").into();
        let once: DriverError = embed_error("b", "o", inner).into();
        assert_eq!(once.kind(), ErrorKind::Implementation);
        assert_eq!(once.root_kind(), ErrorKind::ObjectNotFound);

        let twice: DriverError = embed_error("b", "", once).into();
        assert_eq!(twice.root_kind(), ErrorKind::ObjectNotFound);

        let bare: DriverError = embed_error("b", "o", BadDigest::new("b", "o", "x")).into();
        assert_eq!(bare.root_kind(), ErrorKind::BadDigest);

        let nested_plain = embed_error("", "", embed_error("b", "", InvalidRange::new(1, 2)));
        let nested_plain: DriverError = nested_plain.into();
        assert_eq!(nested_plain.root_kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn test_root_kind_stops_at_foreign_cause() {
        let err: DriverError = embed_error("b", "o", io::Error::other("boom")).into();
        assert_eq!(err.root_kind(), ErrorKind::Implementation);

        let plain: DriverError = BucketExists::new("b").into();
        assert_eq!(plain.root_kind(), ErrorKind::BucketExists);
    }

    #[test]
    fn test_predicates() {
        let not_found: DriverError = BucketNotFound::new("b").into();
        assert!(not_found.is_not_found());
        assert!(!not_found.is_integrity());

        let corrupted: DriverError = BackendCorrupted::new("/p").into();
        assert!(corrupted.is_integrity());

        let digest: DriverError = BadDigest::new("b", "k", "d").into();
        assert!(digest.is_integrity());
        assert!(!digest.is_not_found());
    }
}
