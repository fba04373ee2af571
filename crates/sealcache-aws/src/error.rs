use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use sealcache_core::{RemoteCall, RemoteError};
use std::fmt::Debug;

/// Map an SDK failure to a [`RemoteError`], keeping the service error code.
pub(crate) fn remote_error<E, R>(operation: RemoteCall, err: &SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    match err {
        SdkError::ServiceError(context) => {
            let service_err = context.err();
            let message = service_err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| service_err.to_string());
            let remote = RemoteError::new(operation, message);
            match service_err.code() {
                Some(code) => remote.with_code(code),
                None => remote,
            }
        }
        other => RemoteError::new(operation, DisplayErrorContext(other).to_string()),
    }
}
