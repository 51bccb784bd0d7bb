//! Common response envelope.

use serde::Serialize;

/// Wrapper placing the payload under a `data` key.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
