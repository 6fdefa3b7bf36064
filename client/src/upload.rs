//! File upload through the request lifecycle.
//!
//! Every selected file is sent as a `multipart/form-data` part named
//! [`UPLOAD_FIELD`].

use crate::error::FetchError;
use crate::lifecycle::{RequestLifecycle, RequestOptions, ServerResult};
use crate::notify::Notifier;
use crate::transport::{RequestBody, Transport, UploadFile};

/// Multipart field name carrying uploaded files.
pub const UPLOAD_FIELD: &str = "files[]";

/// Restrictions on what may be uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Comma-separated accept list (`.pdf`, `image/*`, `text/plain`); empty accepts anything.
    pub accept: Option<String>,
    /// Allow more than one file.
    pub multiple: bool,
}

impl UploadOptions {
    /// Accept a single file of any type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted files.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Allow several files.
    #[must_use]
    pub const fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Check a selection against these restrictions.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Rejected`] for an empty selection, several files
    /// when `multiple` is off, or a file not matching `accept`.
    pub fn validate(&self, files: &[UploadFile]) -> Result<(), FetchError> {
        if files.is_empty() {
            return Err(FetchError::Rejected("no files selected".to_string()));
        }
        if !self.multiple && files.len() > 1 {
            return Err(FetchError::Rejected("only one file may be uploaded".to_string()));
        }
        if let Some(file) = files.iter().find(|file| !self.accepts(file)) {
            return Err(FetchError::Rejected(format!(
                "file type not accepted: {}",
                file.name
            )));
        }
        Ok(())
    }

    /// Whether `file` matches the accept list.
    #[must_use]
    pub fn accepts(&self, file: &UploadFile) -> bool {
        let Some(accept) = self.accept.as_deref().filter(|a| !a.trim().is_empty()) else {
            return true;
        };

        let name = file.name.to_ascii_lowercase();
        let mime = file
            .content_type
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        accept
            .split(',')
            .map(|entry| entry.trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .any(|entry| {
                if entry.starts_with('.') {
                    name.ends_with(&entry)
                } else if let Some(major) = entry.strip_suffix("/*") {
                    mime.split_once('/').is_some_and(|(m, _)| m == major)
                } else {
                    mime == entry
                }
            })
    }
}

impl<T: Transport, N: Notifier> RequestLifecycle<T, N> {
    /// Upload `files` with `options`, following the request lifecycle.
    ///
    /// The body of `options` is replaced by the multipart payload.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Rejected`] without contacting the server if the
    /// selection fails validation, otherwise whatever
    /// [`execute`](Self::execute) returns.
    pub async fn upload(
        &self,
        files: Vec<UploadFile>,
        restrictions: &UploadOptions,
        options: RequestOptions<'_>,
    ) -> Result<ServerResult, FetchError> {
        restrictions.validate(&files)?;
        self.run(options.with_body(multipart(files)), false).await
    }

    /// Upload `files`, showing any error through `owner.message`.
    pub async fn upload_and_report(
        &self,
        files: Vec<UploadFile>,
        restrictions: &UploadOptions,
        options: RequestOptions<'_>,
    ) -> Option<ServerResult> {
        if let Err(err) = restrictions.validate(&files) {
            tracing::warn!(error = %err, "upload rejected");
            if let Some(owner) = options.owner {
                owner.message(&err.to_string());
            }
            return None;
        }
        self.run(options.with_body(multipart(files)), true).await.ok()
    }
}

fn multipart(files: Vec<UploadFile>) -> RequestBody {
    RequestBody::Multipart(
        files
            .into_iter()
            .map(|file| (UPLOAD_FIELD.to_string(), file))
            .collect(),
    )
}
