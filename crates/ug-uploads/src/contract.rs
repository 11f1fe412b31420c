//! Upload contract
//!
//! Checks an incoming upload against the policy before anything is sent.
//! Checks run in the declaration order of [`ValidationStep`] and stop at the
//! first failure, so a request with several defects always reports the
//! earliest one.

use tracing::{debug, warn};
use ug_core::error::{UploadError, UploadResult};

use crate::model::{CategoryRoute, UploadRequest, UploadedFile, ValidatedUpload};
use crate::policy::UploadPolicy;

/// A single check of the contract, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationStep {
    Configuration,
    Request,
    Category,
    File,
    Extension,
    Size,
    Route,
}

impl ValidationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Request => "request",
            Self::Category => "category",
            Self::File => "file",
            Self::Extension => "extension",
            Self::Size => "size",
            Self::Route => "route",
        }
    }

    /// The step that produces `error`, if it is a validation error
    pub fn of(error: &UploadError) -> Option<Self> {
        match error {
            UploadError::ConfigurationIncomplete { .. } => Some(Self::Configuration),
            UploadError::MissingRequest => Some(Self::Request),
            UploadError::MissingCategory => Some(Self::Category),
            UploadError::MissingFile => Some(Self::File),
            UploadError::UnsupportedType { .. } => Some(Self::Extension),
            UploadError::SizeLimitMissing { .. } | UploadError::PayloadTooLarge { .. } => {
                Some(Self::Size)
            }
            UploadError::UnknownCategory { .. } => Some(Self::Route),
            UploadError::Transfer(_) => None,
        }
    }
}

impl std::fmt::Display for ValidationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract for accepting an upload
pub struct UploadContract<'a> {
    policy: &'a UploadPolicy,
}

impl<'a> UploadContract<'a> {
    pub fn new(policy: &'a UploadPolicy) -> Self {
        Self { policy }
    }

    /// Validate the request, resolving its destination folder
    pub fn validate(&self, request: Option<UploadRequest>) -> UploadResult<ValidatedUpload> {
        self.run(request).map_err(|err| {
            let step = ValidationStep::of(&err).map(|s| s.as_str()).unwrap_or("unknown");
            warn!(step, code = err.error_code(), error = %err, "Upload rejected");
            err
        })
    }

    fn run(&self, request: Option<UploadRequest>) -> UploadResult<ValidatedUpload> {
        self.check_configuration()?;

        let request = request.ok_or(UploadError::MissingRequest)?;

        let category = match request.category {
            Some(category) if !category.is_empty() => category,
            _ => return Err(UploadError::MissingCategory),
        };

        let file = request.file.ok_or(UploadError::MissingFile)?;

        let extension = self.check_extension(&file)?;
        self.check_size(&file, &extension)?;

        let route = self.resolve_category(category)?;
        debug!(category = %route.category, folder = %route.folder, "Upload accepted");

        Ok(ValidatedUpload { route, file })
    }

    fn check_configuration(&self) -> UploadResult<()> {
        let missing = self.policy.missing_sections();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(UploadError::ConfigurationIncomplete { missing })
        }
    }

    fn check_extension(&self, file: &UploadedFile) -> UploadResult<String> {
        let extension = file.normalized_extension();
        if self.policy.accepts(&extension) {
            Ok(extension)
        } else {
            Err(UploadError::UnsupportedType { extension })
        }
    }

    fn check_size(&self, file: &UploadedFile, extension: &str) -> UploadResult<()> {
        let max = self
            .policy
            .size_limit(extension)
            .ok_or_else(|| UploadError::SizeLimitMissing {
                extension: extension.to_string(),
            })?;

        let size = file.size();
        if size > max {
            return Err(UploadError::PayloadTooLarge { size, max });
        }
        Ok(())
    }

    fn resolve_category(&self, category: String) -> UploadResult<CategoryRoute> {
        match self.policy.folder_for(&category) {
            Some(folder) => Ok(CategoryRoute {
                folder: folder.to_string(),
                category,
            }),
            None => Err(UploadError::UnknownCategory { category }),
        }
    }
}
