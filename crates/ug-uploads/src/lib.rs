//! # ug-uploads
//!
//! Upload validation and transfer for Upload Gateway.
//!
//! ## Features
//!
//! - Read-only upload policy (extensions, size ceilings, category folders)
//! - Ordered validation of incoming uploads
//! - Collision-resistant destination names
//! - Transfer abstraction (FTP, local filesystem, in-memory)
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ug_uploads::{MemoryTransferClient, UploadPolicy, UploadRequest, UploadService, UploadedFile};
//!
//! let policy = Arc::new(UploadPolicy::from_config(&config));
//! let service = UploadService::new(policy, Arc::new(MemoryTransferClient::new()));
//!
//! let outcome = service
//!     .upload_file(Some(UploadRequest::new("Avatar", UploadedFile::new("me.png", data))))
//!     .await;
//! ```

pub mod contract;
pub mod model;
pub mod naming;
pub mod policy;
pub mod service;
pub mod transfer;

pub use contract::{UploadContract, ValidationStep};
pub use model::{CategoryRoute, UploadRequest, UploadedFile, ValidatedUpload};
pub use naming::{file_extension, generate_unique_name, unique_name_at};
pub use policy::{TransferEndpoint, UploadPolicy};
pub use service::UploadService;
pub use transfer::{
    relative_path, FtpTransferClient, LocalTransferClient, MemoryTransferClient, TransferClient,
    TransferError, TransferResult, UnavailableTransferClient, UPLOAD_ROOT,
};
