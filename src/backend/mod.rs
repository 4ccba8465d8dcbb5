//! REST backend access: HTTP client, wire records and write requests.

pub mod client;
pub mod entities;
pub mod error;
pub mod write;

pub use client::{AdminUser, ApiClient, Credentials, LoginResponse};
pub use entities::{
    ArchiveRecord, Collection, CommitteeMemberRecord, ListItem, NewsRecord, PartnerRecord,
    SessionRecord, SpeakerRecord, Summarize, ThemeRecord,
};
pub use error::ApiError;
pub use write::{FileUpload, MultipartPayload, Payload, WriteMethod, WriteRequest};
