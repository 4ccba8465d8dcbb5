//! Write requests: what the admin console sends to the backend.

use serde_json::Value;

/// Which write to perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Create,
    Update(u64),
    Delete(u64),
}

/// Request body in the transport format the backend expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    Multipart(MultipartPayload),
}

/// Text fields plus an optional attached file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartPayload {
    pub fields: Vec<(String, String)>,
    pub file: Option<FileUpload>,
}

/// A file chosen in an admin form.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    /// Form field name the backend reads the file from
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MultipartPayload {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Build the reqwest form. An unparseable content type is dropped
    /// rather than failing the upload.
    pub(crate) fn to_form(&self) -> reqwest::multipart::Form {
        use reqwest::multipart::{Form, Part};

        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }

        if let Some(file) = &self.file {
            let part = || Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            let part = match &file.content_type {
                Some(content_type) => part().mime_str(content_type).unwrap_or_else(|_| part()),
                None => part(),
            };
            form = form.part(file.field.clone(), part);
        }

        form
    }
}

/// One write against a backend resource.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    /// Resource path, e.g. `archives`
    pub resource: String,
    pub method: WriteMethod,
    pub payload: Payload,
}

impl WriteRequest {
    pub fn create(resource: &str, payload: Payload) -> Self {
        Self {
            resource: resource.to_string(),
            method: WriteMethod::Create,
            payload,
        }
    }

    pub fn update(resource: &str, id: u64, payload: Payload) -> Self {
        Self {
            resource: resource.to_string(),
            method: WriteMethod::Update(id),
            payload,
        }
    }

    pub fn delete(resource: &str, id: u64) -> Self {
        Self {
            resource: resource.to_string(),
            method: WriteMethod::Delete(id),
            payload: Payload::Empty,
        }
    }

    /// Path relative to the API base.
    pub fn path(&self) -> String {
        match self.method {
            WriteMethod::Create => self.resource.clone(),
            WriteMethod::Update(id) | WriteMethod::Delete(id) => {
                format!("{}/{}", self.resource, id)
            }
        }
    }
}
