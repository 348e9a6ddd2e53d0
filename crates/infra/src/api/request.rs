//! Per-call request description

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;

/// What to send for one logical call. Cloned into every attempt.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    /// Merged over the credential headers; a caller value wins
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self { method, body: RequestBody::Empty, headers: HeaderMap::new(), query: Vec::new() }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).with_body(RequestBody::Json(body))
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::PUT).with_body(RequestBody::Json(body))
    }

    pub fn patch(body: Value) -> Self {
        Self::new(Method::PATCH).with_body(RequestBody::Json(body))
    }

    /// `multipart/form-data` upload
    pub fn multipart(method: Method, fields: Vec<MultipartField>) -> Self {
        Self::new(method).with_body(RequestBody::Multipart(fields))
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Kept as owned parts so the form can be rebuilt for each attempt
    Multipart(Vec<MultipartField>),
}

/// One part of a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: MultipartValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartValue {
    Text(String),
    File { bytes: Vec<u8>, file_name: String, mime: Option<String> },
}

impl MultipartField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: MultipartValue::Text(value.into()) }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: MultipartValue::File {
                bytes,
                file_name: file_name.into(),
                mime: mime.map(String::from),
            },
        }
    }
}

/// Fresh form for one attempt; fails on an unparseable MIME type.
pub fn build_form(fields: &[MultipartField]) -> Result<Form, reqwest::Error> {
    fields.iter().try_fold(Form::new(), |form, field| {
        let part = match &field.value {
            MultipartValue::Text(text) => Part::text(text.clone()),
            MultipartValue::File { bytes, file_name, mime } => {
                let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                match mime {
                    Some(mime) => part.mime_str(mime)?,
                    None => part,
                }
            }
        };
        Ok(form.part(field.name.clone(), part))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn constructors_set_method_and_body() {
        let options = RequestOptions::patch(json!({"status": "open"}));
        assert_eq!(options.method, Method::PATCH);
        assert!(matches!(options.body, RequestBody::Json(_)));

        let options = RequestOptions::delete();
        assert_eq!(options.method, Method::DELETE);
        assert!(matches!(options.body, RequestBody::Empty));
    }

    #[test]
    fn multipart_flagged() {
        let options = RequestOptions::multipart(
            Method::POST,
            vec![MultipartField::file("image", "logo.png", Some("image/png"), vec![1, 2, 3])],
        );
        assert!(options.is_multipart());
        assert!(!RequestOptions::get().is_multipart());
    }

    #[test]
    fn form_rebuilds_from_owned_fields() {
        let fields = vec![
            MultipartField::text("caption", "Spring hiring"),
            MultipartField::file("image", "banner.jpg", Some("image/jpeg"), vec![0xff, 0xd8]),
        ];

        assert!(build_form(&fields).is_ok());
        assert!(build_form(&fields).is_ok());
    }

    #[test]
    fn bad_mime_is_rejected() {
        let fields = vec![MultipartField::file("image", "x.bin", Some("not a mime"), vec![])];
        assert!(build_form(&fields).is_err());
    }

    #[test]
    fn query_pairs_accumulate() {
        let options = RequestOptions::get()
            .with_query([("page".to_string(), "2".to_string())])
            .with_query([("limit".to_string(), "20".to_string())]);
        assert_eq!(options.query.len(), 2);
    }
}
