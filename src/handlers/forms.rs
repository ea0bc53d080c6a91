/// Multipart form parsing for post submissions
///
/// The authoring form carries `title`, `description`, repeated `tags`, and
/// optional `image`/`video` file parts. Parsing failures (unreadable
/// multipart, non-numeric tag id, body over the configured bound) surface as
/// `MalformedRequest` through the extractor's error handler; empty required
/// fields surface as a `FormRejection` so the client can re-render the form.
use actix_multipart::form::bytes::Bytes as FormBytes;
use actix_multipart::form::text::Text;
use actix_multipart::form::MultipartForm;
use actix_multipart::MultipartError;
use actix_web::HttpRequest;

use crate::error::AppError;
use crate::media::UploadPart;
use crate::models::FormRejection;

/// Raw multipart payload of a post create/edit submission.
#[derive(Debug, MultipartForm)]
pub struct PostSubmission {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    #[multipart(rename = "tags")]
    pub tags: Vec<Text<i64>>,
    pub image: Option<FormBytes>,
    pub video: Option<FormBytes>,
}

/// Parsed submission handed to the mutation services.
#[derive(Debug, Clone)]
pub struct SubmittedContent {
    pub title: String,
    pub description: String,
    pub tag_ids: Vec<i64>,
    pub image: Option<UploadPart>,
    pub video: Option<UploadPart>,
}

impl From<PostSubmission> for SubmittedContent {
    fn from(form: PostSubmission) -> Self {
        Self {
            title: form.title.map(Text::into_inner).unwrap_or_default(),
            description: form.description.map(Text::into_inner).unwrap_or_default(),
            tag_ids: form.tags.into_iter().map(Text::into_inner).collect(),
            image: form.image.and_then(file_part),
            video: form.video.and_then(file_part),
        }
    }
}

impl SubmittedContent {
    /// Required-field presence check. No trimming or normalization is
    /// performed; whitespace-only values pass.
    pub fn validate_required(&self) -> Result<(), FormRejection> {
        if self.title.is_empty() || self.description.is_empty() || self.tag_ids.is_empty() {
            return Err(FormRejection::with_fields(
                "Empty fields are not allowed",
                &self.title,
                &self.description,
                &self.tag_ids,
            ));
        }
        Ok(())
    }
}

/// Map a multipart file part to an upload, treating the empty part a browser
/// sends for an unselected file input as "no attachment supplied".
fn file_part(bytes: FormBytes) -> Option<UploadPart> {
    let original_name = bytes.file_name.unwrap_or_default();
    if original_name.is_empty() && bytes.data.is_empty() {
        return None;
    }

    Some(UploadPart {
        original_name,
        data: bytes.data.to_vec(),
    })
}

/// Extractor error handler wired into `MultipartFormConfig`.
pub fn multipart_error_handler(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    AppError::MalformedRequest(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(title: &str, description: &str, tag_ids: Vec<i64>) -> SubmittedContent {
        SubmittedContent {
            title: title.to_string(),
            description: description.to_string(),
            tag_ids,
            image: None,
            video: None,
        }
    }

    #[test]
    fn missing_title_is_rejected() {
        let err = content("", "body", vec![1]).validate_required().unwrap_err();
        assert_eq!(err.message, "Empty fields are not allowed");
        assert_eq!(err.description, "body");
    }

    #[test]
    fn missing_description_is_rejected() {
        assert!(content("t", "", vec![1]).validate_required().is_err());
    }

    #[test]
    fn empty_tag_selection_is_rejected() {
        let err = content("t", "d", vec![]).validate_required().unwrap_err();
        assert_eq!(err.title, "t");
        assert!(err.tag_ids.is_empty());
    }

    #[test]
    fn whitespace_is_accepted_as_is() {
        assert!(content("  ", "\t", vec![2]).validate_required().is_ok());
    }

    #[test]
    fn unselected_file_input_counts_as_absent() {
        let empty = FormBytes {
            data: actix_web::web::Bytes::new(),
            content_type: None,
            file_name: Some(String::new()),
        };
        assert!(file_part(empty).is_none());

        let named = FormBytes {
            data: actix_web::web::Bytes::from_static(b"x"),
            content_type: None,
            file_name: Some("a.png".to_string()),
        };
        let part = file_part(named).unwrap();
        assert_eq!(part.original_name, "a.png");
        assert_eq!(part.data, b"x");
    }
}
