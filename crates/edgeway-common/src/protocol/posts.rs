//! Animal-post records exchanged between the gateway and the posts backend.
//!
//! Every backend operation has its own typed payload, validated at the
//! gateway boundary before anything is dispatched.

use serde::{Deserialize, Serialize};

use super::error::{EdgewayError, Result};

/// Backend method names.
pub mod methods {
    pub const CREATE: &str = "create_animal_post";
    pub const UPDATE: &str = "update_animal_post";
    pub const LIST: &str = "get_animals";
    pub const DELETE: &str = "delete_animal_post";
    pub const STATUS: &str = "check_status";
    pub const LOAD: &str = "get_load";
}

const MAX_TITLE_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 100;
const MAX_STATUS_LEN: usize = 50;
const MAX_IMAGES_LEN: usize = 255;

/// A stored animal post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnimalPost {
    pub post_id: u64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub status: String,
    #[serde(default)]
    pub images: Option<String>,
}

/// Payload for creating a post. Also the editable field set of an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub location: String,
    pub status: String,
    pub images: Option<String>,
}

impl NewPost {
    /// Checks required fields and the column widths of the post table.
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title, Some(MAX_TITLE_LEN))?;
        require("description", &self.description, None)?;
        require("location", &self.location, Some(MAX_LOCATION_LEN))?;
        require("status", &self.status, Some(MAX_STATUS_LEN))?;
        if let Some(images) = &self.images {
            if images.chars().count() > MAX_IMAGES_LEN {
                return Err(EdgewayError::InvalidRequest(format!(
                    "images must be at most {} characters",
                    MAX_IMAGES_LEN
                )));
            }
        }
        Ok(())
    }

    /// Materializes the post under the given id.
    pub fn into_post(self, post_id: u64) -> AnimalPost {
        AnimalPost {
            post_id,
            title: self.title,
            description: self.description,
            location: self.location,
            status: self.status,
            images: self.images,
        }
    }
}

fn require(field: &str, value: &str, max_len: Option<usize>) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EdgewayError::InvalidRequest(format!("{} is required", field)));
    }
    match max_len {
        Some(max) if value.chars().count() > max => Err(EdgewayError::InvalidRequest(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

/// Payload for replacing the fields of an existing post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    pub post_id: u64,
    #[serde(flatten)]
    pub fields: NewPost,
}

impl UpdatePost {
    pub fn new(post_id: u64, fields: NewPost) -> Self {
        Self { post_id, fields }
    }

    pub fn validate(&self) -> Result<()> {
        self.fields.validate()
    }
}

/// Payload for deleting a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeletePost {
    pub post_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    pub post_id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledged {
    pub message: String,
}

/// Full listing of posts, tagged with where it was served from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostList {
    pub posts: Vec<AnimalPost>,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceStatus {
    pub status: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceLoad {
    pub load: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NewPost {
        NewPost {
            title: "Found dog".into(),
            description: "Brown labrador near the park".into(),
            location: "Central Park".into(),
            status: "found".into(),
            images: Some("dog.jpg".into()),
        }
    }

    #[test]
    fn test_valid_post_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_default_to_empty_and_fail() {
        let post: NewPost = serde_json::from_value(json!({"title": "Only a title"})).unwrap();
        let err = post.validate().unwrap_err();
        assert!(err.to_string().contains("description is required"));
    }

    #[test]
    fn test_blank_field_is_rejected() {
        let post = NewPost {
            location: "   ".into(),
            ..sample()
        };
        let err = post.validate().unwrap_err();
        assert!(matches!(err, EdgewayError::InvalidRequest(ref m) if m.contains("location")));
    }

    #[test]
    fn test_column_widths_are_enforced() {
        let post = NewPost {
            status: "x".repeat(51),
            ..sample()
        };
        assert!(post.validate().is_err());

        let post = NewPost {
            images: Some("i".repeat(256)),
            ..sample()
        };
        assert!(post.validate().is_err());
    }

    #[test]
    fn test_update_flattens_fields_with_camel_case_id() {
        let update = UpdatePost::new(4, sample());
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["postId"], 4);
        assert_eq!(value["title"], "Found dog");
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn test_into_post_keeps_fields() {
        let post = sample().into_post(9);
        assert_eq!(post.post_id, 9);
        assert_eq!(post.location, "Central Park");
    }
}
