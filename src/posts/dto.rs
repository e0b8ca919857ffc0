use serde::Deserialize;

use crate::validation::{self, FormErrors};

/// Submitted create/edit form.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
}

/// Title and content that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "title", &self.title);
        if validation::required(&mut errors, "content", &self.content) {
            validation::min_length(&mut errors, "content", &self.content, 30);
        }
        errors.into_result(PostInput {
            title: self.title.clone(),
            content: self.content.clone(),
        })
    }
}
