//! Club member model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{missing_required, Defaulted, Record};

/// Image shown for members without a photo.
pub const DEFAULT_MEMBER_IMAGE: &str = "/static/img/members/default.webp";

/// A club member, addressed by position in `members.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    /// Keys written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub defaulted: Defaulted,
}

impl Record for Member {
    fn defaulted(&self) -> &Defaulted {
        &self.defaulted
    }

    fn defaulted_mut(&mut self) -> &mut Defaulted {
        &mut self.defaulted
    }
}

impl Member {
    pub fn missing_fields(&self) -> Vec<String> {
        missing_required(&[
            ("name", &self.name),
            ("role", &self.role),
            ("year", &self.year),
        ])
    }
}

/// Request body for adding a member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMemberRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
}

impl CreateMemberRequest {
    pub fn into_member(self) -> Member {
        let image = if self.image.trim().is_empty() {
            DEFAULT_MEMBER_IMAGE.to_string()
        } else {
            self.image
        };
        Member {
            name: self.name,
            role: self.role,
            year: self.year,
            domain: self.domain,
            image,
            linkedin: self.linkedin,
            github: self.github,
            extra: Map::new(),
            defaulted: Defaulted::default(),
        }
    }
}

/// Request body for a partial member update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

impl UpdateMemberRequest {
    /// Merge the supplied fields into `member`; absent fields keep their value.
    pub fn apply(&self, member: &mut Member) {
        if let Some(name) = &self.name {
            member.name = name.clone();
        }
        if let Some(role) = &self.role {
            member.role = role.clone();
        }
        if let Some(year) = &self.year {
            member.year = year.clone();
        }
        if let Some(domain) = &self.domain {
            member.domain = domain.clone();
        }
        if let Some(image) = &self.image {
            member.image = if image.trim().is_empty() {
                DEFAULT_MEMBER_IMAGE.to_string()
            } else {
                image.clone()
            };
        }
        if let Some(linkedin) = &self.linkedin {
            member.linkedin = linkedin.clone();
        }
        if let Some(github) = &self.github {
            member.github = github.clone();
        }
    }
}
