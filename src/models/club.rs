//! Singleton documents: club information and contact details.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Defaulted, Record};

/// General information about the club, shown across the public site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub logo: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub defaulted: Defaulted,
}

impl Record for ClubInfo {
    fn defaulted(&self) -> &Defaulted {
        &self.defaulted
    }

    fn defaulted_mut(&mut self) -> &mut Defaulted {
        &mut self.defaulted
    }
}

impl Default for ClubInfo {
    fn default() -> Self {
        Self {
            name: "Coding Club".to_string(),
            short_name: "CC".to_string(),
            tagline: "Learn. Build. Share.".to_string(),
            description: String::new(),
            college: String::new(),
            department: String::new(),
            address: String::new(),
            logo: "/static/img/logo.webp".to_string(),
            extra: Map::new(),
            defaulted: Defaulted::default(),
        }
    }
}

/// Partial overwrite of [`ClubInfo`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClubInfoRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl UpdateClubInfoRequest {
    pub fn apply(&self, info: &mut ClubInfo) {
        let fields = [
            (&self.name, &mut info.name),
            (&self.short_name, &mut info.short_name),
            (&self.tagline, &mut info.tagline),
            (&self.description, &mut info.description),
            (&self.college, &mut info.college),
            (&self.department, &mut info.department),
            (&self.address, &mut info.address),
            (&self.logo, &mut info.logo),
        ];
        for (update, target) in fields {
            if let Some(value) = update {
                *target = value.clone();
            }
        }
    }
}

/// A named contact with a phone number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Contact details shown in the site footer and contact section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub faculty_coordinators: Vec<ContactPerson>,
    #[serde(default)]
    pub secretaries: Vec<ContactPerson>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub defaulted: Defaulted,
}

impl Record for ContactInfo {
    fn defaulted(&self) -> &Defaulted {
        &self.defaulted
    }

    fn defaulted_mut(&mut self) -> &mut Defaulted {
        &mut self.defaulted
    }
}

/// Partial overwrite of [`ContactInfo`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContactInfoRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub faculty_coordinators: Option<Vec<ContactPerson>>,
    #[serde(default)]
    pub secretaries: Option<Vec<ContactPerson>>,
}

impl UpdateContactInfoRequest {
    pub fn apply(&self, contact: &mut ContactInfo) {
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(linkedin) = &self.linkedin {
            contact.linkedin = linkedin.clone();
        }
        if let Some(instagram) = &self.instagram {
            contact.instagram = instagram.clone();
        }
        if let Some(facebook) = &self.facebook {
            contact.facebook = facebook.clone();
        }
        if let Some(people) = &self.faculty_coordinators {
            contact.faculty_coordinators = people.clone();
        }
        if let Some(people) = &self.secretaries {
            contact.secretaries = people.clone();
        }
    }
}
