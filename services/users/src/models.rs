//! User records and the views derived from them

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored user row
///
/// `id` is assigned by the store on insert; `photo_path` is only changed
/// through the photo operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<i64>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub patronymic: Option<String>,
    pub birth_date: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub photo_path: Option<String>,
}

/// Contact details projected from a [`User`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContactInfo {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub patronymic: Option<String>,
    pub phone_number: String,
    pub email: String,
}

impl From<User> for UserContactInfo {
    fn from(user: User) -> Self {
        Self {
            last_name: user.last_name,
            first_name: user.first_name,
            patronymic: user.patronymic,
            phone_number: user.phone_number,
            email: user.email,
        }
    }
}

/// An uploaded photo file
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Filename as sent by the client
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_json_uses_camel_case() {
        let user = User {
            id: Some(7),
            last_name: Some("Ivanov".to_string()),
            first_name: Some("Ivan".to_string()),
            patronymic: None,
            birth_date: Some("1990-01-01".to_string()),
            email: "ivan@example.com".to_string(),
            phone_number: "+79990000000".to_string(),
            photo_path: None,
        };

        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({
                "id": 7,
                "lastName": "Ivanov",
                "firstName": "Ivan",
                "patronymic": null,
                "birthDate": "1990-01-01",
                "email": "ivan@example.com",
                "phoneNumber": "+79990000000",
                "photoPath": null
            })
        );
    }

    #[test]
    fn test_user_payload_optional_fields_may_be_omitted() {
        let user: User =
            serde_json::from_value(json!({"email": "a@x.com", "phoneNumber": "+1"})).unwrap();

        assert_eq!(user.id, None);
        assert_eq!(user.first_name, None);
        assert_eq!(user.photo_path, None);
    }

    #[test]
    fn test_contact_info_hides_private_fields() {
        let user = User {
            id: Some(1),
            birth_date: Some("2000-02-02".to_string()),
            photo_path: Some("photos/x.png".to_string()),
            email: "a@x.com".to_string(),
            phone_number: "+1".to_string(),
            ..Default::default()
        };

        let value = serde_json::to_value(UserContactInfo::from(user)).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("birthDate"));
        assert!(!object.contains_key("photoPath"));
        assert!(!object.contains_key("id"));
        assert_eq!(object["email"], "a@x.com");
    }
}
