//! Conversions between contract models and store documents.

use anyhow::Context;
use serde_json::Value;

use crate::contract::model::{NewContact, NewProfile, UserProfile};
use crate::domain::ports::{Document, DocumentWrite, FieldWrite};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

/// Full write for a new profile; both timestamps come from the server.
pub fn new_profile_to_write(profile: NewProfile) -> DocumentWrite {
    let mut write = DocumentWrite::new();
    write.insert("name".into(), FieldWrite::value(profile.name));
    write.insert("email".into(), FieldWrite::value(profile.email));
    if let Some(phone) = profile.phone {
        write.insert("phone".into(), FieldWrite::value(phone));
    }
    if let Some(provider) = profile.provider {
        write.insert(
            "provider".into(),
            FieldWrite::Value(serde_json::to_value(provider).unwrap_or(Value::Null)),
        );
    }
    write.insert(CREATED_AT.into(), FieldWrite::ServerTimestamp);
    write.insert(UPDATED_AT.into(), FieldWrite::ServerTimestamp);
    write
}

pub fn touch_write() -> DocumentWrite {
    DocumentWrite::from([(UPDATED_AT.to_string(), FieldWrite::ServerTimestamp)])
}

pub fn document_to_profile(doc: &Document) -> anyhow::Result<UserProfile> {
    serde_json::from_value(Value::Object(doc.clone())).context("malformed profile document")
}

pub fn new_contact_to_write(contact: NewContact) -> DocumentWrite {
    DocumentWrite::from([
        ("name".to_string(), FieldWrite::value(contact.name)),
        ("email".to_string(), FieldWrite::value(contact.email)),
        ("subject".to_string(), FieldWrite::value(contact.subject)),
        ("message".to_string(), FieldWrite::value(contact.message)),
        ("timestamp".to_string(), FieldWrite::ServerTimestamp),
        ("read".to_string(), FieldWrite::value(false)),
    ])
}
