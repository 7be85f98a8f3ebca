//! Domain services: contacts, favorites and tags.
//!
//! Thin call-throughs on the gateway. Each method checks the envelope once
//! and hands back its `data`; gateway failures propagate unchanged.

use serde_json::{json, Value};

use crate::endpoints;
use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::types::{expect_success, Contact, Envelope, Tag};

#[derive(Clone)]
pub struct ContactService {
    gateway: Gateway,
}

impl ContactService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn list(&self) -> Result<Vec<Contact>, ApiError> {
        Envelope::into_data(self.gateway.get(endpoints::contacts::ALL)?)
    }

    pub fn search(&self, term: &str) -> Result<Vec<Contact>, ApiError> {
        Envelope::into_data(self.gateway.get(&endpoints::contacts::search(term))?)
    }

    pub fn get(&self, id: &str) -> Result<Contact, ApiError> {
        Envelope::into_data(self.gateway.get(&endpoints::contacts::by_id(id))?)
    }

    pub fn create(&self, payload: &Value) -> Result<Contact, ApiError> {
        Envelope::into_data(self.gateway.post(endpoints::contacts::ALL, Some(payload))?)
    }

    pub fn update(&self, id: &str, payload: &Value) -> Result<Contact, ApiError> {
        Envelope::into_data(
            self.gateway
                .put(&endpoints::contacts::by_id(id), Some(payload))?,
        )
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        expect_success(self.gateway.delete(&endpoints::contacts::by_id(id))?)
    }
}

#[derive(Clone)]
pub struct FavoriteService {
    gateway: Gateway,
}

impl FavoriteService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn list(&self) -> Result<Vec<Contact>, ApiError> {
        Envelope::into_data(self.gateway.get(endpoints::favorites::ALL)?)
    }

    /// Mark a contact as favorite. Returns the updated contact.
    pub fn add(&self, id: &str) -> Result<Contact, ApiError> {
        Envelope::into_data(self.gateway.put(&endpoints::favorites::by_id(id), None)?)
    }

    /// Unmark a contact. Returns the updated contact.
    pub fn remove(&self, id: &str) -> Result<Contact, ApiError> {
        Envelope::into_data(self.gateway.delete(&endpoints::favorites::by_id(id))?)
    }
}

#[derive(Clone)]
pub struct TagService {
    gateway: Gateway,
}

impl TagService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn list(&self) -> Result<Vec<Tag>, ApiError> {
        Envelope::into_data(self.gateway.get(endpoints::tags::ALL)?)
    }

    pub fn get(&self, id: &str) -> Result<Tag, ApiError> {
        Envelope::into_data(self.gateway.get(&endpoints::tags::by_id(id))?)
    }

    pub fn create(&self, payload: &Value) -> Result<Tag, ApiError> {
        Envelope::into_data(self.gateway.post(endpoints::tags::ALL, Some(payload))?)
    }

    pub fn update(&self, id: &str, payload: &Value) -> Result<Tag, ApiError> {
        Envelope::into_data(self.gateway.put(&endpoints::tags::by_id(id), Some(payload))?)
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        expect_success(self.gateway.delete(&endpoints::tags::by_id(id))?)
    }

    /// Contacts carrying this tag.
    pub fn contacts(&self, tag_id: &str) -> Result<Vec<Contact>, ApiError> {
        Envelope::into_data(self.gateway.get(&endpoints::tags::contacts(tag_id))?)
    }

    pub fn add_contact(&self, tag_id: &str, contact_id: &str) -> Result<Tag, ApiError> {
        let body = json!({ "contactId": contact_id });
        Envelope::into_data(
            self.gateway
                .post(&endpoints::tags::contacts(tag_id), Some(&body))?,
        )
    }

    pub fn add_contacts(&self, tag_id: &str, contact_ids: &[&str]) -> Result<Tag, ApiError> {
        let body = json!({ "contactIds": contact_ids });
        Envelope::into_data(
            self.gateway
                .post(&endpoints::tags::contacts_bulk(tag_id), Some(&body))?,
        )
    }

    pub fn remove_contact(&self, tag_id: &str, contact_id: &str) -> Result<Tag, ApiError> {
        Envelope::into_data(
            self.gateway
                .delete(&endpoints::tags::contact(tag_id, contact_id))?,
        )
    }

    /// Contacts not yet carrying this tag.
    pub fn available_contacts(&self, tag_id: &str) -> Result<Vec<Contact>, ApiError> {
        Envelope::into_data(
            self.gateway
                .get(&endpoints::tags::available_contacts(tag_id))?,
        )
    }
}
