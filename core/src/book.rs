//! Local contact list state for a screen.
//!
//! Mutations are applied to the local list only after the server confirms
//! them. A failed request leaves the list exactly as it was, so the list
//! always reflects the last server-confirmed outcome.

use serde_json::Value;

use crate::error::ApiError;
use crate::services::{ContactService, FavoriteService};
use crate::types::Contact;

pub struct ContactBook {
    contacts: ContactService,
    favorites: FavoriteService,
    entries: Vec<Contact>,
}

impl ContactBook {
    pub fn new(contacts: ContactService, favorites: FavoriteService) -> Self {
        Self {
            contacts,
            favorites,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Contact] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Contact> {
        self.entries.iter().filter(|c| c.is_favorite)
    }

    /// Contacts whose name, email or phone contains `term`.
    pub fn filter(&self, term: &str) -> Vec<&Contact> {
        self.entries.iter().filter(|c| c.matches(term)).collect()
    }

    /// Replace the local list with the server's.
    pub fn refresh(&mut self) -> Result<(), ApiError> {
        self.entries = self.contacts.list()?;
        Ok(())
    }

    pub fn add(&mut self, payload: &Value) -> Result<&Contact, ApiError> {
        let created = self.contacts.create(payload)?;
        self.entries.push(created);
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    pub fn update(&mut self, id: &str, payload: &Value) -> Result<&Contact, ApiError> {
        let updated = self.contacts.update(id, payload)?;
        Ok(self.upsert(updated))
    }

    pub fn remove(&mut self, id: &str) -> Result<(), ApiError> {
        self.contacts.delete(id)?;
        self.entries.retain(|c| c.id != id);
        Ok(())
    }

    /// Flip the favorite flag of a listed contact.
    ///
    /// Returns the new flag, or `None` without sending anything when `id`
    /// is not in the local list.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<Option<bool>, ApiError> {
        let Some(current) = self.get(id).map(|c| c.is_favorite) else {
            return Ok(None);
        };

        let mut updated = if current {
            self.favorites.remove(id)?
        } else {
            self.favorites.add(id)?
        };
        // The request succeeded, so the flag flipped even if the echoed
        // record omits it.
        updated.is_favorite = !current;
        Ok(Some(self.upsert(updated).is_favorite))
    }

    fn upsert(&mut self, contact: Contact) -> &Contact {
        let index = match self.entries.iter().position(|c| c.id == contact.id) {
            Some(index) => {
                self.entries[index] = contact;
                index
            }
            None => {
                self.entries.push(contact);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }
}
