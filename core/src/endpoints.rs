//! REST paths consumed by the client, relative to the base URL.

pub mod auth {
    pub const REGISTER: &str = "/auth/register";
    pub const LOGIN: &str = "/auth/login";
    pub const LOGOUT: &str = "/auth/logout";
}

pub mod contacts {
    pub const ALL: &str = "/user/contacts";

    pub fn by_id(id: &str) -> String {
        format!("{ALL}/{}", urlencoding::encode(id))
    }

    pub fn search(term: &str) -> String {
        format!("{ALL}?search={}", urlencoding::encode(term))
    }
}

pub mod favorites {
    pub const ALL: &str = "/user/favorites";

    pub fn by_id(id: &str) -> String {
        format!("{ALL}/{}", urlencoding::encode(id))
    }
}

pub mod tags {
    pub const ALL: &str = "/user/tags";

    pub fn by_id(id: &str) -> String {
        format!("{ALL}/{}", urlencoding::encode(id))
    }

    pub fn contacts(tag_id: &str) -> String {
        format!("{}/contacts", by_id(tag_id))
    }

    pub fn contacts_bulk(tag_id: &str) -> String {
        format!("{}/contacts/bulk", by_id(tag_id))
    }

    pub fn contact(tag_id: &str, contact_id: &str) -> String {
        format!("{}/contacts/{}", by_id(tag_id), urlencoding::encode(contact_id))
    }

    pub fn available_contacts(tag_id: &str) -> String {
        format!("{}/available-contacts", by_id(tag_id))
    }
}
