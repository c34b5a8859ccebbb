pub mod expiry;
pub mod mail;
pub mod reminder;
pub mod template;
pub mod validate;
