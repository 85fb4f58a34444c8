//! # Profile
//!
//! Keyed cache of the signed-in user's profile and the editor state around it.
//!
//! The cache is the one piece of state shared across views. It is only ever
//! filled from a backend fetch and only ever emptied by [`ProfileCache::invalidate`];
//! a successful save invalidates and refetches rather than patching the entry.

use std::collections::HashMap;

use crate::api::{Profile, ProfileUpdate};

#[derive(Debug, Default)]
pub struct ProfileCache {
    entries: HashMap<String, Profile>,
}

impl ProfileCache {
    pub fn get(&self, key: &str) -> Option<&Profile> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: &str, profile: Profile) {
        self.entries.insert(key.to_string(), profile);
    }

    /// Drops the entry so the next read has to refetch. Returns whether
    /// anything was cached.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

#[derive(Debug, Default)]
pub struct ProfileState {
    pub cache: ProfileCache,
    /// Profile shown in the editor, as last fetched.
    pub current: Option<Profile>,
    pub is_loading: bool,
    pub is_saving: bool,
    /// Bumped whenever `current` is replaced so the editor form can reload
    /// its fields.
    pub revision: u64,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, profile: Profile) {
        self.current = Some(profile);
        self.revision += 1;
    }

    /// Label for the signed-in user: display name, then full name, then the
    /// given fallback (usually the auth email).
    pub fn user_label<'a>(&'a self, fallback: Option<&'a str>) -> Option<&'a str> {
        let profile = self.current.as_ref();
        profile
            .and_then(|p| non_blank(p.display_name.as_deref()))
            .or_else(|| profile.and_then(|p| non_blank(p.full_name.as_deref())))
            .or_else(|| profile.and_then(|p| non_blank(p.email.as_deref())))
            .or(non_blank(fallback))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds the full-replace body for a save. Email is not part of it.
pub fn profile_update(full_name: &str, display_name: &str) -> ProfileUpdate {
    ProfileUpdate {
        full_name: full_name.trim().to_string(),
        display_name: display_name.trim().to_string(),
    }
}
