use crate::manifest::Manifest;
use uuid::Uuid;

/// Fresh random GUID in the uppercase hyphenated form the installer expects.
pub fn make_guid() -> String {
    Uuid::new_v4().hyphenated().to_string().to_uppercase()
}

impl Manifest {
    pub fn needs_guid(&self) -> bool {
        self.upgrade_code.is_empty()
    }

    /// Assign an upgrade code when missing, or unconditionally with `force`.
    /// Returns whether the code changed.
    pub fn set_guids(&mut self, force: bool) -> bool {
        if !force && !self.needs_guid() {
            return false;
        }
        self.upgrade_code = make_guid();
        true
    }
}
