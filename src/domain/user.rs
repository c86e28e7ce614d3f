/// The single customer profile of this storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub phone_number: Option<String>,
    pub delivery_address: String,
    /// Name of the avatar asset; rendering is up to the UI.
    pub avatar: String,
}

/// Payload for editing the profile.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
}

impl User {
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = Some(phone_number);
        }
        if let Some(delivery_address) = patch.delivery_address {
            self.delivery_address = delivery_address;
        }
    }
}
