use uuid::Uuid;

/// Summary of a member as shown in chat listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
}
