/// Database row types — these map directly to SQLite rows.
/// Distinct from the sauti-types API models to keep the DB layer independent.

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

pub struct IncidentRow {
    pub id: i64,
    pub location: String,
    pub description: String,
    pub anonymous: bool,
    pub reporter_email: Option<String>,
    pub attachment: Option<String>,
    pub status: String,
    pub created_at: String,
}

pub struct ChatMessageRow {
    pub id: i64,
    pub user_email: String,
    pub content: String,
    pub created_at: String,
}

pub struct VoiceNoteRow {
    pub id: i64,
    pub file_name: String,
    pub file_url: String,
    pub stress_level: String,
    pub energy: f64,
    pub pitch: f64,
    pub created_at: String,
}
