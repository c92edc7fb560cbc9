use crate::Database;
use crate::models::{ChatMessageRow, IncidentRow, UserRow, VoiceNoteRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (full_name, email, password, role) VALUES (?1, ?2, ?3, ?4)",
                (full_name, email, password_hash, role),
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("user {} vanished after insert", id))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, full_name, email, password, role, created_at
                 FROM users ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], map_user_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Apply the non-None fields, returning the updated row.
    /// None when the id does not exist.
    pub fn update_user(
        &self,
        id: i64,
        full_name: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let Some(existing) = query_user_by_id(conn, id)? else {
                return Ok(None);
            };

            conn.execute(
                "UPDATE users SET full_name = ?1, email = ?2, role = ?3 WHERE id = ?4",
                (
                    full_name.unwrap_or(&existing.full_name),
                    email.unwrap_or(&existing.email),
                    role.unwrap_or(&existing.role),
                    id,
                ),
            )?;

            query_user_by_id(conn, id)
        })
    }

    /// True when a row was deleted.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Incidents --

    pub fn insert_incident(
        &self,
        location: &str,
        description: &str,
        anonymous: bool,
        reporter_email: Option<&str>,
        attachment: Option<&str>,
    ) -> Result<IncidentRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO incidents (location, description, anonymous, reporter_email, attachment)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![location, description, anonymous, reporter_email, attachment],
            )?;
            let id = conn.last_insert_rowid();
            query_incident_by_id(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("incident {} vanished after insert", id))
        })
    }

    pub fn get_incident(&self, id: i64) -> Result<Option<IncidentRow>> {
        self.with_conn(|conn| query_incident_by_id(conn, id))
    }

    pub fn list_incidents_by_reporter(&self, reporter_email: &str) -> Result<Vec<IncidentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE reporter_email = ?1 ORDER BY created_at DESC, id DESC",
                INCIDENT_SELECT
            ))?;
            let rows = stmt
                .query_map([reporter_email], map_incident_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_all_incidents(&self) -> Result<Vec<IncidentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{} ORDER BY created_at DESC, id DESC",
                INCIDENT_SELECT
            ))?;
            let rows = stmt
                .query_map([], map_incident_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Set the status of an incident. None when the id does not exist;
    /// the value is an open string by design.
    pub fn update_incident_status(&self, id: i64, status: &str) -> Result<Option<IncidentRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE incidents SET status = ?1 WHERE id = ?2",
                rusqlite::params![status, id],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_incident_by_id(conn, id)
        })
    }

    // -- Community chat --

    pub fn insert_chat_message(&self, user_email: &str, content: &str) -> Result<ChatMessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (user_email, content) VALUES (?1, ?2)",
                (user_email, content),
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT id, user_email, content, created_at FROM chat_messages WHERE id = ?1",
                [id],
                map_chat_row,
            )
            .map_err(Into::into)
        })
    }

    /// Full history, oldest first. Ties on created_at keep insertion order.
    pub fn list_chat_messages(&self) -> Result<Vec<ChatMessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_email, content, created_at
                 FROM chat_messages ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map([], map_chat_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Voice notes --

    pub fn insert_voice_note(
        &self,
        file_name: &str,
        file_url: &str,
        stress_level: &str,
        energy: f64,
        pitch: f64,
    ) -> Result<VoiceNoteRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO voice_notes (file_name, file_url, stress_level, energy, pitch)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![file_name, file_url, stress_level, energy, pitch],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT id, file_name, file_url, stress_level, energy, pitch, created_at
                 FROM voice_notes WHERE id = ?1",
                [id],
                |row| {
                    Ok(VoiceNoteRow {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                        file_url: row.get(2)?,
                        stress_level: row.get(3)?,
                        energy: row.get(4)?,
                        pitch: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                },
            )
            .map_err(Into::into)
        })
    }
}

const INCIDENT_SELECT: &str =
    "SELECT id, location, description, anonymous, reporter_email, attachment, status, created_at
     FROM incidents";

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_incident_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IncidentRow> {
    Ok(IncidentRow {
        id: row.get(0)?,
        location: row.get(1)?,
        description: row.get(2)?,
        anonymous: row.get(3)?,
        reporter_email: row.get(4)?,
        attachment: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_chat_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessageRow> {
    Ok(ChatMessageRow {
        id: row.get(0)?,
        user_email: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, email, password, role, created_at FROM users WHERE email = ?1",
    )?;

    let row = stmt.query_row([email], map_user_row).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, email, password, role, created_at FROM users WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_user_row).optional()?;
    Ok(row)
}

fn query_incident_by_id(conn: &Connection, id: i64) -> Result<Option<IncidentRow>> {
    let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", INCIDENT_SELECT))?;

    let row = stmt.query_row([id], map_incident_row).optional()?;
    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = db();
        db.create_user("Amina N.", "amina@example.com", "hash-1", "user")
            .unwrap();
        let err = db
            .create_user("Impostor", "amina@example.com", "hash-2", "user")
            .unwrap_err();
        // Callers distinguish this from other failures to answer 409.
        assert!(crate::is_constraint_violation(&err));
        assert!(!crate::is_constraint_violation(&anyhow::anyhow!("disk full")));
    }

    #[test]
    fn update_user_applies_only_given_fields() {
        let db = db();
        let u = db
            .create_user("Thandi M.", "thandi@example.com", "hash", "user")
            .unwrap();

        let updated = db
            .update_user(u.id, None, None, Some("admin"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, "Thandi M.");
        assert_eq!(updated.email, "thandi@example.com");
        assert_eq!(updated.role, "admin");

        assert!(db.update_user(9999, Some("Nobody"), None, None).unwrap().is_none());
    }

    #[test]
    fn delete_user_reports_missing_rows() {
        let db = db();
        let u = db
            .create_user("Lerato K.", "lerato@example.com", "hash", "user")
            .unwrap();
        assert!(db.delete_user(u.id).unwrap());
        assert!(!db.delete_user(u.id).unwrap());
    }

    #[test]
    fn incident_status_update_changes_only_status() {
        let db = db();
        let inc = db
            .insert_incident("Braamfontein", "Followed home from the taxi rank", false,
                Some("amina@example.com"), None)
            .unwrap();
        assert_eq!(inc.status, "pending");

        let updated = db
            .update_incident_status(inc.id, "in_progress")
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "in_progress");
        assert_eq!(updated.location, inc.location);
        assert_eq!(updated.description, inc.description);
        assert_eq!(updated.reporter_email, inc.reporter_email);
        assert_eq!(updated.created_at, inc.created_at);
    }

    #[test]
    fn incident_status_update_on_missing_id_is_none() {
        let db = db();
        assert!(db.update_incident_status(42, "resolved").unwrap().is_none());
    }

    #[test]
    fn reporter_filter_is_exact_match() {
        let db = db();
        db.insert_incident("Soweto", "a", false, Some("one@example.com"), None)
            .unwrap();
        db.insert_incident("Durban", "b", false, Some("two@example.com"), None)
            .unwrap();
        db.insert_incident("Pretoria", "c", true, None, None).unwrap();

        let mine = db.list_incidents_by_reporter("one@example.com").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].location, "Soweto");

        assert_eq!(db.list_all_incidents().unwrap().len(), 3);
    }

    #[test]
    fn chat_history_keeps_insertion_order() {
        let db = db();
        // Same second for all three: ordering must fall back to insertion order.
        for content in ["first", "second", "third"] {
            db.insert_chat_message("amina@example.com", content).unwrap();
        }

        let history = db.list_chat_messages().unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn on_disk_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sauti.db");

        {
            let db = Database::open(&path).unwrap();
            db.create_user("Amina N.", "amina@example.com", "hash", "user")
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let user = db.get_user_by_email("amina@example.com").unwrap().unwrap();
        assert_eq!(user.full_name, "Amina N.");
    }

    #[test]
    fn voice_note_round_trips_derived_fields() {
        let db = db();
        let note = db
            .insert_voice_note("abc123_sos.wav", "/uploads/abc123_sos.wav", "High Stress", 0.05, 250.0)
            .unwrap();
        assert_eq!(note.stress_level, "High Stress");
        assert!((note.energy - 0.05).abs() < f64::EPSILON);
        assert!((note.pitch - 250.0).abs() < f64::EPSILON);
    }
}
