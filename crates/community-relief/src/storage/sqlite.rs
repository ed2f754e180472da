use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::schema::SCHEMA;
use crate::auth::{User, UserId, UserStore};
use crate::coordination::domain::{
    Category, CategoryBadge, CategoryId, DirectoryStats, EmergencyRequest, RequestId,
    RequestListing, Resource, ResourceId, ResourceListing, Volunteer, VolunteerId,
};
use crate::coordination::repository::{
    DirectoryStore, RequestScope, ResourceFilter, StoreError, VolunteerFilter,
};

const CATEGORY_COLUMNS: &str = "id, name, description, icon, color, created_at, updated_at";

const RESOURCE_COLUMNS: &str = "r.id, r.name, r.description, r.category_id, r.address, \
     r.latitude, r.longitude, r.phone, r.email, r.website, r.operating_hours, r.capacity, \
     r.current_availability, r.status, r.created_at, r.updated_at";

const REQUEST_COLUMNS: &str = "er.id, er.requester_name, er.requester_phone, \
     er.requester_email, er.description, er.category_id, er.location, er.latitude, \
     er.longitude, er.priority, er.status, er.assigned_volunteer_id, er.notes, er.created_at, \
     er.updated_at";

const VOLUNTEER_COLUMNS: &str = "id, name, email, phone, skills, availability, location, \
     latitude, longitude, status, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, email, password, name, role, status, last_login, created_at, updated_at";

/// SQLite-backed store for the directory and operator accounts.
///
/// A single connection is shared behind a mutex; every call holds it for one statement
/// or one short read sequence.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }

    pub fn category_count(&self) -> Result<u64, StoreError> {
        let conn = self.connection()?;
        count(&conn, "SELECT COUNT(*) FROM categories")
    }

    pub fn category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?1");
        Ok(conn.query_row(&sql, [name], category_from_row).optional()?)
    }

    /// Cheap liveness probe used by readiness checks.
    pub fn ping(&self) -> Result<(), StoreError> {
        let conn = self.connection()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict
            }
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => StoreError::Corrupt(error.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

fn count(conn: &Connection, sql: &str) -> Result<u64, StoreError> {
    let value: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(u64::try_from(value).unwrap_or_default())
}

fn ensure_changed(changed: usize) -> Result<(), StoreError> {
    if changed == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

fn like_pattern(text: &str) -> Value {
    Value::Text(format!("%{}%", text.trim()))
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        category_id: row.get("category_id")?,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        website: row.get("website")?,
        operating_hours: row.get("operating_hours")?,
        capacity: row.get("capacity")?,
        current_availability: row.get("current_availability")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<EmergencyRequest> {
    Ok(EmergencyRequest {
        id: row.get("id")?,
        requester_name: row.get("requester_name")?,
        requester_phone: row.get("requester_phone")?,
        requester_email: row.get("requester_email")?,
        description: row.get("description")?,
        category_id: row.get("category_id")?,
        location: row.get("location")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        priority: row.get("priority")?,
        status: row.get("status")?,
        assigned_volunteer_id: row.get("assigned_volunteer_id")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn volunteer_from_row(row: &Row<'_>) -> rusqlite::Result<Volunteer> {
    Ok(Volunteer {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        skills: row.get::<_, Option<String>>("skills")?.unwrap_or_default(),
        availability: row
            .get::<_, Option<String>>("availability")?
            .unwrap_or_default(),
        location: row.get("location")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password")?,
        name: row.get("name")?,
        role: row.get("role")?,
        status: row.get("status")?,
        last_login: row.get("last_login")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn badge_from_row(row: &Row<'_>) -> rusqlite::Result<CategoryBadge> {
    Ok(CategoryBadge {
        category_name: row.get("category_name")?,
        category_icon: row.get("category_icon")?,
        category_color: row.get("category_color")?,
    })
}

impl DirectoryStore for SqliteStore {
    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn category(&self, id: &CategoryId) -> Result<Option<Category>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");
        Ok(conn.query_row(&sql, [id], category_from_row).optional()?)
    }

    fn insert_category(&self, category: Category) -> Result<Category, StoreError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO categories (id, name, description, icon, color, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                category.id,
                category.name,
                category.description,
                category.icon,
                category.color,
                category.created_at,
                category.updated_at,
            ],
        )?;
        Ok(category)
    }

    fn resources(&self, filter: &ResourceFilter) -> Result<Vec<ResourceListing>, StoreError> {
        let mut sql = format!(
            "SELECT {RESOURCE_COLUMNS}, c.name AS category_name, c.icon AS category_icon, \
             c.color AS category_color \
             FROM resources r LEFT JOIN categories c ON r.category_id = c.id \
             WHERE r.status = 'active'"
        );
        let mut values: Vec<Value> = Vec::new();

        if let Some(category_id) = &filter.category_id {
            sql.push_str(" AND r.category_id = ?");
            values.push(Value::Text(category_id.0.clone()));
        }
        if let Some(search) = &filter.search {
            sql.push_str(" AND (r.name LIKE ? OR r.description LIKE ?)");
            values.push(like_pattern(search));
            values.push(like_pattern(search));
        }
        if let Some((latitude, longitude, degrees_squared)) = filter.proximity_bounds() {
            sql.push_str(
                " AND ((r.latitude - ?) * (r.latitude - ?) \
                 + (r.longitude - ?) * (r.longitude - ?)) <= ?",
            );
            values.extend([
                Value::Real(latitude),
                Value::Real(latitude),
                Value::Real(longitude),
                Value::Real(longitude),
                Value::Real(degrees_squared),
            ]);
        }
        sql.push_str(" ORDER BY r.created_at DESC, r.rowid DESC");

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(ResourceListing {
                resource: resource_from_row(row)?,
                category: badge_from_row(row)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn resource(&self, id: &ResourceId) -> Result<Option<Resource>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources r WHERE r.id = ?1");
        Ok(conn.query_row(&sql, [id], resource_from_row).optional()?)
    }

    fn insert_resource(&self, resource: Resource) -> Result<Resource, StoreError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO resources (id, name, description, category_id, address, latitude,
                 longitude, phone, email, website, operating_hours, capacity,
                 current_availability, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                resource.id,
                resource.name,
                resource.description,
                resource.category_id,
                resource.address,
                resource.latitude,
                resource.longitude,
                resource.phone,
                resource.email,
                resource.website,
                resource.operating_hours,
                resource.capacity,
                resource.current_availability,
                resource.status,
                resource.created_at,
                resource.updated_at,
            ],
        )?;
        Ok(resource)
    }

    fn update_resource(&self, resource: &Resource) -> Result<(), StoreError> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE resources SET name = ?2, description = ?3, category_id = ?4, address = ?5,
                 latitude = ?6, longitude = ?7, phone = ?8, email = ?9, website = ?10,
                 operating_hours = ?11, capacity = ?12, current_availability = ?13,
                 status = ?14, updated_at = ?15
             WHERE id = ?1",
            params![
                resource.id,
                resource.name,
                resource.description,
                resource.category_id,
                resource.address,
                resource.latitude,
                resource.longitude,
                resource.phone,
                resource.email,
                resource.website,
                resource.operating_hours,
                resource.capacity,
                resource.current_availability,
                resource.status,
                resource.updated_at,
            ],
        )?;
        ensure_changed(changed)
    }

    fn request_queue(&self) -> Result<Vec<RequestListing>, StoreError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS}, c.name AS category_name, c.icon AS category_icon, \
             c.color AS category_color, v.name AS volunteer_name, v.phone AS volunteer_phone \
             FROM emergency_requests er \
             LEFT JOIN categories c ON er.category_id = c.id \
             LEFT JOIN volunteers v ON er.assigned_volunteer_id = v.id \
             ORDER BY CASE er.priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END, \
             er.created_at DESC, er.rowid DESC"
        );

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(RequestListing {
                request: request_from_row(row)?,
                category: badge_from_row(row)?,
                volunteer_name: row.get("volunteer_name")?,
                volunteer_phone: row.get("volunteer_phone")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn requests(&self, scope: &RequestScope) -> Result<Vec<EmergencyRequest>, StoreError> {
        let (column, value) = match scope {
            RequestScope::Category(id) => ("category_id", id.0.as_str()),
            RequestScope::AssignedTo(id) => ("assigned_volunteer_id", id.0.as_str()),
        };
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM emergency_requests er \
             WHERE er.{column} = ?1 ORDER BY er.created_at DESC, er.rowid DESC"
        );

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([value], request_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn request(&self, id: &RequestId) -> Result<Option<EmergencyRequest>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM emergency_requests er WHERE er.id = ?1");
        Ok(conn.query_row(&sql, [id], request_from_row).optional()?)
    }

    fn insert_request(&self, request: EmergencyRequest) -> Result<EmergencyRequest, StoreError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO emergency_requests (id, requester_name, requester_phone,
                 requester_email, description, category_id, location, latitude, longitude,
                 priority, status, assigned_volunteer_id, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                request.id,
                request.requester_name,
                request.requester_phone,
                request.requester_email,
                request.description,
                request.category_id,
                request.location,
                request.latitude,
                request.longitude,
                request.priority,
                request.status,
                request.assigned_volunteer_id,
                request.notes,
                request.created_at,
                request.updated_at,
            ],
        )?;
        Ok(request)
    }

    fn update_request(&self, request: &EmergencyRequest) -> Result<(), StoreError> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE emergency_requests SET requester_name = ?2, requester_phone = ?3,
                 requester_email = ?4, description = ?5, category_id = ?6, location = ?7,
                 latitude = ?8, longitude = ?9, priority = ?10, status = ?11,
                 assigned_volunteer_id = ?12, notes = ?13, updated_at = ?14
             WHERE id = ?1",
            params![
                request.id,
                request.requester_name,
                request.requester_phone,
                request.requester_email,
                request.description,
                request.category_id,
                request.location,
                request.latitude,
                request.longitude,
                request.priority,
                request.status,
                request.assigned_volunteer_id,
                request.notes,
                request.updated_at,
            ],
        )?;
        ensure_changed(changed)
    }

    fn delete_request(&self, id: &RequestId) -> Result<(), StoreError> {
        let conn = self.connection()?;
        let changed = conn.execute("DELETE FROM emergency_requests WHERE id = ?1", [id])?;
        ensure_changed(changed)
    }

    fn volunteers(&self, filter: &VolunteerFilter) -> Result<Vec<Volunteer>, StoreError> {
        let mut sql = format!("SELECT {VOLUNTEER_COLUMNS} FROM volunteers WHERE 1 = 1");
        let mut values: Vec<Value> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            values.push(Value::Text(status.label().to_string()));
        }
        if let Some(skills) = &filter.skills {
            sql.push_str(" AND skills LIKE ?");
            values.push(like_pattern(skills));
        }
        if let Some(location) = &filter.location {
            sql.push_str(" AND location LIKE ?");
            values.push(like_pattern(location));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), volunteer_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn volunteer(&self, id: &VolunteerId) -> Result<Option<Volunteer>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {VOLUNTEER_COLUMNS} FROM volunteers WHERE id = ?1");
        Ok(conn.query_row(&sql, [id], volunteer_from_row).optional()?)
    }

    fn volunteer_by_email(&self, email: &str) -> Result<Option<Volunteer>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {VOLUNTEER_COLUMNS} FROM volunteers WHERE email = ?1");
        Ok(conn.query_row(&sql, [email], volunteer_from_row).optional()?)
    }

    fn insert_volunteer(&self, volunteer: Volunteer) -> Result<Volunteer, StoreError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO volunteers (id, name, email, phone, skills, availability, location,
                 latitude, longitude, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                volunteer.id,
                volunteer.name,
                volunteer.email,
                volunteer.phone,
                volunteer.skills,
                volunteer.availability,
                volunteer.location,
                volunteer.latitude,
                volunteer.longitude,
                volunteer.status,
                volunteer.created_at,
                volunteer.updated_at,
            ],
        )?;
        Ok(volunteer)
    }

    fn update_volunteer(&self, volunteer: &Volunteer) -> Result<(), StoreError> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE volunteers SET name = ?2, email = ?3, phone = ?4, skills = ?5,
                 availability = ?6, location = ?7, latitude = ?8, longitude = ?9,
                 status = ?10, updated_at = ?11
             WHERE id = ?1",
            params![
                volunteer.id,
                volunteer.name,
                volunteer.email,
                volunteer.phone,
                volunteer.skills,
                volunteer.availability,
                volunteer.location,
                volunteer.latitude,
                volunteer.longitude,
                volunteer.status,
                volunteer.updated_at,
            ],
        )?;
        ensure_changed(changed)
    }

    fn statistics(&self) -> Result<DirectoryStats, StoreError> {
        let conn = self.connection()?;
        Ok(DirectoryStats {
            total_resources: count(&conn, "SELECT COUNT(*) FROM resources WHERE status = 'active'")?,
            total_requests: count(
                &conn,
                "SELECT COUNT(*) FROM emergency_requests WHERE status != 'closed'",
            )?,
            total_volunteers: count(
                &conn,
                "SELECT COUNT(*) FROM volunteers WHERE status = 'active'",
            )?,
            high_priority_requests: count(
                &conn,
                "SELECT COUNT(*) FROM emergency_requests WHERE priority = 'high' AND status = 'open'",
            )?,
        })
    }
}

impl UserStore for SqliteStore {
    fn user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(conn.query_row(&sql, [id], user_from_row).optional()?)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.connection()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        Ok(conn.query_row(&sql, [email], user_from_row).optional()?)
    }

    fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO users (id, email, password, name, role, status, last_login,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id,
                user.email,
                user.password_hash,
                user.name,
                user.role,
                user.status,
                user.last_login,
                user.created_at,
                user.updated_at,
            ],
        )?;
        Ok(user)
    }

    fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE users SET email = ?2, password = ?3, name = ?4, role = ?5, status = ?6,
                 last_login = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                user.id,
                user.email,
                user.password_hash,
                user.name,
                user.role,
                user.status,
                user.last_login,
                user.updated_at,
            ],
        )?;
        ensure_changed(changed)
    }
}
