//! Repository pattern implementation for data access layer
//!
//! Every query is parameterized and runs through [`DatabaseManager::execute`].
//! Constraint violations that callers can act on are turned into
//! `AlreadyExists` / `NotFound` here so handlers never inspect SQLite codes.

use crate::core::error::{CanteenError, Result};
use crate::db::manager::DatabaseManager;
use crate::db::models::{
    Admin, Enlistment, MealDays, Menu, MenuDays, NewStudent, Student, WeekKey, DATE_FORMAT,
};
use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row};
use std::sync::Arc;

/// Lookup of a single record by its natural key
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Key identifying one record
    type Key: Send + 'static;

    /// Find a record by its key
    async fn find_by_key(&self, key: Self::Key) -> Result<Option<T>>;
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Map a constraint failure on insert into the error a client should see
fn classify_insert_error(err: rusqlite::Error, duplicate: &str, missing_parent: &str) -> CanteenError {
    let err = CanteenError::DatabaseError(err);
    if err.is_unique_violation() {
        CanteenError::AlreadyExists(duplicate.to_string())
    } else if err.is_foreign_key_violation() {
        CanteenError::NotFound(missing_parent.to_string())
    } else {
        err
    }
}

/// Repository for Student entities
#[derive(Clone)]
pub struct StudentRepository {
    db: Arc<DatabaseManager>,
}

impl StudentRepository {
    /// Create a new StudentRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
        Ok(Student {
            id: row.get(0)?,
            name: row.get(1)?,
            enrolled_from: row.get(2)?,
            enrolled_to: row.get(3)?,
            created_on: row.get(4)?,
        })
    }

    /// Insert a student and return the stored record with its assigned id
    pub async fn create(&self, student: NewStudent) -> Result<Student> {
        self.db
            .execute(move |conn| {
                let record = Student {
                    id: 0,
                    name: student.name,
                    enrolled_from: student.enrolled_from.format(DATE_FORMAT).to_string(),
                    enrolled_to: student.enrolled_to.format(DATE_FORMAT).to_string(),
                    created_on: now_rfc3339(),
                };

                conn.execute(
                    "INSERT INTO students (name, enrolled_from, enrolled_to, created_on) \
                     VALUES (?, ?, ?, ?)",
                    rusqlite::params![
                        record.name,
                        record.enrolled_from,
                        record.enrolled_to,
                        record.created_on
                    ],
                )
                .map_err(CanteenError::DatabaseError)?;

                Ok(Student {
                    id: conn.last_insert_rowid(),
                    ..record
                })
            })
            .await
    }

    /// Delete a student; their enlistments go with them.
    ///
    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let removed = conn
                    .execute("DELETE FROM students WHERE id = ?", [id])
                    .map_err(CanteenError::DatabaseError)?;
                Ok(removed > 0)
            })
            .await
    }

    /// Number of stored students
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
                    .map_err(CanteenError::DatabaseError)
            })
            .await
    }
}

#[async_trait]
impl Repository<Student> for StudentRepository {
    type Key = i64;

    async fn find_by_key(&self, id: i64) -> Result<Option<Student>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT id, name, enrolled_from, enrolled_to, created_on \
                     FROM students WHERE id = ?",
                    [id],
                    Self::from_row,
                )
                .optional()
                .map_err(CanteenError::DatabaseError)
            })
            .await
    }
}

/// Repository for Admin entities
#[derive(Clone)]
pub struct AdminRepository {
    db: Arc<DatabaseManager>,
}

impl AdminRepository {
    /// Create a new AdminRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Insert an admin; a taken username is `AlreadyExists`
    pub async fn create(&self, admin: Admin) -> Result<()> {
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO admins (username, password_hash) VALUES (?, ?)",
                    [&admin.username, &admin.password_hash],
                )
                .map_err(|e| {
                    classify_insert_error(e, "User already exists, please login", "Admin not found")
                })?;
                Ok(())
            })
            .await
    }

    /// Number of stored admins
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))
                    .map_err(CanteenError::DatabaseError)
            })
            .await
    }
}

#[async_trait]
impl Repository<Admin> for AdminRepository {
    type Key = String;

    async fn find_by_key(&self, username: String) -> Result<Option<Admin>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT username, password_hash FROM admins WHERE username = ?",
                    [&username],
                    |row| {
                        Ok(Admin {
                            username: row.get(0)?,
                            password_hash: row.get(1)?,
                        })
                    },
                )
                .optional()
                .map_err(CanteenError::DatabaseError)
            })
            .await
    }
}

/// Repository for Enlistment entities
#[derive(Clone)]
pub struct EnlistmentRepository {
    db: Arc<DatabaseManager>,
}

const ENLISTMENT_COLUMNS: &str =
    "id, student_id, year, week, monday, tuesday, wednesday, thursday, friday, created_on";

impl EnlistmentRepository {
    /// Create a new EnlistmentRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Enlistment> {
        Ok(Enlistment {
            id: row.get(0)?,
            student_id: row.get(1)?,
            key: WeekKey {
                year: row.get(2)?,
                week: row.get(3)?,
            },
            days: MealDays {
                monday: row.get(4)?,
                tuesday: row.get(5)?,
                wednesday: row.get(6)?,
                thursday: row.get(7)?,
                friday: row.get(8)?,
            },
            created_on: row.get(9)?,
        })
    }

    /// Record which days a student eats in a week.
    ///
    /// A second enlistment for the same week is `AlreadyExists`; a student
    /// that no longer exists is `NotFound`.
    pub async fn create(&self, student_id: i64, key: WeekKey, days: MealDays) -> Result<Enlistment> {
        self.db
            .execute(move |conn| {
                let created_on = now_rfc3339();
                conn.execute(
                    "INSERT INTO enlistments \
                     (student_id, year, week, monday, tuesday, wednesday, thursday, friday, created_on) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    rusqlite::params![
                        student_id,
                        key.year,
                        key.week,
                        days.monday,
                        days.tuesday,
                        days.wednesday,
                        days.thursday,
                        days.friday,
                        created_on
                    ],
                )
                .map_err(|e| {
                    classify_insert_error(
                        e,
                        "Enlistment for this week already exists",
                        "Student not found",
                    )
                })?;

                Ok(Enlistment {
                    id: conn.last_insert_rowid(),
                    student_id,
                    key,
                    days,
                    created_on,
                })
            })
            .await
    }

    /// Replace the days of an existing enlistment; false when there is none
    pub async fn update_days(&self, student_id: i64, key: WeekKey, days: MealDays) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let updated = conn
                    .execute(
                        "UPDATE enlistments SET monday = ?, tuesday = ?, wednesday = ?, \
                         thursday = ?, friday = ? \
                         WHERE student_id = ? AND year = ? AND week = ?",
                        rusqlite::params![
                            days.monday,
                            days.tuesday,
                            days.wednesday,
                            days.thursday,
                            days.friday,
                            student_id,
                            key.year,
                            key.week
                        ],
                    )
                    .map_err(CanteenError::DatabaseError)?;
                Ok(updated > 0)
            })
            .await
    }

    /// All enlistments of one student, oldest week first
    pub async fn find_by_student(&self, student_id: i64) -> Result<Vec<Enlistment>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM enlistments WHERE student_id = ? ORDER BY year, week",
                        ENLISTMENT_COLUMNS
                    ))
                    .map_err(CanteenError::DatabaseError)?;

                let enlistments = stmt
                    .query_map([student_id], Self::from_row)
                    .map_err(CanteenError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(CanteenError::DatabaseError)?;

                Ok(enlistments)
            })
            .await
    }
}

#[async_trait]
impl Repository<Enlistment> for EnlistmentRepository {
    type Key = (i64, WeekKey);

    async fn find_by_key(&self, key: (i64, WeekKey)) -> Result<Option<Enlistment>> {
        let (student_id, key) = key;
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!(
                        "SELECT {} FROM enlistments WHERE student_id = ? AND year = ? AND week = ?",
                        ENLISTMENT_COLUMNS
                    ),
                    rusqlite::params![student_id, key.year, key.week],
                    Self::from_row,
                )
                .optional()
                .map_err(CanteenError::DatabaseError)
            })
            .await
    }
}

/// Repository for Menu entities
#[derive(Clone)]
pub struct MenuRepository {
    db: Arc<DatabaseManager>,
}

const MENU_COLUMNS: &str = "id, year, week, monday, tuesday, wednesday, thursday, created_on";

impl MenuRepository {
    /// Create a new MenuRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Menu> {
        Ok(Menu {
            id: row.get(0)?,
            key: WeekKey {
                year: row.get(1)?,
                week: row.get(2)?,
            },
            days: MenuDays {
                monday: row.get(3)?,
                tuesday: row.get(4)?,
                wednesday: row.get(5)?,
                thursday: row.get(6)?,
            },
            created_on: row.get(7)?,
        })
    }

    /// Publish the menu of a week; one menu per week
    pub async fn create(&self, key: WeekKey, days: MenuDays) -> Result<Menu> {
        self.db
            .execute(move |conn| {
                let created_on = now_rfc3339();
                conn.execute(
                    "INSERT INTO menus (year, week, monday, tuesday, wednesday, thursday, created_on) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                    rusqlite::params![
                        key.year,
                        key.week,
                        days.monday,
                        days.tuesday,
                        days.wednesday,
                        days.thursday,
                        created_on
                    ],
                )
                .map_err(|e| {
                    classify_insert_error(e, "Menu for this week already exists", "Menu not found")
                })?;

                Ok(Menu {
                    id: conn.last_insert_rowid(),
                    key,
                    days,
                    created_on,
                })
            })
            .await
    }

    /// Every published menu ordered by year, week
    pub async fn find_all(&self) -> Result<Vec<Menu>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn
                    .prepare(&format!("SELECT {} FROM menus ORDER BY year, week", MENU_COLUMNS))
                    .map_err(CanteenError::DatabaseError)?;

                let menus = stmt
                    .query_map([], Self::from_row)
                    .map_err(CanteenError::DatabaseError)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(CanteenError::DatabaseError)?;

                Ok(menus)
            })
            .await
    }

    /// Number of published menus
    pub async fn count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM menus", [], |row| row.get(0))
                    .map_err(CanteenError::DatabaseError)
            })
            .await
    }
}

#[async_trait]
impl Repository<Menu> for MenuRepository {
    type Key = WeekKey;

    async fn find_by_key(&self, key: WeekKey) -> Result<Option<Menu>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {} FROM menus WHERE year = ? AND week = ?", MENU_COLUMNS),
                    rusqlite::params![key.year, key.week],
                    Self::from_row,
                )
                .optional()
                .map_err(CanteenError::DatabaseError)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Arc<DatabaseManager> {
        Arc::new(DatabaseManager::new_in_memory().unwrap())
    }

    fn student(name: &str) -> NewStudent {
        NewStudent::parse(name, "2024-01-01", "2024-06-30").unwrap()
    }

    fn week(year: i32, week: u32) -> WeekKey {
        WeekKey::new(year, week).unwrap()
    }

    #[tokio::test]
    async fn test_student_create_find_delete() {
        let repo = StudentRepository::new(db());

        let created = repo.create(student("Ada")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.enrolled_from, "2024-01-01");

        let found = repo.find_by_key(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_key(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_duplicate_is_already_exists() {
        let repo = AdminRepository::new(db());
        let admin = Admin {
            username: "chef".to_string(),
            password_hash: "digest".to_string(),
        };

        repo.create(admin.clone()).await.unwrap();
        let err = repo.create(admin).await.unwrap_err();

        assert!(matches!(err, CanteenError::AlreadyExists(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.find_by_key("chef".to_string()).await.unwrap().is_some());
        assert!(repo.find_by_key("cook".to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enlistment_lifecycle() {
        let db = db();
        let students = StudentRepository::new(db.clone());
        let repo = EnlistmentRepository::new(db);
        let ada = students.create(student("Ada")).await.unwrap();

        let days = MealDays {
            monday: true,
            wednesday: true,
            ..MealDays::default()
        };
        repo.create(ada.id, week(2024, 10), days).await.unwrap();

        let duplicate = repo.create(ada.id, week(2024, 10), MealDays::default()).await;
        assert!(matches!(duplicate, Err(CanteenError::AlreadyExists(_))));

        let all_days = MealDays {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
        };
        assert!(repo.update_days(ada.id, week(2024, 10), all_days).await.unwrap());
        assert!(!repo.update_days(ada.id, week(2024, 11), all_days).await.unwrap());

        let found = repo.find_by_key((ada.id, week(2024, 10))).await.unwrap().unwrap();
        assert_eq!(found.days, all_days);
        assert!(repo.find_by_key((ada.id, week(2024, 11))).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enlistments_are_per_student() {
        let db = db();
        let students = StudentRepository::new(db.clone());
        let repo = EnlistmentRepository::new(db);
        let ada = students.create(student("Ada")).await.unwrap();
        let bob = students.create(student("Bob")).await.unwrap();

        repo.create(ada.id, week(2024, 2), MealDays::default()).await.unwrap();
        repo.create(ada.id, week(2024, 1), MealDays::default()).await.unwrap();
        repo.create(bob.id, week(2024, 1), MealDays::default()).await.unwrap();

        let ada_weeks: Vec<u32> = repo
            .find_by_student(ada.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.key.week)
            .collect();
        assert_eq!(ada_weeks, vec![1, 2]);
        assert!(repo.find_by_key((bob.id, week(2024, 2))).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_student_cascades_enlistments() {
        let db = db();
        let students = StudentRepository::new(db.clone());
        let repo = EnlistmentRepository::new(db);
        let ada = students.create(student("Ada")).await.unwrap();

        repo.create(ada.id, week(2024, 1), MealDays::default()).await.unwrap();
        students.delete(ada.id).await.unwrap();

        assert!(repo.find_by_student(ada.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enlistment_for_deleted_student_is_not_found() {
        let db = db();
        let students = StudentRepository::new(db.clone());
        let repo = EnlistmentRepository::new(db);
        let ada = students.create(student("Ada")).await.unwrap();
        students.delete(ada.id).await.unwrap();

        let result = repo.create(ada.id, week(2024, 1), MealDays::default()).await;
        assert!(matches!(result, Err(CanteenError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_menus_unique_and_ordered() {
        let repo = MenuRepository::new(db());
        let days = MenuDays {
            monday: Some("Soup".to_string()),
            ..MenuDays::default()
        };

        repo.create(week(2025, 1), days.clone()).await.unwrap();
        repo.create(week(2024, 52), MenuDays::default()).await.unwrap();
        repo.create(week(2024, 3), MenuDays::default()).await.unwrap();

        let duplicate = repo.create(week(2025, 1), MenuDays::default()).await;
        assert!(matches!(duplicate, Err(CanteenError::AlreadyExists(_))));

        let keys: Vec<(i32, u32)> = repo
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|m| (m.key.year, m.key.week))
            .collect();
        assert_eq!(keys, vec![(2024, 3), (2024, 52), (2025, 1)]);

        let found = repo.find_by_key(week(2025, 1)).await.unwrap().unwrap();
        assert_eq!(found.days, days);
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}
