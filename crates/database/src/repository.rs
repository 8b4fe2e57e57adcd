use crate::DbError;
use async_trait::async_trait;
use core_types::{Course, Enrollment, Student};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;

/// Storage capabilities for one entity kind, addressed by its natural key.
#[async_trait]
pub trait Repository<T: Send + Sync>: Send + Sync {
    /// Inserts a new row. Fails with `DbError::Duplicate` if the key is taken.
    async fn create(&self, entity: &T) -> Result<(), DbError>;

    /// `Ok(None)` when no row has this key.
    async fn get_by_key(&self, key: &str) -> Result<Option<T>, DbError>;

    /// Every row, in insertion order.
    async fn get_all(&self) -> Result<Vec<T>, DbError>;

    async fn exists(&self, key: &str) -> Result<bool, DbError>;
}

/// Storage capabilities for the `(student, course)` relation.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Both ends must already exist. Fails with `DbError::Duplicate` if the pair is taken.
    async fn create(&self, student_id: &str, course_code: &str) -> Result<(), DbError>;

    async fn exists(&self, student_id: &str, course_code: &str) -> Result<bool, DbError>;

    /// Every pair, in insertion order.
    async fn get_all(&self) -> Result<Vec<Enrollment>, DbError>;

    async fn courses_for_student(&self, student_id: &str) -> Result<Vec<Course>, DbError>;

    async fn students_for_course(&self, course_code: &str) -> Result<Vec<Student>, DbError>;

    async fn count_for_student(&self, student_id: &str) -> Result<u64, DbError>;

    async fn count_for_course(&self, course_code: &str) -> Result<u64, DbError>;
}

/// The `DbRepository` bundles one store per entity kind behind its capability
/// trait. Services depend on this bundle, never on SQL.
#[derive(Clone)]
pub struct DbRepository {
    pub students: Arc<dyn Repository<Student>>,
    pub courses: Arc<dyn Repository<Course>>,
    pub enrollments: Arc<dyn EnrollmentStore>,
}

impl DbRepository {
    /// Creates a new `DbRepository` with every store sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            students: Arc::new(SqliteStudentRepository::new(pool.clone())),
            courses: Arc::new(SqliteCourseRepository::new(pool.clone())),
            enrollments: Arc::new(SqliteEnrollmentRepository::new(pool)),
        }
    }

    /// Assembles a repository from arbitrary stores (used to inject failures in tests).
    pub fn from_parts(
        students: Arc<dyn Repository<Student>>,
        courses: Arc<dyn Repository<Course>>,
        enrollments: Arc<dyn EnrollmentStore>,
    ) -> Self {
        Self {
            students,
            courses,
            enrollments,
        }
    }
}

impl std::fmt::Debug for DbRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbRepository").finish_non_exhaustive()
    }
}

/// Maps a unique/primary-key violation to `DbError::Duplicate`.
fn map_insert_error(error: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return DbError::Duplicate(db_error.message().to_string());
        }
    }
    error.into()
}

#[derive(Debug, Clone)]
pub struct SqliteStudentRepository {
    pool: SqlitePool,
}

impl SqliteStudentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Student> for SqliteStudentRepository {
    async fn create(&self, student: &Student) -> Result<(), DbError> {
        sqlx::query("INSERT INTO students (id, name) VALUES (?, ?)")
            .bind(&student.id)
            .bind(&student.name)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;
        tracing::debug!(student_id = %student.id, "Created student.");
        Ok(())
    }

    async fn get_by_key(&self, id: &str) -> Result<Option<Student>, DbError> {
        let student = sqlx::query_as::<_, Student>("SELECT id, name FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    async fn get_all(&self) -> Result<Vec<Student>, DbError> {
        let students = sqlx::query_as::<_, Student>("SELECT id, name FROM students ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    async fn exists(&self, id: &str) -> Result<bool, DbError> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(found != 0)
    }
}

#[derive(Debug, Clone)]
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Course> for SqliteCourseRepository {
    async fn create(&self, course: &Course) -> Result<(), DbError> {
        sqlx::query("INSERT INTO courses (code, name) VALUES (?, ?)")
            .bind(&course.code)
            .bind(&course.name)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;
        tracing::debug!(course_code = %course.code, "Created course.");
        Ok(())
    }

    async fn get_by_key(&self, code: &str) -> Result<Option<Course>, DbError> {
        let course = sqlx::query_as::<_, Course>("SELECT code, name FROM courses WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(course)
    }

    async fn get_all(&self) -> Result<Vec<Course>, DbError> {
        let courses = sqlx::query_as::<_, Course>("SELECT code, name FROM courses ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    async fn exists(&self, code: &str) -> Result<bool, DbError> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE code = ?)")
            .bind(code)
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }
}

#[derive(Debug, Clone)]
pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for SqliteEnrollmentRepository {
    async fn create(&self, student_id: &str, course_code: &str) -> Result<(), DbError> {
        sqlx::query("INSERT INTO enrollments (student_id, course_code) VALUES (?, ?)")
            .bind(student_id)
            .bind(course_code)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;
        tracing::debug!(student_id, course_code, "Created enrollment.");
        Ok(())
    }

    async fn exists(&self, student_id: &str, course_code: &str) -> Result<bool, DbError> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = ? AND course_code = ?)",
        )
        .bind(student_id)
        .bind(course_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(found != 0)
    }

    async fn get_all(&self) -> Result<Vec<Enrollment>, DbError> {
        let enrollments = sqlx::query_as::<_, Enrollment>(
            "SELECT student_id, course_code FROM enrollments ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(enrollments)
    }

    async fn courses_for_student(&self, student_id: &str) -> Result<Vec<Course>, DbError> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT c.code, c.name
            FROM courses AS c
            JOIN enrollments AS e ON c.code = e.course_code
            WHERE e.student_id = ?
            ORDER BY e.rowid
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn students_for_course(&self, course_code: &str) -> Result<Vec<Student>, DbError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT s.id, s.name
            FROM students AS s
            JOIN enrollments AS e ON s.id = e.student_id
            WHERE e.course_code = ?
            ORDER BY e.rowid
            "#,
        )
        .bind(course_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    async fn count_for_student(&self, student_id: &str) -> Result<u64, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE student_id = ?")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn count_for_course(&self, course_code: &str) -> Result<u64, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_code = ?")
                .bind(course_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}
