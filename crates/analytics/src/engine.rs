use crate::error::AnalyticsError;
use crate::report::{EntityKind, GeneralStatistics, Ranked, SkippedEntity, TOP_N, rank_top};
use core_types::Student;
use database::{DbError, DbRepository};

/// Computes enrollment counts and rankings straight from the record store.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    repo: DbRepository,
}

impl AnalyticsEngine {
    pub fn new(repo: DbRepository) -> Self {
        Self { repo }
    }

    /// How many courses the student is enrolled in. Unknown ids count 0.
    pub async fn count_enrollments_for(&self, student_id: &str) -> Result<u64, AnalyticsError> {
        Ok(self.repo.enrollments.count_for_student(student_id).await?)
    }

    /// Students enrolled in the course, in storage order.
    pub async fn students_enrolled_in(
        &self,
        course_code: &str,
    ) -> Result<Vec<Student>, AnalyticsError> {
        Ok(self.repo.enrollments.students_for_course(course_code).await?)
    }

    /// Totals plus the top-5 students and courses by enrollment count.
    ///
    /// Listing students or courses must succeed. A failed per-entity count
    /// only drops that entity, which is recorded in `skipped`.
    pub async fn general_statistics(&self) -> Result<GeneralStatistics, AnalyticsError> {
        let students = self.repo.students.get_all().await?;
        let courses = self.repo.courses.get_all().await?;
        let total_students = students.len();
        let total_courses = courses.len();

        let mut student_tally = Tally::new(EntityKind::Student);
        for student in students {
            let count = self.repo.enrollments.count_for_student(&student.id).await;
            let key = student.id.clone();
            student_tally.record(key, student, count);
        }

        let mut course_tally = Tally::new(EntityKind::Course);
        for course in courses {
            let count = self.repo.enrollments.count_for_course(&course.code).await;
            let key = course.code.clone();
            course_tally.record(key, course, count);
        }

        let total_enrollments = student_tally.total;
        let mut skipped = student_tally.skipped;
        skipped.extend(course_tally.skipped);

        Ok(GeneralStatistics {
            total_students,
            total_courses,
            total_enrollments,
            top_students: rank_top(student_tally.candidates, TOP_N),
            top_courses: rank_top(course_tally.candidates, TOP_N),
            skipped,
        })
    }
}

/// Continue-on-error accumulator for per-entity counts.
struct Tally<T> {
    kind: EntityKind,
    candidates: Vec<Ranked<T>>,
    skipped: Vec<SkippedEntity>,
    total: u64,
}

impl<T> Tally<T> {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            candidates: Vec::new(),
            skipped: Vec::new(),
            total: 0,
        }
    }

    fn record(&mut self, key: String, entity: T, count: Result<u64, DbError>) {
        match count {
            Ok(count) => {
                self.total += count;
                self.candidates.push(Ranked::new(entity, count));
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind, key = %key, error = %e, "Skipping entity in statistics.");
                self.skipped.push(SkippedEntity {
                    kind: self.kind,
                    key,
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::{Course, Enrollment};
    use database::repository::SqliteEnrollmentRepository;
    use database::{EnrollmentStore, SqlitePool, connect_in_memory};
    use std::sync::Arc;

    /// Enrolls `100001`.. with the given number of courses each, over courses `C1`..`C6`.
    async fn seed(repo: &DbRepository, counts: &[usize]) {
        for n in 1..=6 {
            let course = Course::new(format!("C{n}"), format!("Course {n}"));
            repo.courses.create(&course).await.unwrap();
        }
        for (i, &count) in counts.iter().enumerate() {
            let id = format!("{}", 100_001 + i);
            repo.students
                .create(&Student::new(&id, format!("Student {i}")))
                .await
                .unwrap();
            for n in 1..=count {
                repo.enrollments.create(&id, &format!("C{n}")).await.unwrap();
            }
        }
    }

    async fn pool() -> SqlitePool {
        connect_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn rankings_are_stable_and_capped() {
        let repo = DbRepository::new(pool().await);
        seed(&repo, &[3, 1, 5, 5, 2, 4, 0]).await;
        let engine = AnalyticsEngine::new(repo);

        let stats = engine.general_statistics().await.unwrap();

        assert_eq!(stats.total_students, 7);
        assert_eq!(stats.total_courses, 6);
        assert_eq!(stats.total_enrollments, 20);
        assert!(stats.skipped.is_empty());

        let students: Vec<(&str, u64)> = stats
            .top_students
            .iter()
            .map(|r| (r.entity.id.as_str(), r.count))
            .collect();
        assert_eq!(
            students,
            vec![
                ("100003", 5),
                ("100004", 5),
                ("100006", 4),
                ("100001", 3),
                ("100005", 2)
            ]
        );

        let courses: Vec<(&str, u64)> = stats
            .top_courses
            .iter()
            .map(|r| (r.entity.code.as_str(), r.count))
            .collect();
        assert_eq!(
            courses,
            vec![("C1", 6), ("C2", 5), ("C3", 4), ("C4", 3), ("C5", 2)]
        );
    }

    #[tokio::test]
    async fn unenrolled_students_count_zero() {
        let repo = DbRepository::new(pool().await);
        seed(&repo, &[0, 2]).await;
        let engine = AnalyticsEngine::new(repo);

        assert_eq!(engine.count_enrollments_for("100001").await.unwrap(), 0);
        assert_eq!(engine.count_enrollments_for("100002").await.unwrap(), 2);
        assert_eq!(engine.count_enrollments_for("999999").await.unwrap(), 0);

        let stats = engine.general_statistics().await.unwrap();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.top_students.len(), 1);
        assert_eq!(stats.top_students[0].entity.id, "100002");
    }

    #[tokio::test]
    async fn students_enrolled_in_lists_the_course() {
        let repo = DbRepository::new(pool().await);
        seed(&repo, &[1, 2, 0]).await;
        let engine = AnalyticsEngine::new(repo);

        let ids: Vec<String> = engine
            .students_enrolled_in("C1")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["100001", "100002"]);
        assert!(engine.students_enrolled_in("C6").await.unwrap().is_empty());
    }

    /// Delegates to SQLite but fails the per-student count for one id.
    struct FlakyEnrollments {
        inner: SqliteEnrollmentRepository,
        failing_student: &'static str,
    }

    #[async_trait]
    impl EnrollmentStore for FlakyEnrollments {
        async fn create(&self, student_id: &str, course_code: &str) -> Result<(), DbError> {
            self.inner.create(student_id, course_code).await
        }

        async fn exists(&self, student_id: &str, course_code: &str) -> Result<bool, DbError> {
            self.inner.exists(student_id, course_code).await
        }

        async fn get_all(&self) -> Result<Vec<Enrollment>, DbError> {
            self.inner.get_all().await
        }

        async fn courses_for_student(&self, student_id: &str) -> Result<Vec<Course>, DbError> {
            self.inner.courses_for_student(student_id).await
        }

        async fn students_for_course(&self, course_code: &str) -> Result<Vec<Student>, DbError> {
            self.inner.students_for_course(course_code).await
        }

        async fn count_for_student(&self, student_id: &str) -> Result<u64, DbError> {
            if student_id == self.failing_student {
                return Err(DbError::QueryError(sqlx::Error::PoolTimedOut));
            }
            self.inner.count_for_student(student_id).await
        }

        async fn count_for_course(&self, course_code: &str) -> Result<u64, DbError> {
            self.inner.count_for_course(course_code).await
        }
    }

    #[tokio::test]
    async fn failed_counts_are_skipped_not_fatal() {
        let pool = pool().await;
        let sqlite = DbRepository::new(pool.clone());
        seed(&sqlite, &[3, 1, 5]).await;

        let flaky = DbRepository::from_parts(
            sqlite.students.clone(),
            sqlite.courses.clone(),
            Arc::new(FlakyEnrollments {
                inner: SqliteEnrollmentRepository::new(pool),
                failing_student: "100003",
            }),
        );
        let stats = AnalyticsEngine::new(flaky).general_statistics().await.unwrap();

        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.total_enrollments, 4);
        let ids: Vec<&str> = stats.top_students.iter().map(|r| r.entity.id.as_str()).collect();
        assert_eq!(ids, ["100001", "100002"]);
        assert_eq!(stats.skipped.len(), 1);
        assert_eq!(stats.skipped[0].kind, EntityKind::Student);
        assert_eq!(stats.skipped[0].key, "100003");
        // Course counts are unaffected.
        assert_eq!(stats.top_courses[0].count, 3);
    }
}
