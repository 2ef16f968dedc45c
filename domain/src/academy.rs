//! Academies, students, attendance and announcements.
//!
//! The [`AcademyRoster`] owns four stores. Students hold their `academy_id`
//! by value; removing an academy never cascades into its students.
//! Attendance is keyed by `(student_id, date)`: marking the same key twice
//! updates the single existing record in place, so the second call wins.
//! Announcements are a feed and prepend, newest first.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use courtside_core::entity::{Entity, EntityId, Stamps};
use courtside_core::environment::StoreEnvironment;
use courtside_core::snapshot::SnapshotStore;
use courtside_runtime::{DomainStore, InsertOrder, Snapshotter, StoreBuilder};

/// A coaching academy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Academy {
    /// Unique identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// City the academy operates in
    pub city: String,
    /// Sports coached
    pub sports: Vec<String>,
    /// Creation and mutation timestamps
    pub stamps: Stamps,
}

impl Entity for Academy {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }
}

/// A student enrolled at an academy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier
    pub id: EntityId,
    /// The academy this student is enrolled at (by id, no live reference)
    pub academy_id: EntityId,
    /// Student name
    pub name: String,
    /// Guardian phone number, if provided
    pub guardian_phone: Option<String>,
    /// Creation and mutation timestamps
    pub stamps: Stamps,
}

impl Entity for Student {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }
}

/// One student's attendance on one date.
///
/// Logically keyed by `(student_id, date)`; the roster enforces at most one
/// record per key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier
    pub id: EntityId,
    /// The student this record belongs to
    pub student_id: EntityId,
    /// Calendar date of the session
    pub date: NaiveDate,
    /// Whether the student was present
    pub present: bool,
    /// Creation and mutation timestamps
    pub stamps: Stamps,
}

impl Entity for AttendanceRecord {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }
}

/// An announcement posted by an academy. Feed-ordered, newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    /// Unique identifier
    pub id: EntityId,
    /// The academy that posted this
    pub academy_id: EntityId,
    /// Headline
    pub title: String,
    /// Announcement text
    pub body: String,
    /// Creation and mutation timestamps
    pub stamps: Stamps,
}

impl Entity for Announcement {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }
}

/// The academy family's stores and operations.
pub struct AcademyRoster {
    academies: DomainStore<Academy>,
    students: DomainStore<Student>,
    attendance: DomainStore<AttendanceRecord>,
    announcements: DomainStore<Announcement>,
}

impl AcademyRoster {
    const ENROLLMENT_KEY: &'static str = "enrollment-storage";
    const ENROLLMENT_FIELD: &'static str = "students";

    /// Creates an empty, non-persistent roster.
    #[must_use]
    pub fn new(env: StoreEnvironment) -> Self {
        Self {
            academies: StoreBuilder::new("academies", env.clone()).build(),
            students: StoreBuilder::new("students", env.clone()).build(),
            attendance: StoreBuilder::new("attendance", env.clone()).build(),
            announcements: StoreBuilder::new("announcements", env)
                .with_order(InsertOrder::Prepend)
                .build(),
        }
    }

    /// Creates a roster whose student enrollment survives restarts.
    ///
    /// Only the student collection is persisted; academies, attendance and
    /// announcements are session-local.
    pub async fn hydrated(env: StoreEnvironment, backend: Arc<dyn SnapshotStore>) -> Self {
        let snapshotter = Snapshotter::new(backend, Self::ENROLLMENT_KEY, Self::ENROLLMENT_FIELD);
        let students = StoreBuilder::new("students", env.clone())
            .with_snapshotter(snapshotter)
            .hydrate()
            .await;
        Self {
            academies: StoreBuilder::new("academies", env.clone()).build(),
            students,
            attendance: StoreBuilder::new("attendance", env.clone()).build(),
            announcements: StoreBuilder::new("announcements", env)
                .with_order(InsertOrder::Prepend)
                .build(),
        }
    }

    /// The academy collection.
    #[must_use]
    pub const fn academies(&self) -> &DomainStore<Academy> {
        &self.academies
    }

    /// The student collection.
    #[must_use]
    pub const fn students(&self) -> &DomainStore<Student> {
        &self.students
    }

    /// The announcement feed.
    #[must_use]
    pub const fn announcements(&self) -> &DomainStore<Announcement> {
        &self.announcements
    }

    /// Registers a new academy.
    pub async fn add_academy(
        &self,
        name: impl Into<String>,
        city: impl Into<String>,
        sports: Vec<String>,
    ) -> Academy {
        let (name, city) = (name.into(), city.into());
        self.academies
            .create(|id, stamps| Academy {
                id,
                name,
                city,
                sports,
                stamps,
            })
            .await
    }

    /// Applies a patch to an academy. `None` if the id is unknown.
    pub async fn update_academy<F>(&self, id: &EntityId, patch: F) -> Option<Academy>
    where
        F: FnOnce(&mut Academy),
    {
        self.academies.update(id, patch).await
    }

    /// Enrolls a student at an academy.
    ///
    /// The academy id is not checked against the academy collection;
    /// relationships hold by identifier only.
    pub async fn enroll_student(
        &self,
        academy_id: EntityId,
        name: impl Into<String>,
        guardian_phone: Option<String>,
    ) -> Student {
        let name = name.into();
        self.students
            .create(|id, stamps| Student {
                id,
                academy_id,
                name,
                guardian_phone,
                stamps,
            })
            .await
    }

    /// Students enrolled at the given academy, in enrollment order.
    pub async fn students_of(&self, academy_id: &EntityId) -> Vec<Student> {
        self.students
            .query(|s| &s.academy_id == academy_id)
            .await
    }

    /// Records whether a student attended on a date.
    ///
    /// At most one record exists per `(student_id, date)`: a second call for
    /// the same key updates the existing record in place and wins.
    #[tracing::instrument(skip(self), fields(student_id = %student_id))]
    pub async fn mark_attendance(
        &self,
        student_id: EntityId,
        date: NaiveDate,
        present: bool,
    ) -> AttendanceRecord {
        let existing = self
            .attendance
            .query(|r| r.student_id == student_id && r.date == date)
            .await
            .into_iter()
            .next();

        if let Some(record) = existing {
            // Second call wins. The update path cannot miss since nothing
            // else removes attendance records between query and update.
            if let Some(updated) = self
                .attendance
                .update(&record.id, |r| r.present = present)
                .await
            {
                return updated;
            }
        }

        self.attendance
            .create(|id, stamps| AttendanceRecord {
                id,
                student_id,
                date,
                present,
                stamps,
            })
            .await
    }

    /// The attendance record for a `(student, date)` key, if one exists.
    pub async fn attendance_on(
        &self,
        student_id: &EntityId,
        date: NaiveDate,
    ) -> Option<AttendanceRecord> {
        self.attendance
            .query(|r| &r.student_id == student_id && r.date == date)
            .await
            .into_iter()
            .next()
    }

    /// Posts an announcement to the front of the academy's feed.
    pub async fn post_announcement(
        &self,
        academy_id: EntityId,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Announcement {
        let (title, body) = (title.into(), body.into());
        self.announcements
            .create(|id, stamps| Announcement {
                id,
                academy_id,
                title,
                body,
                stamps,
            })
            .await
    }

    /// Announcements by one academy, newest first.
    pub async fn announcements_for(&self, academy_id: &EntityId) -> Vec<Announcement> {
        self.announcements
            .query(|a| &a.academy_id == academy_id)
            .await
    }
}

impl std::fmt::Debug for AcademyRoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcademyRoster")
            .field("academies", &self.academies)
            .field("students", &self.students)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use courtside_testing::mocks::test_environment;

    fn roster() -> AcademyRoster {
        AcademyRoster::new(test_environment())
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn added_academy_is_retrievable_by_generated_id() {
        let roster = roster();

        let academy = roster
            .add_academy("Rising Stars", "Delhi", vec!["cricket".to_string()])
            .await;

        let found = roster.academies().get(&academy.id).await.unwrap();
        assert_eq!(found.name, "Rising Stars");
        assert_eq!(found.city, "Delhi");
        assert_eq!(roster.academies().len().await, 1);
    }

    #[tokio::test]
    async fn second_attendance_mark_wins_without_duplicating() {
        let roster = roster();
        let student_id = EntityId::from("s1");
        let day = date("2024-05-01");

        roster
            .mark_attendance(student_id.clone(), day, true)
            .await;
        roster
            .mark_attendance(student_id.clone(), day, false)
            .await;

        let record = roster.attendance_on(&student_id, day).await.unwrap();
        assert!(!record.present);

        let all = roster
            .attendance
            .query(|r| r.student_id == student_id && r.date == day)
            .await;
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn attendance_keys_are_per_student_and_date() {
        let roster = roster();
        let day = date("2024-05-01");

        roster
            .mark_attendance(EntityId::from("s1"), day, true)
            .await;
        roster
            .mark_attendance(EntityId::from("s2"), day, true)
            .await;
        roster
            .mark_attendance(EntityId::from("s1"), date("2024-05-02"), false)
            .await;

        assert_eq!(roster.attendance.len().await, 3);
    }

    #[tokio::test]
    async fn update_on_nonexistent_academy_changes_nothing() {
        let roster = roster();
        roster
            .add_academy("Rising Stars", "Delhi", vec![])
            .await;
        let before = roster.academies().list().await;

        let result = roster
            .update_academy(&EntityId::from("nonexistent"), |a| {
                a.city = "Mumbai".to_string();
            })
            .await;

        assert!(result.is_none());
        assert_eq!(roster.academies().list().await, before);
    }

    #[tokio::test]
    async fn announcements_read_newest_first() {
        let roster = roster();
        let academy = roster.add_academy("Rising Stars", "Delhi", vec![]).await;

        roster
            .post_announcement(academy.id.clone(), "Trials open", "Sign up now")
            .await;
        roster
            .post_announcement(academy.id.clone(), "Holiday", "Closed Monday")
            .await;

        let feed = roster.announcements_for(&academy.id).await;
        assert_eq!(feed[0].title, "Holiday");
        assert_eq!(feed[1].title, "Trials open");
    }

    #[tokio::test]
    async fn students_keep_academy_reference_after_academy_removal() {
        let roster = roster();
        let academy = roster.add_academy("Rising Stars", "Delhi", vec![]).await;
        roster
            .enroll_student(academy.id.clone(), "Asha", None)
            .await;

        roster.academies().remove(&academy.id).await.unwrap();

        let students = roster.students_of(&academy.id).await;
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Asha");
    }
}
