use sqlx::PgPool;

use crate::db::types::UserRole;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PlatformCounts {
    pub(crate) total_users: i64,
    pub(crate) total_students: i64,
    pub(crate) total_teachers: i64,
    pub(crate) total_courses: i64,
    pub(crate) total_enrollments: i64,
    pub(crate) total_assignments: i64,
    pub(crate) total_submissions: i64,
    pub(crate) graded_submissions: i64,
    pub(crate) completed_lessons: i64,
    pub(crate) completed_modules: i64,
}

pub(crate) async fn platform_counts(pool: &PgPool) -> Result<PlatformCounts, sqlx::Error> {
    sqlx::query_as::<_, PlatformCounts>(
        "SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM users WHERE role = 'student') AS total_students,
            (SELECT COUNT(*) FROM users WHERE role = 'teacher') AS total_teachers,
            (SELECT COUNT(*) FROM courses) AS total_courses,
            (SELECT COUNT(*) FROM enrollments) AS total_enrollments,
            (SELECT COUNT(*) FROM assignments) AS total_assignments,
            (SELECT COUNT(*) FROM submissions) AS total_submissions,
            (SELECT COUNT(*) FROM submissions WHERE status = 'graded') AS graded_submissions,
            (SELECT COUNT(*) FROM lesson_progress) AS completed_lessons,
            (SELECT COUNT(*) FROM module_progress) AS completed_modules",
    )
    .fetch_one(pool)
    .await
}

pub(crate) async fn average_grade(pool: &PgPool) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<f64>>(
        "SELECT AVG(grade) FROM submissions WHERE grade IS NOT NULL",
    )
    .fetch_one(pool)
    .await
}

pub(crate) async fn signups_by_role_since(
    pool: &PgPool,
    role: UserRole,
    since: time::PrimitiveDateTime,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE role = $1 AND created_at >= $2",
    )
    .bind(role)
    .bind(since)
    .fetch_one(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CourseCounts {
    pub(crate) enrollments: i64,
    pub(crate) modules: i64,
    pub(crate) lessons: i64,
    pub(crate) assignments: i64,
    pub(crate) submissions_submitted: i64,
    pub(crate) submissions_graded: i64,
    pub(crate) completed_modules: i64,
}

pub(crate) async fn course_counts(
    pool: &PgPool,
    course_id: &str,
) -> Result<CourseCounts, sqlx::Error> {
    sqlx::query_as::<_, CourseCounts>(
        "SELECT
            (SELECT COUNT(*) FROM enrollments WHERE course_id = $1) AS enrollments,
            (SELECT COUNT(*) FROM modules WHERE course_id = $1) AS modules,
            (SELECT COUNT(*) FROM lessons l
               JOIN modules m ON m.id = l.module_id WHERE m.course_id = $1) AS lessons,
            (SELECT COUNT(*) FROM assignments WHERE course_id = $1) AS assignments,
            (SELECT COUNT(*) FROM submissions s
               JOIN assignments a ON a.id = s.assignment_id
              WHERE a.course_id = $1 AND s.status <> 'assigned') AS submissions_submitted,
            (SELECT COUNT(*) FROM submissions s
               JOIN assignments a ON a.id = s.assignment_id
              WHERE a.course_id = $1 AND s.status = 'graded') AS submissions_graded,
            (SELECT COUNT(*) FROM module_progress mp
               JOIN modules m ON m.id = mp.module_id WHERE m.course_id = $1) AS completed_modules",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn course_average_grade(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<f64>>(
        "SELECT AVG(s.grade) FROM submissions s
           JOIN assignments a ON a.id = s.assignment_id
          WHERE a.course_id = $1 AND s.grade IS NOT NULL",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StudentAssignmentCounts {
    pub(crate) pending: i64,
    pub(crate) submitted: i64,
    pub(crate) graded: i64,
    pub(crate) returned: i64,
}

pub(crate) async fn student_assignment_counts(
    pool: &PgPool,
    student_id: &str,
) -> Result<StudentAssignmentCounts, sqlx::Error> {
    sqlx::query_as::<_, StudentAssignmentCounts>(
        "SELECT
            COUNT(*) FILTER (WHERE status = 'assigned') AS pending,
            COUNT(*) FILTER (WHERE status = 'submitted') AS submitted,
            COUNT(*) FILTER (WHERE status = 'graded') AS graded,
            COUNT(*) FILTER (WHERE status = 'returned') AS returned
           FROM submissions WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_one(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UpcomingDeadline {
    pub(crate) assignment_id: String,
    pub(crate) title: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) due_date: time::PrimitiveDateTime,
}

pub(crate) async fn upcoming_deadlines(
    pool: &PgPool,
    student_id: &str,
    after: time::PrimitiveDateTime,
    limit: i64,
) -> Result<Vec<UpcomingDeadline>, sqlx::Error> {
    sqlx::query_as::<_, UpcomingDeadline>(
        "SELECT a.id AS assignment_id, a.title, c.id AS course_id, c.title AS course_title,
                a.due_date
           FROM submissions s
           JOIN assignments a ON a.id = s.assignment_id
           JOIN courses c ON c.id = a.course_id
          WHERE s.student_id = $1
            AND s.status IN ('assigned', 'returned')
            AND a.due_date IS NOT NULL
            AND a.due_date >= $2
          ORDER BY a.due_date
          LIMIT $3",
    )
    .bind(student_id)
    .bind(after)
    .bind(limit)
    .fetch_all(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RecentGrade {
    pub(crate) assignment_id: String,
    pub(crate) title: String,
    pub(crate) grade: Option<f64>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn recent_grades(
    pool: &PgPool,
    student_id: &str,
    limit: i64,
) -> Result<Vec<RecentGrade>, sqlx::Error> {
    sqlx::query_as::<_, RecentGrade>(
        "SELECT a.id AS assignment_id, a.title, s.grade, s.updated_at
           FROM submissions s
           JOIN assignments a ON a.id = s.assignment_id
          WHERE s.student_id = $1 AND s.status IN ('graded', 'returned')
          ORDER BY s.updated_at DESC
          LIMIT $2",
    )
    .bind(student_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
