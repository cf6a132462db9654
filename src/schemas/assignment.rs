use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Assignment, Submission};
use crate::db::types::SubmissionStatus;
use crate::schemas::files::{FileResponse, LinkResponse};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentCreate {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    #[serde(alias = "dueDate")]
    pub(crate) due_date: Option<PrimitiveDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "dueDate")]
    pub(crate) due_date: Option<PrimitiveDateTime>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) teacher_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            course_id: assignment.course_id,
            teacher_id: assignment.teacher_id,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date.map(format_primitive),
            created_at: format_primitive(assignment.created_at),
            updated_at: format_primitive(assignment.updated_at),
        }
    }
}

/// Assignment as seen by a student: attachments plus their own submission.
#[derive(Debug, Serialize)]
pub(crate) struct StudentAssignmentDetail {
    #[serde(flatten)]
    pub(crate) assignment: AssignmentResponse,
    pub(crate) files: Vec<FileResponse>,
    pub(crate) links: Vec<LinkResponse>,
    pub(crate) submission: Option<SubmissionResponse>,
}

/// Assignment as seen by the course teacher: attachments plus status counts.
#[derive(Debug, Serialize)]
pub(crate) struct TeacherAssignmentDetail {
    #[serde(flatten)]
    pub(crate) assignment: AssignmentResponse,
    pub(crate) files: Vec<FileResponse>,
    pub(crate) links: Vec<LinkResponse>,
    pub(crate) status_counts: StatusCounts,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct StatusCounts {
    pub(crate) assigned: i64,
    pub(crate) submitted: i64,
    pub(crate) graded: i64,
    pub(crate) returned: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) student_id: String,
    pub(crate) comment: String,
    pub(crate) status: SubmissionStatus,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: String,
    pub(crate) submitted_at: Option<String>,
    pub(crate) returned_at: Option<String>,
    pub(crate) files: Vec<FileResponse>,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: Submission, files: Vec<FileResponse>) -> Self {
        Self {
            id: submission.id,
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            comment: submission.comment,
            status: submission.status,
            grade: submission.grade,
            feedback: submission.feedback,
            submitted_at: submission.submitted_at.map(format_primitive),
            returned_at: submission.returned_at.map(format_primitive),
            files,
        }
    }
}

/// One row in the teacher's submitted-work list.
#[derive(Debug, Serialize)]
pub(crate) struct SubmissionListItem {
    #[serde(flatten)]
    pub(crate) submission: SubmissionResponse,
    pub(crate) on_time: Option<bool>,
}

/// One row in the student's per-course assignment list. Grade and feedback
/// are only exposed once the work is graded or returned.
#[derive(Debug, Serialize)]
pub(crate) struct StudentAssignmentListItem {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) due_date: Option<String>,
    pub(crate) status: SubmissionStatus,
    pub(crate) grade: Option<f64>,
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeRequest {
    #[validate(range(min = 0.0, max = 100.0, message = "grade must be between 0 and 100"))]
    pub(crate) grade: f64,
    #[serde(default)]
    pub(crate) feedback: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnRequest {
    pub(crate) feedback: String,
}
