//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use papervault_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PaperVault API",
        version = "0.1.0",
        description = "Community archive of exam papers. Readers upload scans and PDFs, vote on individual files, and files with too many downvotes drop out of public listings."
    ),
    paths(
        // Papers
        handlers::upload::upload_paper,
        handlers::papers::list_papers,
        // Votes
        handlers::votes::upvote,
        handlers::votes::downvote,
        // Admin
        handlers::admin::list_all_papers,
        handlers::admin::delete_paper,
        // Feedback and subjects
        handlers::feedback::submit_feedback,
        handlers::subjects::list_subjects,
        handlers::subjects::create_subject,
    ),
    components(
        schemas(
            models::FileKind,
            models::PaperResponse,
            models::PaperFileResponse,
            models::SkipReason,
            models::SkippedFile,
            models::Feedback,
            models::CreateFeedbackRequest,
            models::Subject,
            models::CreateSubjectRequest,
            handlers::upload::UploadForm,
            handlers::upload::UploadResponse,
            handlers::votes::VoteResponse,
            handlers::admin::MessageResponse,
            handlers::feedback::FeedbackResponse,
            handlers::subjects::SubjectListResponse,
            handlers::subjects::SubjectCreatedResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "papers", description = "Paper submission and public listing"),
        (name = "votes", description = "Per-file upvotes and downvotes"),
        (name = "admin", description = "Moderator operations, authenticated with the username and password headers"),
        (name = "feedback", description = "Free-form reader feedback"),
        (name = "subjects", description = "Subject catalogue")
    )
)]
pub struct ApiDoc;
