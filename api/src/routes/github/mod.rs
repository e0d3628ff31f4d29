pub mod branch_diff_request;
pub mod branch_diff_response;
pub mod branch_diff_route;
pub mod branches_request;
pub mod branches_route;
pub mod custom_diff_request;
pub mod custom_diff_route;
pub mod repositories_route;
pub mod repository_content_request;
pub mod repository_content_route;
