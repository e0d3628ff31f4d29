pub mod project_context_request;
pub mod project_context_response;
pub mod project_context_route;
