pub mod candidates;
pub mod feedback;
pub mod maintenance;
