pub mod advisor;
pub mod create;
pub mod dispatch;
pub mod history;
pub mod list;
pub mod override_status;
pub mod schema;
pub mod shared;
pub mod status;
pub mod statuses;
pub mod vote;
pub mod voting;
