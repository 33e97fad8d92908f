// Linkshelf state managers
// Managers own the SQL for a table family and borrow the connection per call.

pub mod bookmark_manager;
