pub mod attendance_event;
pub mod child;
pub mod user;
pub mod venue;

pub use attendance_event::Entity as AttendanceEvent;
pub use child::Entity as Child;
pub use user::Entity as User;
pub use venue::Entity as Venue;
