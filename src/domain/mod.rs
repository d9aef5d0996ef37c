pub mod adjustment;
pub mod event;
pub mod leaderboard;
pub mod lifecycle;
pub mod notification;
pub mod submission;
pub mod user;

pub use adjustment::*;
pub use event::*;
pub use leaderboard::*;
pub use lifecycle::*;
pub use notification::*;
pub use submission::*;
pub use user::*;
