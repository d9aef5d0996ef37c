//! Pure scoring core: month windows, the point computation, the
//! leaderboard fold and the promotion advisor. No I/O here; the
//! service layer hydrates the fact structs from the repositories and
//! everything below is deterministic given its inputs. Scores are
//! never cached; they are recomputed on every read.

pub mod leaderboard;
pub mod points;
pub mod promotion;
pub mod window;

pub use leaderboard::{leaderboard_count_rows, leaderboard_rows};
pub use points::{approved_count, compute_points, is_reviewed, ItemFacts, ScoredSubmission};
pub use promotion::suggest_promotion;
pub use window::{month_range, now_team, MonthWindow};
