pub mod members;
pub mod schema;
pub mod seed;
pub mod shared;

pub use members::models::{Member, MemberTeamRow, NewMember, NewTeam, Team};
pub use members::repository::MemberRepository;
pub use members::search::MemberSearchCondition;
pub use shared::errors::{AppError, AppResult};
pub use shared::Database;
