pub mod models;
pub mod repository;
pub mod search;

pub use models::{Member, MemberTeamRow, NewMember, NewTeam, Team};
pub use repository::MemberRepository;
pub use search::{MemberPredicate, MemberSearchCondition};
