use crate::schema::{members, teams};
use diesel::dsl::LeftJoinQuerySource;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable};
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

/// Query source shared by every search shape: `members LEFT JOIN teams`.
pub type MemberTeamSource = LeftJoinQuerySource<members::table, teams::table>;

/// A single boxed filter over the member/team join.
///
/// Everything is boxed at `Nullable<Bool>` so that predicates over nullable
/// columns (`members.name`) and non-nullable ones (`members.age`,
/// `teams.name`) compose into one type. The same boxed predicate attaches to
/// any query built from [`MemberTeamSource`], regardless of its projection.
pub type MemberPredicate =
    Box<dyn BoxableExpression<MemberTeamSource, Sqlite, SqlType = Nullable<Bool>>>;

/// Optional search filters for member queries (following Specification Pattern).
///
/// Every field is optional. A condition with no fields set matches everything;
/// callers should pair that with a page limit to avoid unscoped full scans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberSearchCondition {
    pub username: Option<String>,
    pub team_name: Option<String>,
    pub age_goe: Option<i32>,
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    /// True when no field contributes a filter: the match-all, full-scan case.
    /// Blank strings count as absent, same as the predicate builders.
    pub fn is_unscoped(&self) -> bool {
        has_text(self.username.as_deref()).is_none()
            && has_text(self.team_name.as_deref()).is_none()
            && self.age_goe.is_none()
            && self.age_loe.is_none()
    }

    /// AND-composition of every present field predicate.
    ///
    /// Returns `None` when no field is set; callers treat that as an explicit
    /// match-all rather than an error. Conjuncts keep field declaration order
    /// so the generated SQL stays readable.
    pub fn to_predicate(&self) -> Option<MemberPredicate> {
        let conjuncts = [
            username_eq(self.username.as_deref()),
            team_name_eq(self.team_name.as_deref()),
            age_goe(self.age_goe),
            age_loe(self.age_loe),
        ];

        conjuncts
            .into_iter()
            .flatten()
            .reduce(|combined, predicate| Box::new(combined.and(predicate)) as MemberPredicate)
    }
}

/// Present and non-blank, trimmed. A blank string never becomes `name = ''`.
fn has_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

/// `members.name = ?` when the username has text, otherwise no predicate.
pub fn username_eq(username: Option<&str>) -> Option<MemberPredicate> {
    has_text(username)
        .map(|name| Box::new(members::name.eq(name.to_owned()).nullable()) as MemberPredicate)
}

/// `teams.name = ?` when the team name has text, otherwise no predicate.
pub fn team_name_eq(team_name: Option<&str>) -> Option<MemberPredicate> {
    has_text(team_name)
        .map(|name| Box::new(teams::name.eq(name.to_owned()).nullable()) as MemberPredicate)
}

/// Inclusive lower bound on age.
pub fn age_goe(age: Option<i32>) -> Option<MemberPredicate> {
    age.map(|bound| Box::new(members::age.ge(bound).nullable()) as MemberPredicate)
}

/// Inclusive upper bound on age.
pub fn age_loe(age: Option<i32>) -> Option<MemberPredicate> {
    age.map(|bound| Box::new(members::age.le(bound).nullable()) as MemberPredicate)
}
