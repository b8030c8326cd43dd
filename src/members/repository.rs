use diesel::dsl::{count_star, sql};
use diesel::prelude::*;
use diesel::sql_types::{Double, Nullable};
use log::{debug, warn};
use std::sync::Arc;
use tokio::task;

use super::models::{AgeStatistics, Member, MemberTeamRow, NewMember, NewTeam, Team, TeamAverage};
use super::search::MemberSearchCondition;
use crate::schema::{members, teams};
use crate::shared::database::{Database, DbConnection};
use crate::shared::errors::AppResult;
use crate::shared::pagination::{PaginatedResult, PaginationParams};

/// Columns of the flattened member/team projection. Team columns come from
/// the outer side of the join and select as nullable.
type MemberTeamSelection = (
    members::id,
    members::name,
    members::age,
    diesel::dsl::Nullable<teams::id>,
    diesel::dsl::Nullable<teams::name>,
);

fn member_team_selection() -> MemberTeamSelection {
    (
        members::id,
        members::name,
        members::age,
        teams::id.nullable(),
        teams::name.nullable(),
    )
}

/// Repository over the member/team schema.
///
/// The search entry points share one predicate construction
/// ([`MemberSearchCondition::to_predicate`]) across every result shape, which
/// is the point of the pattern: filters are composed once and attached to a
/// flattened projection, an entity query, or a count without change.
pub struct MemberRepository {
    db: Arc<Database>,
}

impl MemberRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // ================== BASIC OPERATIONS ==================

    pub async fn save_team(&self, new_team: NewTeam) -> AppResult<Team> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Team> {
            let mut conn = db.get_connection()?;
            let team = diesel::insert_into(teams::table)
                .values(&new_team)
                .get_result::<Team>(&mut conn)?;
            Ok(team)
        })
        .await?
    }

    pub async fn save(&self, new_member: NewMember) -> AppResult<Member> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Member> {
            let mut conn = db.get_connection()?;
            let member = diesel::insert_into(members::table)
                .values(&new_member)
                .get_result::<Member>(&mut conn)?;
            Ok(member)
        })
        .await?
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Member>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Option<Member>> {
            let mut conn = db.get_connection()?;
            let member = members::table
                .filter(members::id.eq(id))
                .first::<Member>(&mut conn)
                .optional()?;
            Ok(member)
        })
        .await?
    }

    pub async fn find_all(&self) -> AppResult<Vec<Member>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<Member>> {
            let mut conn = db.get_connection()?;
            let rows = members::table
                .order(members::id.asc())
                .load::<Member>(&mut conn)?;
            Ok(rows)
        })
        .await?
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Vec<Member>> {
        let db = Arc::clone(&self.db);
        let username = username.to_owned();

        task::spawn_blocking(move || -> AppResult<Vec<Member>> {
            let mut conn = db.get_connection()?;
            let rows = members::table
                .filter(members::name.eq(username))
                .order(members::id.asc())
                .load::<Member>(&mut conn)?;
            Ok(rows)
        })
        .await?
    }

    // ================== DYNAMIC SEARCH ==================

    /// Search returning the flattened member/team projection.
    ///
    /// Members without a team are still returned (left outer join) with
    /// `None` team fields.
    pub async fn search(&self, condition: MemberSearchCondition) -> AppResult<Vec<MemberTeamRow>> {
        self.log_condition(&condition, "search");
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<MemberTeamRow>> {
            let mut conn = db.get_connection()?;

            let join = members::table.left_join(teams::table);
            let rows = match condition.to_predicate() {
                Some(predicate) => join
                    .select(member_team_selection())
                    .filter(predicate)
                    .order(members::id.asc())
                    .load::<MemberTeamRow>(&mut conn)?,
                None => join
                    .select(member_team_selection())
                    .order(members::id.asc())
                    .load::<MemberTeamRow>(&mut conn)?,
            };
            Ok(rows)
        })
        .await?
    }

    /// Search returning raw member entities.
    ///
    /// Same join and same predicate as [`search`](Self::search); only the
    /// projection differs.
    pub async fn search_members(
        &self,
        condition: MemberSearchCondition,
    ) -> AppResult<Vec<Member>> {
        self.log_condition(&condition, "search_members");
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<Member>> {
            let mut conn = db.get_connection()?;

            let join = members::table.left_join(teams::table);
            let rows = match condition.to_predicate() {
                Some(predicate) => join
                    .select(members::all_columns)
                    .filter(predicate)
                    .order(members::id.asc())
                    .load::<Member>(&mut conn)?,
                None => join
                    .select(members::all_columns)
                    .order(members::id.asc())
                    .load::<Member>(&mut conn)?,
            };
            Ok(rows)
        })
        .await?
    }

    /// Paginated variant of [`search`](Self::search): page content plus the
    /// total count of matching rows, both built from the same condition.
    pub async fn search_page(
        &self,
        condition: MemberSearchCondition,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResult<MemberTeamRow>> {
        self.log_condition(&condition, "search_page");
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<PaginatedResult<MemberTeamRow>> {
            let mut conn = db.get_connection()?;

            let total = count_matching(&mut conn, &condition)?;

            let join = members::table.left_join(teams::table);
            let items = match condition.to_predicate() {
                Some(predicate) => join
                    .select(member_team_selection())
                    .filter(predicate)
                    .order(members::id.asc())
                    .offset(pagination.offset())
                    .limit(pagination.limit())
                    .load::<MemberTeamRow>(&mut conn)?,
                None => join
                    .select(member_team_selection())
                    .order(members::id.asc())
                    .offset(pagination.offset())
                    .limit(pagination.limit())
                    .load::<MemberTeamRow>(&mut conn)?,
            };

            Ok(PaginatedResult::new(items, total, &pagination))
        })
        .await?
    }

    /// Count members matching the condition.
    pub async fn count(&self, condition: MemberSearchCondition) -> AppResult<u64> {
        self.log_condition(&condition, "count");
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<u64> {
            let mut conn = db.get_connection()?;
            count_matching(&mut conn, &condition)
        })
        .await?
    }

    // ================== AGGREGATION ==================

    /// Count, sum, min and max over all member ages. The average is derived
    /// from sum and count instead of `AVG` so every value loads with a plain
    /// integer type.
    pub async fn age_statistics(&self) -> AppResult<AgeStatistics> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<AgeStatistics> {
            let mut conn = db.get_connection()?;

            let (count, total, oldest, youngest) = members::table
                .select((
                    count_star(),
                    // Qualified calls: `dsl::{max, min, sum}` are glob
                    // re-exports that collide with the helper types of the
                    // same names.
                    diesel::dsl::sum(members::age),
                    diesel::dsl::max(members::age),
                    diesel::dsl::min(members::age),
                ))
                .first::<(i64, Option<i64>, Option<i32>, Option<i32>)>(&mut conn)?;

            let average = total
                .filter(|_| count > 0)
                .map(|total_age| total_age as f64 / count as f64);

            Ok(AgeStatistics {
                count,
                total,
                average,
                oldest,
                youngest,
            })
        })
        .await?
    }

    /// Average member age per team (inner join, grouped by team name).
    pub async fn average_age_by_team(&self) -> AppResult<Vec<TeamAverage>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<TeamAverage>> {
            let mut conn = db.get_connection()?;

            let rows = members::table
                .inner_join(teams::table)
                .group_by(teams::name)
                .select((teams::name, sql::<Nullable<Double>>("avg(members.age)")))
                .order(teams::name.asc())
                .load::<(String, Option<f64>)>(&mut conn)?;

            Ok(rows
                .into_iter()
                .map(|(team_name, average_age)| TeamAverage {
                    team_name,
                    average_age,
                })
                .collect())
        })
        .await?
    }

    /// Members whose age equals the maximum age, via a scalar subquery.
    pub async fn oldest_members(&self) -> AppResult<Vec<Member>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<Member>> {
            let mut conn = db.get_connection()?;

            // The inner query gets its own alias so `members` can appear in
            // both the outer statement and the subquery.
            let peers = diesel::alias!(crate::schema::members as peers);
            let max_age = peers
                .select(diesel::dsl::max(peers.field(members::age)))
                .single_value();
            let rows = members::table
                .filter(members::age.nullable().eq(max_age))
                .order(members::id.asc())
                .load::<Member>(&mut conn)?;
            Ok(rows)
        })
        .await?
    }

    // ================== BULK OPERATIONS ==================
    //
    // Bulk statements run directly against the database. Rows already loaded
    // into memory keep their old values; callers must re-read affected rows
    // after any of these calls.

    /// Rename every member younger than `cutoff` to `placeholder` in one
    /// statement. Returns the affected row count.
    pub async fn rename_members_younger_than(
        &self,
        cutoff: i32,
        placeholder: &str,
    ) -> AppResult<u64> {
        let db = Arc::clone(&self.db);
        let placeholder = placeholder.to_owned();

        task::spawn_blocking(move || -> AppResult<u64> {
            let mut conn = db.get_connection()?;
            let affected = diesel::update(members::table.filter(members::age.lt(cutoff)))
                .set(members::name.eq(placeholder))
                .execute(&mut conn)?;
            debug!("bulk rename touched {} members", affected);
            Ok(affected as u64)
        })
        .await?
    }

    /// Add one year to every member's age. Returns the affected row count.
    pub async fn increment_all_ages(&self) -> AppResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<u64> {
            let mut conn = db.get_connection()?;
            let affected = diesel::update(members::table)
                .set(members::age.eq(members::age + 1))
                .execute(&mut conn)?;
            debug!("bulk age increment touched {} members", affected);
            Ok(affected as u64)
        })
        .await?
    }

    /// Delete every member aged `cutoff` or older. Returns the affected row
    /// count.
    pub async fn delete_members_aged_at_least(&self, cutoff: i32) -> AppResult<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<u64> {
            let mut conn = db.get_connection()?;
            let affected =
                diesel::delete(members::table.filter(members::age.ge(cutoff))).execute(&mut conn)?;
            debug!("bulk delete removed {} members", affected);
            Ok(affected as u64)
        })
        .await?
    }

    fn log_condition(&self, condition: &MemberSearchCondition, entry_point: &str) {
        if condition.is_unscoped() {
            warn!("{} called without any filter; this scans the whole members table", entry_point);
        } else {
            debug!("{} condition: {:?}", entry_point, condition);
        }
    }
}

/// Count over the same join and predicate the row queries use.
fn count_matching(conn: &mut DbConnection, condition: &MemberSearchCondition) -> AppResult<u64> {
    let join = members::table.left_join(teams::table);

    let total: i64 = match condition.to_predicate() {
        Some(predicate) => join.filter(predicate).count().get_result(conn)?,
        None => join.count().get_result(conn)?,
    };

    Ok(total as u64)
}
