use crate::schema::{members, teams};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

// ================== TEAM MODELS ==================

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = teams)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub name: String,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ================== MEMBER MODELS ==================

/// A member row. `name` is nullable and `team_id` is an optional many-to-one
/// reference to a team.
#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Eq, Serialize, Deserialize,
)]
#[diesel(table_name = members, belongs_to(Team))]
pub struct Member {
    pub id: i64,
    pub name: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
}

#[derive(Insertable, Debug, Clone, Default)]
#[diesel(table_name = members)]
pub struct NewMember {
    pub name: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: Some(name.into()),
            age,
            team_id: None,
        }
    }

    pub fn with_team(name: impl Into<String>, age: i32, team_id: i64) -> Self {
        Self {
            name: Some(name.into()),
            age,
            team_id: Some(team_id),
        }
    }

    pub fn anonymous(age: i32) -> Self {
        Self {
            name: None,
            age,
            team_id: None,
        }
    }
}

// ================== READ MODELS ==================

/// Flattened left-join row carrying scalar fields from both sides of the
/// member/team relationship. Team fields are `None` for teamless members.
///
/// Field order must match the select clause in the repository.
#[derive(Queryable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTeamRow {
    pub member_id: i64,
    pub member_name: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

/// Aggregate view over all member ages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeStatistics {
    pub count: i64,
    pub total: Option<i64>,
    pub average: Option<f64>,
    pub oldest: Option<i32>,
    pub youngest: Option<i32>,
}

/// Average member age per team, from a grouped inner join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAverage {
    pub team_name: String,
    pub average_age: Option<f64>,
}
