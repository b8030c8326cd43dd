//! Demo data in the shape the search scenarios expect.

use crate::members::models::{NewMember, NewTeam};
use crate::members::repository::MemberRepository;
use crate::shared::errors::AppResult;
use log::info;

/// Seed two teams and one hundred members `member0..member99`, aged `0..100`,
/// alternating between the teams.
pub async fn seed_demo_roster(repository: &MemberRepository) -> AppResult<()> {
    let team_a = repository.save_team(NewTeam::new("teamA")).await?;
    let team_b = repository.save_team(NewTeam::new("teamB")).await?;

    for i in 0..100 {
        let team_id = if i % 2 == 0 { team_a.id } else { team_b.id };
        repository
            .save(NewMember::with_team(format!("member{i}"), i, team_id))
            .await?;
    }

    info!("Seeded demo roster: 2 teams, 100 members");
    Ok(())
}
