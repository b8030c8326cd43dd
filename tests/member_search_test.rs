/// Dynamic search tests - predicate composition over the member/team join
///
/// Tests cover:
/// - AND-composition of optional filters
/// - Reuse of one condition across both result shapes
/// - Left-outer-join correctness for teamless members
/// - Match-all behavior when no filter is set
/// - Pagination and counts sharing the predicate
mod utils;

use roster::members::models::{NewMember, NewTeam};
use roster::members::repository::MemberRepository;
use roster::members::search::MemberSearchCondition;
use roster::shared::pagination::PaginationParams;
use utils::db;

/// Standard scenario: teamA with member1 (10) and member2 (20), teamB with
/// member3 (30) and member4 (40).
async fn seeded_repository() -> MemberRepository {
    let repo = MemberRepository::new(db::test_database());

    let team_a = repo.save_team(NewTeam::new("teamA")).await.unwrap();
    let team_b = repo.save_team(NewTeam::new("teamB")).await.unwrap();
    repo.save(NewMember::with_team("member1", 10, team_a.id))
        .await
        .unwrap();
    repo.save(NewMember::with_team("member2", 20, team_a.id))
        .await
        .unwrap();
    repo.save(NewMember::with_team("member3", 30, team_b.id))
        .await
        .unwrap();
    repo.save(NewMember::with_team("member4", 40, team_b.id))
        .await
        .unwrap();

    repo
}

#[tokio::test]
async fn range_and_team_condition_matches_single_member() {
    let repo = seeded_repository().await;

    let condition = MemberSearchCondition {
        team_name: Some("teamB".to_string()),
        age_goe: Some(35),
        age_loe: Some(40),
        ..Default::default()
    };

    let rows = repo.search(condition).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].member_name.as_deref(), Some("member4"));
    assert_eq!(rows[0].age, 40);
    assert_eq!(rows[0].team_name.as_deref(), Some("teamB"));
}

#[tokio::test]
async fn username_condition_matches_in_both_shapes() {
    let repo = seeded_repository().await;

    let condition = MemberSearchCondition {
        username: Some("member1".to_string()),
        ..Default::default()
    };

    let rows = repo.search(condition.clone()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].member_name.as_deref(), Some("member1"));

    let entities = repo.search_members(condition).await.unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].name.as_deref(), Some("member1"));
    assert_eq!(entities[0].id, rows[0].member_id);
}

#[tokio::test]
async fn empty_condition_matches_everything() {
    let repo = seeded_repository().await;

    let rows = repo.search(MemberSearchCondition::default()).await.unwrap();
    assert_eq!(rows.len(), 4);

    // Both shapes agree on member identities.
    let entities = repo
        .search_members(MemberSearchCondition::default())
        .await
        .unwrap();
    let row_ids: Vec<i64> = rows.iter().map(|r| r.member_id).collect();
    let entity_ids: Vec<i64> = entities.iter().map(|m| m.id).collect();
    assert_eq!(row_ids, entity_ids);
}

#[tokio::test]
async fn blank_strings_do_not_filter() {
    let repo = seeded_repository().await;

    let condition = MemberSearchCondition {
        username: Some("   ".to_string()),
        team_name: Some(String::new()),
        ..Default::default()
    };

    let rows = repo.search(condition).await.unwrap();
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn age_bounds_are_inclusive() {
    let repo = seeded_repository().await;

    let lower = MemberSearchCondition {
        age_goe: Some(40),
        ..Default::default()
    };
    let rows = repo.search(lower).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].member_name.as_deref(), Some("member4"));

    let upper = MemberSearchCondition {
        age_loe: Some(10),
        ..Default::default()
    };
    let rows = repo.search(upper).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].member_name.as_deref(), Some("member1"));
}

#[tokio::test]
async fn inverted_bounds_yield_empty_result() {
    let repo = seeded_repository().await;

    // Not validated locally; the engine simply finds nothing.
    let condition = MemberSearchCondition {
        age_goe: Some(40),
        age_loe: Some(10),
        ..Default::default()
    };

    let rows = repo.search(condition.clone()).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(repo.count(condition).await.unwrap(), 0);
}

#[tokio::test]
async fn teamless_member_appears_once_with_null_team_fields() {
    let repo = seeded_repository().await;
    repo.save(NewMember::new("floater", 50)).await.unwrap();

    let rows = repo.search(MemberSearchCondition::default()).await.unwrap();
    assert_eq!(rows.len(), 5);

    let floaters: Vec<_> = rows
        .iter()
        .filter(|r| r.member_name.as_deref() == Some("floater"))
        .collect();
    assert_eq!(floaters.len(), 1);
    assert_eq!(floaters[0].team_id, None);
    assert_eq!(floaters[0].team_name, None);
}

#[tokio::test]
async fn anonymous_member_surfaces_with_null_name() {
    let repo = seeded_repository().await;
    repo.save(NewMember::anonymous(55)).await.unwrap();

    let condition = MemberSearchCondition {
        age_goe: Some(55),
        ..Default::default()
    };

    let rows = repo.search(condition).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].member_name, None);
    assert_eq!(rows[0].age, 55);
}

#[tokio::test]
async fn repeated_search_is_idempotent() {
    let repo = seeded_repository().await;

    let condition = MemberSearchCondition {
        team_name: Some("teamA".to_string()),
        ..Default::default()
    };

    let first = repo.search(condition.clone()).await.unwrap();
    let second = repo.search(condition).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn count_agrees_with_search() {
    let repo = seeded_repository().await;

    let condition = MemberSearchCondition {
        age_goe: Some(20),
        ..Default::default()
    };

    let rows = repo.search(condition.clone()).await.unwrap();
    let total = repo.count(condition).await.unwrap();
    assert_eq!(rows.len() as u64, total);
    assert_eq!(total, 3);
}

#[tokio::test]
async fn search_page_returns_page_content_and_totals() {
    let repo = seeded_repository().await;

    let condition = MemberSearchCondition::default();

    let page1 = repo
        .search_page(condition.clone(), PaginationParams::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page1.total_count, 4);
    assert_eq!(page1.total_pages, 2);
    let names: Vec<_> = page1
        .items
        .iter()
        .map(|r| r.member_name.as_deref())
        .collect();
    assert_eq!(names, vec![Some("member1"), Some("member2")]);

    let page2 = repo
        .search_page(condition, PaginationParams::new(2, 2))
        .await
        .unwrap();
    let names: Vec<_> = page2
        .items
        .iter()
        .map(|r| r.member_name.as_deref())
        .collect();
    assert_eq!(names, vec![Some("member3"), Some("member4")]);
}

#[tokio::test]
async fn filtered_page_keeps_condition_and_count_in_sync() {
    let repo = seeded_repository().await;

    let condition = MemberSearchCondition {
        team_name: Some("teamB".to_string()),
        ..Default::default()
    };

    let page = repo
        .search_page(condition, PaginationParams::new(1, 1))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].member_name.as_deref(), Some("member3"));
}
