mod common;

use common::{Fixture, fixture, scenario_policy};
use profilesync_persistence::DirectoryPersistence;

/// org1: "gamma", "alpha"; org2: "beta"
async fn populated() -> (Fixture, i64) {
    let fx = fixture().await;
    let other = fx.store.organization_create("org2").await.unwrap().id;

    fx.create(fx.organization_id, "gamma").await;
    fx.create(fx.organization_id, "alpha").await;
    fx.create(other, "beta").await;

    (fx, other)
}

fn names(profiles: &[profilesync_api::ServiceProfile]) -> Vec<&str> {
    profiles.iter().map(|p| p.name.as_str()).collect()
}

#[tokio::test]
async fn test_organization_scope() {
    let (fx, other) = populated().await;

    assert_eq!(fx.query.count_for_organization(fx.organization_id).await.unwrap(), 2);
    assert_eq!(fx.query.count_for_organization(other).await.unwrap(), 1);
    assert_eq!(fx.query.count_for_organization(12345).await.unwrap(), 0);

    let listed = fx
        .query
        .list_for_organization(fx.organization_id, 10, 0)
        .await
        .unwrap();
    assert_eq!(names(&listed), vec!["alpha", "gamma"]);
    assert!(listed.iter().all(|p| p.organization_id == fx.organization_id));

    assert!(
        fx.query
            .list_for_organization(12345, 10, 0)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_user_scope_is_union_of_memberships() {
    let (fx, other) = populated().await;

    let alice = fx.store.user_create("alice").await.unwrap();
    let bob = fx.store.user_create("bob").await.unwrap();
    fx.store
        .organization_user_create(fx.organization_id, alice.id, true)
        .await
        .unwrap();
    fx.store
        .organization_user_create(other, alice.id, false)
        .await
        .unwrap();
    fx.store
        .organization_user_create(other, bob.id, false)
        .await
        .unwrap();

    assert_eq!(fx.query.count_for_user("alice").await.unwrap(), 3);
    assert_eq!(fx.query.count_for_user("bob").await.unwrap(), 1);
    assert_eq!(fx.query.count_for_user("nobody").await.unwrap(), 0);

    let listed = fx.query.list_for_user("alice", 10, 0).await.unwrap();
    assert_eq!(names(&listed), vec!["alpha", "beta", "gamma"]);

    let listed = fx.query.list_for_user("bob", 10, 0).await.unwrap();
    assert_eq!(names(&listed), vec!["beta"]);

    assert!(fx.query.list_for_user("nobody", 10, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_without_memberships() {
    let (fx, _) = populated().await;
    fx.store.user_create("loner").await.unwrap();

    assert_eq!(fx.query.count_for_user("loner").await.unwrap(), 0);
    assert!(fx.query.list_for_user("loner", 10, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_global_listing_pagination() {
    let (fx, _) = populated().await;

    assert_eq!(fx.query.count_all().await.unwrap(), 3);

    let all = fx.query.list_all(10, 0).await.unwrap();
    assert_eq!(names(&all), vec!["alpha", "beta", "gamma"]);

    let page = fx.query.list_all(2, 1).await.unwrap();
    assert_eq!(names(&page), vec!["beta", "gamma"]);

    assert!(fx.query.list_all(0, 0).await.unwrap().is_empty());
    assert!(fx.query.list_all(10, 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_carries_cached_policy() {
    let fx = fixture().await;
    let profile = fx.create(fx.organization_id, "cached").await;

    let mut remote = scenario_policy();
    remote.ul_rate = 1;
    fx.policies.put(profile.id, remote);

    let listed = fx.query.list_all(10, 0).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].policy, scenario_policy());
    assert!(fx.policies.calls().iter().all(|call| !matches!(call, common::Call::Get(_))));
}

#[tokio::test]
async fn test_deleted_profiles_leave_listings() {
    let fx = fixture().await;
    let keep = fx.create(fx.organization_id, "keep").await;
    let gone = fx.create(fx.organization_id, "gone").await;

    fx.service.delete(gone.id).await.unwrap();

    let listed = fx.query.list_all(10, 0).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
    assert_eq!(fx.query.count_for_organization(fx.organization_id).await.unwrap(), 1);
}
