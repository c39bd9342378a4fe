mod common;

use common::Kitchen;
use foodgram_core::subscriptions::ALREADY_SUBSCRIBED;
use foodgram_core::{CoreError, CurrentUser, SubscriptionService, ValidationError};

#[test]
fn test_subscribe_returns_author_summary() {
    let k = Kitchen::new();
    k.publish(&k.as_alice(), "Soup", &[k.lunch], &[(k.milk, 100)]);
    k.publish(&k.as_alice(), "Eggs", &[k.breakfast], &[(k.egg, 2)]);
    k.publish(&k.as_alice(), "Cake", &[k.dinner], &[(k.sugar, 2)]);

    let summary = SubscriptionService::new(&k.store)
        .subscribe(&k.as_bob(), k.alice.id, Some(2))
        .unwrap();

    assert_eq!(summary.user.username, "alice");
    assert!(summary.is_subscribed);
    assert_eq!(summary.recipes_count, 3);
    let names: Vec<_> = summary.recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Cake", "Eggs"]);
}

#[test]
fn test_duplicate_subscription_rejected() {
    let k = Kitchen::new();
    let service = SubscriptionService::new(&k.store);
    service.subscribe(&k.as_bob(), k.alice.id, None).unwrap();

    assert_eq!(
        service.subscribe(&k.as_bob(), k.alice.id, None),
        Err(CoreError::AlreadyExists(ALREADY_SUBSCRIBED))
    );
}

#[test]
fn test_self_subscription_rejected() {
    let k = Kitchen::new();
    let result = SubscriptionService::new(&k.store).subscribe(&k.as_alice(), k.alice.id, None);
    assert_eq!(
        result,
        Err(CoreError::Validation(ValidationError::SelfSubscription))
    );
}

#[test]
fn test_unknown_author_is_not_found() {
    let k = Kitchen::new();
    let service = SubscriptionService::new(&k.store);
    let ghost = uuid::Uuid::new_v4();

    assert!(matches!(
        service.subscribe(&k.as_bob(), ghost, None),
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        service.unsubscribe(&k.as_bob(), ghost),
        Err(CoreError::NotFound(_))
    ));
}

#[test]
fn test_unsubscribe_twice() {
    let k = Kitchen::new();
    let service = SubscriptionService::new(&k.store);
    service.subscribe(&k.as_bob(), k.alice.id, None).unwrap();

    service.unsubscribe(&k.as_bob(), k.alice.id).unwrap();
    assert!(matches!(
        service.unsubscribe(&k.as_bob(), k.alice.id),
        Err(CoreError::NotFound(_))
    ));
}

#[test]
fn test_subscriptions_list_followed_authors() {
    let k = Kitchen::new();
    let carol = k.store.add_user("carol");
    let service = SubscriptionService::new(&k.store);
    service.subscribe(&k.as_bob(), carol.id, None).unwrap();
    service.subscribe(&k.as_bob(), k.alice.id, None).unwrap();
    k.publish(&k.as_alice(), "Soup", &[k.lunch], &[(k.milk, 100)]);

    let authors = service
        .subscriptions(&k.as_bob(), None, None, None)
        .unwrap();

    let names: Vec<_> = authors.iter().map(|a| a.user.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "carol"]);
    assert_eq!(authors[0].recipes_count, 1);
    assert_eq!(authors[1].recipes_count, 0);

    assert_eq!(
        service.subscriptions(&CurrentUser::anonymous(), None, None, None),
        Err(CoreError::Unauthorized)
    );
}
