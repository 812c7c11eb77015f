mod common;

use common::TestStack;
use studium::application_port::SocialError;
use studium::domain_model::{RelationStatus, SocialEvent};

#[tokio::test]
async fn accept_creates_symmetric_accepted_edges() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.accept(bob, alice).await.unwrap();

    let of_alice = stack.friends.list_friends(alice).await.unwrap();
    assert_eq!(of_alice.len(), 1);
    assert_eq!(of_alice[0].object, bob);
    assert_eq!(of_alice[0].status, RelationStatus::Accepted);

    let of_bob = stack.friends.list_friends(bob).await.unwrap();
    assert_eq!(of_bob.len(), 1);
    assert_eq!(of_bob[0].object, alice);
    assert_eq!(of_bob[0].status, RelationStatus::Accepted);
}

#[tokio::test]
async fn self_request_is_rejected() {
    let stack = TestStack::new();
    let alice = stack.user("alice");

    let err = stack.friends.send_request(alice, alice).await.unwrap_err();
    assert!(matches!(err, SocialError::SelfRelationship));
}

#[tokio::test]
async fn duplicate_request_conflicts_in_both_directions() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    assert!(matches!(
        stack.friends.send_request(alice, bob).await.unwrap_err(),
        SocialError::RelationshipExists
    ));
    assert!(matches!(
        stack.friends.send_request(bob, alice).await.unwrap_err(),
        SocialError::RelationshipExists
    ));
}

#[tokio::test]
async fn block_wins_over_request_from_either_side() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.block(alice, bob).await.unwrap();

    assert!(matches!(
        stack.friends.send_request(bob, alice).await.unwrap_err(),
        SocialError::Blocked
    ));
    assert!(matches!(
        stack.friends.send_request(alice, bob).await.unwrap_err(),
        SocialError::Blocked
    ));
}

#[tokio::test]
async fn blocking_is_directional() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.block(alice, bob).await.unwrap();

    assert!(stack.friends.is_blocked(alice, bob).await.unwrap());
    assert!(!stack.friends.is_blocked(bob, alice).await.unwrap());
}

#[tokio::test]
async fn unblock_reopens_the_pair() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.block(alice, bob).await.unwrap();
    stack.friends.unblock(alice, bob).await.unwrap();
    assert!(!stack.friends.is_blocked(alice, bob).await.unwrap());

    stack.friends.send_request(bob, alice).await.unwrap();
    // unblock of a non-blocked pair stays a no-op
    stack.friends.unblock(alice, bob).await.unwrap();
    let edge = stack.friends.relation(bob, alice).await.unwrap().unwrap();
    assert_eq!(edge.status, RelationStatus::Pending);
}

#[tokio::test]
async fn accept_requires_an_incoming_pending_edge() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    assert!(matches!(
        stack.friends.accept(bob, alice).await.unwrap_err(),
        SocialError::RelationshipNotFound
    ));

    // the sender cannot accept their own request
    stack.friends.send_request(alice, bob).await.unwrap();
    assert!(matches!(
        stack.friends.accept(alice, bob).await.unwrap_err(),
        SocialError::RelationshipNotFound
    ));
}

#[tokio::test]
async fn deny_is_idempotent() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.deny(bob, alice).await.unwrap();
    stack.friends.deny(bob, alice).await.unwrap();

    let edge = stack.friends.relation(alice, bob).await.unwrap().unwrap();
    assert_eq!(edge.status, RelationStatus::Denied);

    // denied is not pending anymore, so accept no longer applies
    assert!(matches!(
        stack.friends.accept(bob, alice).await.unwrap_err(),
        SocialError::RelationshipNotFound
    ));
}

#[tokio::test]
async fn deny_does_not_apply_to_an_accepted_pair() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.accept(bob, alice).await.unwrap();

    // an accepted pair is dissolved via remove, not deny
    assert!(matches!(
        stack.friends.deny(bob, alice).await.unwrap_err(),
        SocialError::RelationshipNotFound
    ));

    // both directions stay accepted and symmetric
    let forward = stack.friends.relation(alice, bob).await.unwrap().unwrap();
    let backward = stack.friends.relation(bob, alice).await.unwrap().unwrap();
    assert_eq!(forward.status, RelationStatus::Accepted);
    assert_eq!(backward.status, RelationStatus::Accepted);
}

#[tokio::test]
async fn accept_refuses_when_the_acceptor_blocked_the_sender() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(bob, alice).await.unwrap();
    stack.friends.block(alice, bob).await.unwrap();

    // only unblock exits BLOCKED; accepting must not overwrite it
    assert!(matches!(
        stack.friends.accept(alice, bob).await.unwrap_err(),
        SocialError::Blocked
    ));
    assert!(stack.friends.is_blocked(alice, bob).await.unwrap());
    let incoming = stack.friends.relation(bob, alice).await.unwrap().unwrap();
    assert_eq!(incoming.status, RelationStatus::Pending);
}

#[tokio::test]
async fn remove_unfriends_both_directions_and_is_idempotent() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.accept(bob, alice).await.unwrap();

    stack.friends.remove(alice, bob).await.unwrap();
    assert!(stack.friends.list_friends(alice).await.unwrap().is_empty());
    assert!(stack.friends.list_friends(bob).await.unwrap().is_empty());

    stack.friends.remove(alice, bob).await.unwrap();
}

#[tokio::test]
async fn remove_leaves_blocked_edges_in_place() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.accept(bob, alice).await.unwrap();
    stack.friends.block(alice, bob).await.unwrap();

    // unfriend initiated by either side keeps the block
    stack.friends.remove(bob, alice).await.unwrap();
    assert!(stack.friends.is_blocked(alice, bob).await.unwrap());
    assert!(stack.friends.relation(bob, alice).await.unwrap().is_none());
}

#[tokio::test]
async fn block_supersedes_an_accepted_edge() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.accept(bob, alice).await.unwrap();
    stack.friends.block(alice, bob).await.unwrap();

    assert!(stack.friends.is_blocked(alice, bob).await.unwrap());
    // the reverse edge is untouched
    let reverse = stack.friends.relation(bob, alice).await.unwrap().unwrap();
    assert_eq!(reverse.status, RelationStatus::Accepted);
}

#[tokio::test]
async fn list_friends_orders_by_status_then_counterpart() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");
    let carol = stack.user("carol");
    let dave = stack.user("dave");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.accept(bob, alice).await.unwrap();
    stack.friends.send_request(alice, carol).await.unwrap();
    stack.friends.block(alice, dave).await.unwrap();

    let edges = stack.friends.list_friends(alice).await.unwrap();
    let statuses: Vec<RelationStatus> = edges.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            RelationStatus::Pending,
            RelationStatus::Accepted,
            RelationStatus::Blocked
        ]
    );
}

#[tokio::test]
async fn request_and_accept_notify_the_counterpart() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.friends.send_request(alice, bob).await.unwrap();
    stack.friends.accept(bob, alice).await.unwrap();
    stack.drain_outbox().await;

    let to_bob = stack.notifier.delivered_to(bob);
    assert!(to_bob.iter().any(|e| matches!(
        e,
        SocialEvent::FriendRequestNew(p) if p.from == alice && p.username == "alice"
    )));

    let to_alice = stack.notifier.delivered_to(alice);
    assert!(to_alice.iter().any(|e| matches!(
        e,
        SocialEvent::FriendRequestAccepted(p) if p.by == bob
    )));
}

#[tokio::test]
async fn failed_delivery_is_rescheduled_not_lost() {
    let stack = TestStack::new();
    let alice = stack.user("alice");
    let bob = stack.user("bob");

    stack.notifier.set_failing(true);
    // the mutation itself succeeds regardless of the notifier
    stack.friends.send_request(alice, bob).await.unwrap();

    stack.tick_outbox().await;
    let pending = stack.outbox.undelivered_ids();
    assert_eq!(pending.len(), 1);
    // the failure reason is recorded alongside the reschedule
    assert!(stack.outbox.last_error_of(pending[0]).is_some());
    assert!(stack.notifier.delivered().is_empty());

    stack.notifier.set_failing(false);
    stack.drain_outbox().await;
    assert_eq!(stack.outbox.undelivered_count(), 0);
    assert_eq!(stack.notifier.delivered_to(bob).len(), 1);
}
