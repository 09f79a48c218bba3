//! Friendship lifecycle and derived-set behaviour, on every backend

#[macro_use]
mod common;

use amity_core::{Direction, FriendshipStatus, Pagination, RecordingSink};
use amity_engine::{FriendshipEngine, RequestFilter};
use amity_storage::FriendshipStore;
use common::{user, users};
use std::sync::Arc;

on_each_backend!(
    user_can_send_a_friend_request,
    pending_request_is_not_duplicated,
    request_can_be_resent_after_deny,
    accepting_makes_both_sides_friends,
    not_friends_until_accepted,
    request_is_visible_to_recipient_only,
    sender_cannot_accept_own_request,
    user_can_deny_a_friend_request,
    answered_request_stays_answered,
    user_can_block_another_user,
    user_can_unblock_a_blocked_user,
    befriending_a_blocked_user_lifts_the_block,
    blocked_user_cannot_befriend_blocker,
    block_replaces_friendship,
    block_keeps_the_other_sides_block,
    unfriend_removes_every_edge,
    get_friendship_prefers_live_edge,
    status_accessors,
    friends_count_and_friends,
    friends_are_paginated,
    pages_past_the_end_are_empty,
    friends_of_friends,
    mutual_friends,
    incoming_and_outgoing_requests,
);

async fn user_can_send_a_friend_request<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    let sent = engine.befriend(&sender, &recipient).await.unwrap().unwrap();
    assert_eq!(sent.status, FriendshipStatus::Pending);
    assert_eq!(sent.sender, sender);

    assert_eq!(engine.get_friend_requests(&recipient).await.unwrap().len(), 1);
}

async fn pending_request_is_not_duplicated<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    assert!(engine.befriend(&sender, &recipient).await.unwrap().is_some());
    assert!(engine.befriend(&sender, &recipient).await.unwrap().is_none());
    assert!(engine.befriend(&recipient, &sender).await.unwrap().is_none());

    assert_eq!(engine.get_friend_requests(&recipient).await.unwrap().len(), 1);
    assert_eq!(engine.get_all_friendships(&sender).await.unwrap().len(), 1);
}

async fn request_can_be_resent_after_deny<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.befriend(&sender, &recipient).await.unwrap();
    assert!(engine.deny_friend_request(&recipient, &sender).await.unwrap());

    let resent = engine.befriend(&sender, &recipient).await.unwrap();
    assert!(resent.is_some());

    assert_eq!(engine.get_friend_requests(&recipient).await.unwrap().len(), 1);
    // the denied edge is kept alongside the new one
    assert_eq!(engine.get_denied_friendships(&sender).await.unwrap().len(), 1);
}

async fn accepting_makes_both_sides_friends<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.befriend(&sender, &recipient).await.unwrap();
    assert!(engine.accept_friend_request(&recipient, &sender).await.unwrap());

    assert!(engine.is_friend_with(&recipient, &sender).await.unwrap());
    assert!(engine.is_friend_with(&sender, &recipient).await.unwrap());
    assert!(engine.get_friend_requests(&recipient).await.unwrap().is_empty());

    // already answered
    assert!(!engine.accept_friend_request(&recipient, &sender).await.unwrap());
    assert!(!engine.deny_friend_request(&recipient, &sender).await.unwrap());
}

async fn not_friends_until_accepted<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.befriend(&sender, &recipient).await.unwrap();

    assert!(!engine.is_friend_with(&recipient, &sender).await.unwrap());
    assert!(!engine.is_friend_with(&sender, &recipient).await.unwrap());
}

async fn request_is_visible_to_recipient_only<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.befriend(&sender, &recipient).await.unwrap();
    assert!(engine.has_friend_request_from(&recipient, &sender).await.unwrap());
    assert!(!engine.has_friend_request_from(&sender, &recipient).await.unwrap());

    engine.accept_friend_request(&recipient, &sender).await.unwrap();
    assert!(!engine.has_friend_request_from(&recipient, &sender).await.unwrap());
    assert!(!engine.has_friend_request_from(&sender, &recipient).await.unwrap());
}

async fn sender_cannot_accept_own_request<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.befriend(&sender, &recipient).await.unwrap();
    assert!(!engine.accept_friend_request(&sender, &recipient).await.unwrap());

    assert!(!engine.is_friend_with(&recipient, &sender).await.unwrap());
    assert!(engine.has_friend_request_from(&recipient, &sender).await.unwrap());
}

async fn user_can_deny_a_friend_request<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.befriend(&sender, &recipient).await.unwrap();
    assert!(engine.deny_friend_request(&recipient, &sender).await.unwrap());

    assert!(!engine.is_friend_with(&recipient, &sender).await.unwrap());
    assert!(engine.get_friend_requests(&recipient).await.unwrap().is_empty());
    assert_eq!(engine.get_denied_friendships(&sender).await.unwrap().len(), 1);
}

async fn answered_request_stays_answered<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    events: Arc<RecordingSink>,
) {
    let (sender, recipient, other) = (user(1), user(2), user(3));

    engine.befriend(&sender, &recipient).await.unwrap();
    assert!(engine.deny_friend_request(&recipient, &sender).await.unwrap());
    assert!(!engine.accept_friend_request(&recipient, &sender).await.unwrap());
    assert!(!engine.deny_friend_request(&recipient, &sender).await.unwrap());
    assert_eq!(engine.get_denied_friendships(&sender).await.unwrap().len(), 1);

    engine.befriend(&other, &recipient).await.unwrap();
    assert!(engine.accept_friend_request(&recipient, &other).await.unwrap());
    assert!(!engine.deny_friend_request(&recipient, &other).await.unwrap());
    assert!(engine.is_friend_with(&recipient, &other).await.unwrap());

    assert_eq!(events.events().len(), 4);
}

async fn user_can_block_another_user<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    let block = engine.block_friend(&sender, &recipient).await.unwrap();
    assert_eq!(block.status, FriendshipStatus::Blocked);

    assert!(engine.is_blocked_by(&recipient, &sender).await.unwrap());
    assert!(engine.has_blocked(&sender, &recipient).await.unwrap());
    assert!(!engine.is_blocked_by(&sender, &recipient).await.unwrap());
    assert!(!engine.has_blocked(&recipient, &sender).await.unwrap());
}

async fn user_can_unblock_a_blocked_user<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.block_friend(&sender, &recipient).await.unwrap();
    assert!(engine.unblock_friend(&sender, &recipient).await.unwrap());
    assert!(!engine.unblock_friend(&sender, &recipient).await.unwrap());

    assert!(!engine.is_blocked_by(&recipient, &sender).await.unwrap());
    assert!(!engine.has_blocked(&sender, &recipient).await.unwrap());
}

async fn befriending_a_blocked_user_lifts_the_block<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (sender, recipient) = (user(1), user(2));

    engine.block_friend(&sender, &recipient).await.unwrap();
    engine.befriend(&sender, &recipient).await.unwrap();
    engine.befriend(&sender, &recipient).await.unwrap();

    assert_eq!(engine.get_friend_requests(&recipient).await.unwrap().len(), 1);
    assert!(!engine.has_blocked(&sender, &recipient).await.unwrap());
    assert_eq!(engine.get_all_friendships(&sender).await.unwrap().len(), 1);
}

async fn blocked_user_cannot_befriend_blocker<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (blocker, blocked) = (user(1), user(2));

    engine.block_friend(&blocker, &blocked).await.unwrap();

    assert!(!engine.can_befriend(&blocked, &blocker).await.unwrap());
    assert!(engine.befriend(&blocked, &blocker).await.unwrap().is_none());
    assert!(engine.has_blocked(&blocker, &blocked).await.unwrap());
}

async fn block_replaces_friendship<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (a, b) = (user(1), user(2));

    engine.befriend(&a, &b).await.unwrap();
    engine.accept_friend_request(&b, &a).await.unwrap();

    engine.block_friend(&b, &a).await.unwrap();

    assert!(!engine.is_friend_with(&a, &b).await.unwrap());
    let all = engine.get_all_friendships(&a).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, FriendshipStatus::Blocked);
    assert_eq!(all[0].sender, b);
}

async fn block_keeps_the_other_sides_block<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (a, b) = (user(1), user(2));

    engine.block_friend(&a, &b).await.unwrap();
    engine.block_friend(&b, &a).await.unwrap();
    // blocking again replaces the own block only
    engine.block_friend(&a, &b).await.unwrap();

    assert!(engine.has_blocked(&a, &b).await.unwrap());
    assert!(engine.has_blocked(&b, &a).await.unwrap());
    assert_eq!(engine.get_blocked_friendships(&a).await.unwrap().len(), 2);
}

async fn unfriend_removes_every_edge<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (a, b) = (user(1), user(2));

    engine.befriend(&a, &b).await.unwrap();
    engine.deny_friend_request(&b, &a).await.unwrap();
    engine.befriend(&a, &b).await.unwrap();
    engine.accept_friend_request(&b, &a).await.unwrap();

    assert!(engine.unfriend(&b, &a).await.unwrap());
    assert!(engine.get_all_friendships(&a).await.unwrap().is_empty());
    assert!(!engine.unfriend(&b, &a).await.unwrap());
}

async fn get_friendship_prefers_live_edge<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (a, b) = (user(1), user(2));
    assert!(engine.get_friendship(&a, &b).await.unwrap().is_none());

    engine.befriend(&a, &b).await.unwrap();
    engine.deny_friend_request(&b, &a).await.unwrap();
    let denied = engine.get_friendship(&b, &a).await.unwrap().unwrap();
    assert_eq!(denied.status, FriendshipStatus::Denied);

    engine.befriend(&a, &b).await.unwrap();
    let live = engine.get_friendship(&b, &a).await.unwrap().unwrap();
    assert_eq!(live.status, FriendshipStatus::Pending);
}

async fn status_accessors<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let sender = user(1);
    let recipients = users(2, 4);

    for recipient in &recipients {
        engine.befriend(&sender, recipient).await.unwrap();
    }

    engine.accept_friend_request(&recipients[0], &sender).await.unwrap();
    engine.accept_friend_request(&recipients[1], &sender).await.unwrap();
    engine.deny_friend_request(&recipients[2], &sender).await.unwrap();

    assert_eq!(engine.get_all_friendships(&sender).await.unwrap().len(), 4);
    assert_eq!(engine.get_accepted_friendships(&sender).await.unwrap().len(), 2);
    assert_eq!(engine.get_accepted_friendships(&recipients[0]).await.unwrap().len(), 1);
    assert_eq!(engine.get_pending_friendships(&sender).await.unwrap().len(), 1);
    assert_eq!(engine.get_denied_friendships(&sender).await.unwrap().len(), 1);
    assert!(engine.get_blocked_friendships(&sender).await.unwrap().is_empty());

    engine.block_friend(&recipients[3], &sender).await.unwrap();
    assert_eq!(engine.get_blocked_friendships(&sender).await.unwrap().len(), 1);
    assert!(engine.get_pending_friendships(&sender).await.unwrap().is_empty());
}

async fn friends_count_and_friends<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let sender = user(1);
    let recipients = users(2, 4);

    for recipient in &recipients {
        engine.befriend(&sender, recipient).await.unwrap();
    }

    engine.accept_friend_request(&recipients[0], &sender).await.unwrap();
    engine.accept_friend_request(&recipients[1], &sender).await.unwrap();
    engine.deny_friend_request(&recipients[2], &sender).await.unwrap();

    assert_eq!(engine.get_friends_count(&sender).await.unwrap(), 2);
    assert_eq!(
        engine.get_friends(&sender, None).await.unwrap(),
        vec![recipients[0].clone(), recipients[1].clone()]
    );
    assert_eq!(engine.get_friends(&recipients[1], None).await.unwrap(), vec![sender.clone()]);
    assert!(engine.get_friends(&recipients[2], None).await.unwrap().is_empty());
    assert!(engine.get_friends(&recipients[3], None).await.unwrap().is_empty());
}

async fn friends_are_paginated<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let sender = user(1);
    let recipients = users(2, 6);

    for recipient in &recipients {
        engine.befriend(&sender, recipient).await.unwrap();
    }
    for i in [0, 1, 3, 4] {
        engine.accept_friend_request(&recipients[i], &sender).await.unwrap();
    }
    engine.deny_friend_request(&recipients[2], &sender).await.unwrap();

    let page = |per_page| Pagination::new(0, per_page);

    let two = engine.get_friends_page(&sender, None, page(2)).await.unwrap();
    assert_eq!(two.data.len(), 2);
    assert_eq!(two.pagination.total_count, 4);
    assert_eq!(two.pagination.total_pages, 2);
    assert!(two.pagination.has_next_page);

    assert_eq!(engine.get_friends_page(&sender, None, page(0)).await.unwrap().data.len(), 4);
    assert_eq!(engine.get_friends_page(&sender, None, page(10)).await.unwrap().data.len(), 4);

    let second = engine
        .get_friends_page(&sender, None, Pagination::new(1, 3))
        .await
        .unwrap();
    assert_eq!(second.data, vec![recipients[4].clone()]);

    assert!(engine
        .get_friends_page(&recipients[5], None, page(2))
        .await
        .unwrap()
        .data
        .is_empty());
}

async fn pages_past_the_end_are_empty<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let sender = user(1);
    let recipients = users(2, 3);
    for recipient in &recipients {
        engine.befriend(&sender, recipient).await.unwrap();
        engine.accept_friend_request(recipient, &sender).await.unwrap();
    }

    let friends = engine
        .get_friends_page(&sender, None, Pagination::new(usize::MAX, 2))
        .await
        .unwrap();
    assert!(friends.data.is_empty());
    assert_eq!(friends.pagination.total_count, 3);
    assert!(!friends.pagination.has_next_page);

    let requests = engine
        .requests(
            &sender,
            &RequestFilter::new().paginate(Pagination::new(usize::MAX / 2 + 1, 2)),
        )
        .await
        .unwrap();
    assert!(requests.data.is_empty());
    assert_eq!(requests.pagination.total_count, 3);
}

async fn friends_of_friends<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let sender = user(1);
    let recipients = users(2, 2);
    let fofs = users(10, 5);
    let chunks = [&fofs[..3], &fofs[3..]];

    for (recipient, chunk) in recipients.iter().zip(chunks) {
        engine.befriend(&sender, recipient).await.unwrap();
        engine.accept_friend_request(recipient, &sender).await.unwrap();

        for fof in chunk {
            engine.befriend(recipient, fof).await.unwrap();
            engine.accept_friend_request(fof, recipient).await.unwrap();
        }
    }

    assert_eq!(engine.get_friends(&sender, None).await.unwrap().len(), 2);
    assert_eq!(engine.get_friends(&recipients[0], None).await.unwrap().len(), 4);
    assert_eq!(engine.get_friends(&recipients[1], None).await.unwrap().len(), 3);

    let result = engine.get_friends_of_friends(&sender).await.unwrap();
    assert_eq!(result, fofs);
    assert!(!result.contains(&sender));

    // a direct friend who is also a friend's friend is not counted
    engine.befriend(&recipients[0], &recipients[1]).await.unwrap();
    engine.accept_friend_request(&recipients[1], &recipients[0]).await.unwrap();
    assert_eq!(engine.get_friends_of_friends(&sender).await.unwrap().len(), 5);

    let page = engine
        .get_friends_of_friends_page(&sender, Pagination::new(0, 2))
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.total_count, 5);

    assert!(engine.get_friends_of_friends(&user(99)).await.unwrap().is_empty());
}

async fn mutual_friends<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let (a, b) = (user(1), user(2));
    let shared = users(10, 3);
    let only_a = user(20);

    for friend in shared.iter().chain(std::iter::once(&only_a)) {
        engine.befriend(&a, friend).await.unwrap();
        engine.accept_friend_request(friend, &a).await.unwrap();
    }
    for friend in &shared {
        engine.befriend(friend, &b).await.unwrap();
        engine.accept_friend_request(&b, friend).await.unwrap();
    }
    engine.befriend(&a, &b).await.unwrap();
    engine.accept_friend_request(&b, &a).await.unwrap();

    let mutual = engine.get_mutual_friends(&a, &b).await.unwrap();
    assert_eq!(mutual, shared);
    assert_eq!(engine.get_mutual_friends_count(&b, &a).await.unwrap(), 3);

    let page = engine
        .get_mutual_friends_page(&a, &b, Pagination::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.data, vec![shared[2].clone()]);
}

async fn incoming_and_outgoing_requests<S: FriendshipStore>(
    engine: FriendshipEngine<S>,
    _events: Arc<RecordingSink>,
) {
    let me = user(1);
    let others = users(2, 4);

    engine.befriend(&me, &others[0]).await.unwrap();
    engine.befriend(&me, &others[1]).await.unwrap();
    engine.befriend(&others[2], &me).await.unwrap();
    engine.befriend(&others[3], &me).await.unwrap();
    engine.accept_friend_request(&me, &others[3]).await.unwrap();

    let outgoing = RequestFilter::new().direction(Direction::Outgoing);
    assert_eq!(engine.requests(&me, &outgoing).await.unwrap().data.len(), 2);

    let incoming_pending = RequestFilter::new()
        .direction(Direction::Incoming)
        .status(FriendshipStatus::Pending);
    let page = engine.requests(&me, &incoming_pending).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].sender, others[2]);

    let all = engine.requests(&me, &RequestFilter::new()).await.unwrap();
    assert_eq!(all.pagination.total_count, 4);

    let accepted = RequestFilter::new()
        .status(FriendshipStatus::Accepted)
        .paginate(Pagination::new(0, 10));
    assert_eq!(engine.requests(&me, &accepted).await.unwrap().data.len(), 1);
}
