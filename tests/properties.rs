//! Property-style invariants from the testable-properties list: dot-stuffing
//! round-trip, header validation idempotence, generated message-id validity,
//! monotonic sync bookkeeping, and cross-group link fan-out.

use nntp_node::codec::{read_dot_terminated, write_dot_terminated};
use nntp_node::domain::{ArticleHeaders, MessageId, NewsgroupName, PostingMode};
use test_support::fakes::{InMemoryIdentity, InMemoryPersistence};
use tokio::io::BufReader;

#[tokio::test]
async fn dot_stuffing_round_trips_for_arbitrary_lines() {
    let samples: Vec<Vec<String>> = vec![
        vec!["plain".to_string()],
        vec![".leading".to_string(), "..double".to_string()],
        vec![String::new(), "after blank".to_string()],
        vec!["mixed .content here".to_string()],
    ];
    for lines in samples {
        let mut buf = Vec::new();
        write_dot_terminated(&mut buf, &lines).await.unwrap();
        let mut reader = BufReader::new(buf.as_slice());
        let read_back = read_dot_terminated(&mut reader).await.unwrap();
        assert_eq!(read_back, lines);
    }
}

#[test]
fn validate_all_is_idempotent_on_valid_headers() {
    let mut headers = ArticleHeaders::new();
    headers.insert("Message-ID", "<a@h>");
    headers.insert("Date", "01 Jan 2024 00:00:00 +0000");
    headers.insert("Lines", "3");
    assert!(headers.validate_all().is_ok());
    assert!(headers.validate_all().is_ok());
}

#[tokio::test]
async fn generated_message_ids_are_always_valid() {
    let identity = InMemoryIdentity::new("news.example");
    let headers = ArticleHeaders::new();
    for _ in 0..5 {
        let mid = identity.create_message_id(&headers).await.unwrap();
        assert!(MessageId::is_valid(mid.as_str()));
    }
}

#[tokio::test]
async fn feed_sync_time_advances_monotonically_and_never_regresses() {
    let persistence = InMemoryPersistence::new();
    let group = NewsgroupName::new("comp.lang.rust").unwrap();

    persistence.advance_feed_sync_time(&group, "alice", 100).await.unwrap();
    assert_eq!(persistence.get_feed_sync_time(&group, "alice").await.unwrap(), 100);

    persistence.advance_feed_sync_time(&group, "alice", 50).await.unwrap();
    assert_eq!(persistence.get_feed_sync_time(&group, "alice").await.unwrap(), 100);

    persistence.advance_feed_sync_time(&group, "alice", 200).await.unwrap();
    assert_eq!(persistence.get_feed_sync_time(&group, "alice").await.unwrap(), 200);
}

#[tokio::test]
async fn article_linked_in_two_local_groups_is_readable_via_both() {
    use nntp_node::capabilities::persistence::ArticleLocator;
    use nntp_node::capabilities::PersistenceService;

    let persistence = InMemoryPersistence::new();
    let g1 = NewsgroupName::new("comp.lang.rust").unwrap();
    let g2 = NewsgroupName::new("comp.lang.rust.announce").unwrap();
    persistence.seed_group(&g1, PostingMode::Allowed, 0);
    persistence.seed_group(&g2, PostingMode::Allowed, 0);

    let mut headers = ArticleHeaders::new();
    headers.insert("Message-ID", "<a@h>");
    headers.insert("Newsgroups", "comp.lang.rust, comp.lang.rust.announce");
    let number_in_g1 = persistence
        .add_article(&g1, "<a@h>", headers, vec!["body".to_string()], true)
        .await
        .unwrap();
    let number_in_g2 = persistence.include_article(&g2, "<a@h>").await.unwrap();

    let via_g1 = persistence
        .get_group_article(&g1, ArticleLocator::Number(number_in_g1))
        .await
        .unwrap()
        .unwrap();
    let via_g2_by_id = persistence
        .get_group_article(&g2, ArticleLocator::MessageId("<a@h>".to_string()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(via_g1.article.message_id.as_str(), "<a@h>");
    assert_eq!(via_g2_by_id.article_number, number_in_g2);
    assert_eq!(via_g2_by_id.article.message_id, via_g1.article.message_id);
}
