//! End-to-end Protocol Engine scenarios driven over an in-memory duplex,
//! against the `test_support` in-memory capability fakes.

use nntp_node::domain::{ArticleHeaders, NewsgroupName, PostingMode};
use nntp_node::handlers::HandlerContext;
use nntp_node::session::Session;
use test_support::fakes::{InMemoryIdentity, InMemoryPersistence, InMemoryPolicy};
use tokio::io::BufReader;

async fn run(
    input: &str,
    persistence: &InMemoryPersistence,
    identity: &InMemoryIdentity,
    policy: &InMemoryPolicy,
    posting_mode: PostingMode,
) -> String {
    let ctx = HandlerContext::new(persistence, identity, policy);
    let mut session = Session::new(posting_mode);
    let mut reader = BufReader::new(input.as_bytes());
    let mut writer = Vec::new();
    nntp_node::run_session(&mut reader, &mut writer, &mut session, &ctx)
        .await
        .unwrap();
    String::from_utf8(writer).unwrap()
}

#[tokio::test]
async fn handshake_and_quit() {
    let persistence = InMemoryPersistence::new();
    let identity = InMemoryIdentity::new("news.example");
    let policy = InMemoryPolicy::allow_all();
    let out = run("QUIT\r\n", &persistence, &identity, &policy, PostingMode::Allowed).await;
    let mut lines = out.split("\r\n");
    assert!(lines.next().unwrap().starts_with("200"));
    assert!(lines.next().unwrap().starts_with("205"));
}

#[tokio::test]
async fn group_then_article_by_number() {
    let persistence = InMemoryPersistence::new();
    let identity = InMemoryIdentity::new("news.example");
    let policy = InMemoryPolicy::allow_all();

    let name = NewsgroupName::new("test.nntp").unwrap();
    persistence.seed_group(&name, PostingMode::Allowed, 0);
    let mut headers = ArticleHeaders::new();
    headers.insert("Message-ID", "<a@h>");
    persistence
        .add_article(&name, "<a@h>", headers, vec!["Hello".to_string()], true)
        .await
        .unwrap();

    let out = run(
        "GROUP test.nntp\r\nARTICLE 1\r\nQUIT\r\n",
        &persistence,
        &identity,
        &policy,
        PostingMode::Allowed,
    )
    .await;

    let mut lines = out.split("\r\n");
    assert!(lines.next().unwrap().starts_with("200"));
    assert_eq!(lines.next().unwrap(), "211 1 1 1 test.nntp");
    assert!(lines.next().unwrap().starts_with("220 1 <a@h>"));
    assert!(lines.next().unwrap().starts_with("Message-ID:"));
    assert_eq!(lines.next().unwrap(), "");
    assert_eq!(lines.next().unwrap(), "Hello");
    assert_eq!(lines.next().unwrap(), ".");
    assert!(lines.next().unwrap().starts_with("205"));
}

#[tokio::test]
async fn unknown_group_is_411() {
    let persistence = InMemoryPersistence::new();
    let identity = InMemoryIdentity::new("news.example");
    let policy = InMemoryPolicy::allow_all();
    let out = run(
        "GROUP non.existent\r\nQUIT\r\n",
        &persistence,
        &identity,
        &policy,
        PostingMode::Allowed,
    )
    .await;
    assert!(out.contains("411"));
}

#[tokio::test]
async fn date_matches_fourteen_digit_format() {
    let persistence = InMemoryPersistence::new();
    let identity = InMemoryIdentity::new("news.example");
    let policy = InMemoryPolicy::allow_all();
    let out = run("DATE\r\nQUIT\r\n", &persistence, &identity, &policy, PostingMode::Allowed).await;
    let mut lines = out.split("\r\n");
    let _greeting = lines.next().unwrap();
    let date_line = lines.next().unwrap();
    assert!(date_line.starts_with("111 "));
    let stamp = date_line.strip_prefix("111 ").unwrap();
    assert_eq!(stamp.len(), 14);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn last_and_next_respect_bounds() {
    let persistence = InMemoryPersistence::new();
    let identity = InMemoryIdentity::new("news.example");
    let policy = InMemoryPolicy::allow_all();

    let name = NewsgroupName::new("test.nntp").unwrap();
    persistence.seed_group(&name, PostingMode::Allowed, 0);
    for n in 1..=3 {
        let mid = format!("<{n}@h>");
        let mut headers = ArticleHeaders::new();
        headers.insert("Message-ID", &mid);
        persistence.add_article(&name, &mid, headers, vec![], true).await.unwrap();
    }

    let out = run("GROUP test.nntp\r\nLAST\r\nQUIT\r\n", &persistence, &identity, &policy, PostingMode::Allowed)
        .await;
    let mut lines = out.split("\r\n");
    lines.next();
    lines.next();
    assert!(lines.next().unwrap().starts_with("422"));

    let out = run(
        "GROUP test.nntp\r\nNEXT\r\nNEXT\r\nNEXT\r\nQUIT\r\n",
        &persistence,
        &identity,
        &policy,
        PostingMode::Allowed,
    )
    .await;
    let mut lines = out.split("\r\n");
    lines.next();
    lines.next();
    assert!(lines.next().unwrap().starts_with("223 2"));
    assert!(lines.next().unwrap().starts_with("223 3"));
    assert!(lines.next().unwrap().starts_with("421"));
}

#[tokio::test]
async fn ihave_happy_path_then_duplicate_rejected() {
    let persistence = InMemoryPersistence::new();
    let identity = InMemoryIdentity::new("news.example");
    let policy = InMemoryPolicy::allow_all();

    let name = NewsgroupName::new("test.nntp").unwrap();
    persistence.seed_group(&name, PostingMode::Allowed, 0);

    let article = "IHAVE <x@h>\r\nMessage-ID: <x@h>\r\nNewsgroups: test.nntp\r\n\r\nBody line\r\n.\r\n";
    let out = run(&format!("{article}QUIT\r\n"), &persistence, &identity, &policy, PostingMode::Allowed).await;
    let mut lines = out.split("\r\n");
    lines.next();
    assert!(lines.next().unwrap().starts_with("335"));
    assert!(lines.next().unwrap().starts_with("235"));

    let out = run("IHAVE <x@h>\r\nQUIT\r\n", &persistence, &identity, &policy, PostingMode::Allowed).await;
    let mut lines = out.split("\r\n");
    lines.next();
    assert!(lines.next().unwrap().starts_with("435"));
}
