//! Two-node sync convergence: A pulls an article only B has, then pushes an
//! article only A has, over a real wire-protocol connection driven by
//! `run_session` on the remote side and `sync_newsgroup` on the local side.

use nntp_node::capabilities::PersistenceService;
use nntp_node::domain::{ArticleHeaders, NewsgroupName, Peer, PostingMode};
use nntp_node::handlers::HandlerContext;
use nntp_node::session::Session;
use nntp_node::sync::{sync_newsgroup, PeerConnection};
use test_support::fakes::{InMemoryIdentity, InMemoryPersistence, InMemoryPolicy};

/// Serve one peer connection against `persistence` until the client side
/// closes the duplex, driving `run_session` to natural EOF termination.
async fn serve_peer(
    mut read_half: tokio::io::ReadHalf<tokio::io::DuplexStream>,
    mut write_half: tokio::io::WriteHalf<tokio::io::DuplexStream>,
    persistence: std::sync::Arc<InMemoryPersistence>,
) {
    let identity = InMemoryIdentity::new("peer.example");
    let policy = InMemoryPolicy::allow_all();
    let ctx = HandlerContext::new(persistence.as_ref(), &identity, &policy);
    let mut session = Session::new(PostingMode::Allowed);
    let mut reader = tokio::io::BufReader::new(&mut read_half);
    let _ = nntp_node::run_session(&mut reader, &mut write_half, &mut session, &ctx).await;
}

fn dial(peer_label: &str, persistence: std::sync::Arc<InMemoryPersistence>) -> (Peer, PeerConnection, tokio::task::JoinHandle<()>) {
    let (client_stream, server_stream) = tokio::io::duplex(8192);
    let (client_read, client_write) = tokio::io::split(client_stream);
    let (server_read, server_write) = tokio::io::split(server_stream);

    let handle = tokio::spawn(serve_peer(server_read, server_write, persistence));

    let mut peer = Peer::new(peer_label, format!("{peer_label}.example:119"));
    peer.capabilities = vec!["READER".to_string(), "NEWNEWS".to_string()];
    let conn = PeerConnection::new(Box::new(client_read), Box::new(client_write));
    (peer, conn, handle)
}

#[tokio::test]
async fn two_node_sync_converges_on_both_articles() {
    let group = NewsgroupName::new("comp.lang.rust").unwrap();

    let node_a = std::sync::Arc::new(InMemoryPersistence::new());
    let node_b = std::sync::Arc::new(InMemoryPersistence::new());
    node_a.seed_group(&group, PostingMode::Allowed, 0);
    node_b.seed_group(&group, PostingMode::Allowed, 0);

    // B already has <y@h>; A already has <z@h>. Neither has the other's.
    let mut headers_y = ArticleHeaders::new();
    headers_y.insert("Message-ID", "<y@h>");
    headers_y.insert("Newsgroups", "comp.lang.rust");
    node_b
        .add_article(&group, "<y@h>", headers_y, vec!["from b".to_string()], true)
        .await
        .unwrap();

    let mut headers_z = ArticleHeaders::new();
    headers_z.insert("Message-ID", "<z@h>");
    headers_z.insert("Newsgroups", "comp.lang.rust");
    node_a
        .add_article(&group, "<z@h>", headers_z, vec!["from a".to_string()], true)
        .await
        .unwrap();

    let policy = InMemoryPolicy::allow_all();
    let start_of_sync = 1_000;

    let (peer_b, conn_b, handle) = dial("node-b", node_b.clone());
    let mut feeds = vec![(peer_b, conn_b)];
    sync_newsgroup(&group, &mut feeds, node_a.as_ref(), &policy, start_of_sync)
        .await
        .unwrap();
    drop(feeds);
    let _ = handle.await;

    assert!(node_a.has_article("<y@h>").await.unwrap());
    assert!(node_b.has_article("<z@h>").await.unwrap());

    let a_sync_time = node_a.get_feed_sync_time(&group, "node-b").await.unwrap();
    assert!(a_sync_time >= start_of_sync);
}
