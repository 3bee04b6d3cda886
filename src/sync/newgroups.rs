//! `fetchNewsgroupsList`: ask a peer for groups new to us and mirror
//! their admission locally.

use chrono::{DateTime, Utc};

use crate::capabilities::{PersistenceService, PolicyService};
use crate::codec;
use crate::domain::{NewsgroupName, Peer, PostingMode};

use super::cache::PeerConnection;

pub(super) fn format_since(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap())
        .format("%Y%m%d %H%M%S GMT")
        .to_string()
}

struct AdvertisedGroup {
    name: NewsgroupName,
    high: i64,
    low: i64,
    mode: PostingMode,
}

fn parse_advertised_line(line: &str) -> Option<AdvertisedGroup> {
    let mut parts = line.split_whitespace();
    let name = NewsgroupName::new(parts.next()?).ok()?;
    let high: i64 = parts.next()?.parse().ok()?;
    let low: i64 = parts.next()?.parse().ok()?;
    let status = parts.next()?;
    Some(AdvertisedGroup { name, high, low, mode: PostingMode::from_wire(status) })
}

/// Ask `conn` (an outbound connection already established to `peer`) for
/// groups new to us since its `list_last_fetched` (or epoch), admit each
/// through Policy, create it locally either way, and ensure `peer`
/// appears exactly once in its feed list. Returns the (possibly advanced)
/// `Peer` record for the caller to persist.
///
/// # Errors
/// Propagates transport and persistence failures.
pub async fn fetch_newsgroups_list(
    conn: &mut PeerConnection,
    peer: &Peer,
    persistence: &dyn PersistenceService,
    policy: &dyn PolicyService,
    now_ts: i64,
) -> anyhow::Result<Peer> {
    let since = peer.list_last_fetched.unwrap_or(0);
    let command_line = format!("NEWGROUPS {}", format_since(since));
    codec::write_line(&mut conn.writer, &command_line).await?;

    let status = codec::read_line(&mut conn.reader).await?;
    let resp = codec::parse_response_line(&status)?;
    if resp.code != crate::responses::NEWGROUPS_FOLLOWS {
        anyhow::bail!("peer {} refused NEWGROUPS: {status}", peer.label);
    }
    let lines = codec::read_dot_terminated(&mut conn.reader).await?;

    for line in &lines {
        let Some(advertised) = parse_advertised_line(line) else { continue };
        let est = u64::try_from((advertised.high - advertised.low).max(0)).unwrap_or(0);

        let existing = persistence.get_group_by_name(&advertised.name).await?;
        if existing.is_none() {
            let allowed = policy
                .is_newsgroup_allowed(&advertised.name, advertised.mode, est, &peer.address)
                .await?;
            persistence
                .add_group(
                    advertised.name.clone(),
                    String::new(),
                    advertised.mode,
                    now_ts,
                    peer.label.clone(),
                    !allowed,
                )
                .await?;
        }

        let feeds = persistence.get_feeds(&advertised.name).await?;
        if !feeds.iter().any(|p| p.address == peer.address) {
            let _ = persistence.add_feed(&advertised.name, peer.clone()).await;
        }
    }

    let mut updated = peer.clone();
    updated.advance_list_last_fetched(now_ts);
    persistence.update_peer(updated.clone()).await?;
    Ok(updated)
}
