//! Graph analyses
//!
//! The traversal functions talk to a [`GraphStore`] synchronously; the
//! remaining functions are pure and work on what the traversals return.

use factline_domain::traits::{GraphStore, ServiceError};
use factline_domain::{Amplifier, BurstPoster, PatientZero, Posting, SpreadStats, TextCluster, TreeNode};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// Earliest post whose claim text contains `claim_text`, with its author
///
/// Candidates are ordered by `(created_at, post_id)`. A candidate without a
/// `POSTED` edge is skipped, since patient zero needs a user.
pub fn find_patient_zero(
    graph: &dyn GraphStore,
    claim_text: &str,
) -> Result<Option<PatientZero>, ServiceError> {
    let mut candidates = graph.posts_containing(claim_text)?;
    candidates.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.post_id.cmp(&b.post_id))
    });

    for post in candidates {
        match graph.author_of(&post.post_id)? {
            Some(user) => return Ok(Some(PatientZero { post, user })),
            None => warn!("post {} has no author, skipping", post.post_id),
        }
    }
    Ok(None)
}

/// Reshares reachable from `origin` within `depth_limit` hops, or all of
/// them when `depth_limit` is `None`
///
/// Breadth-first over `SHARED_FROM` in reverse, so each post gets its
/// shortest depth. The origin itself is not included. Cycles are cut by
/// visiting each post once. Ordered by `(depth, created_at, post_id)`.
pub fn traverse(
    graph: &dyn GraphStore,
    origin: &str,
    depth_limit: Option<usize>,
) -> Result<Vec<TreeNode>, ServiceError> {
    let mut visited: HashSet<String> = HashSet::from([origin.to_string()]);
    let mut frontier = vec![origin.to_string()];
    let mut nodes = Vec::new();
    let mut depth = 0;

    while !frontier.is_empty() && depth_limit.map_or(true, |limit| depth < limit) {
        depth += 1;
        let mut next = Vec::new();
        for post_id in &frontier {
            for reshare in graph.reshares_of(post_id)? {
                if !visited.insert(reshare.post_id.clone()) {
                    continue;
                }
                let user = graph.author_of(&reshare.post_id)?;
                next.push(reshare.post_id.clone());
                nodes.push(TreeNode { post: reshare, user, depth });
            }
        }
        frontier = next;
    }

    nodes.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.post.created_at.cmp(&b.post.created_at))
            .then_with(|| a.post.post_id.cmp(&b.post.post_id))
    });
    debug!("traversed {} reshares of {}", nodes.len(), origin);
    Ok(nodes)
}

/// High-follower users among reshares at depth `1..=max_depth`
///
/// One entry per user with their share count and shallowest depth, ordered
/// by followers descending then `user_id`, capped at `limit`.
pub fn amplifiers(
    tree: &[TreeNode],
    max_depth: usize,
    min_followers: u64,
    limit: usize,
) -> Vec<Amplifier> {
    let mut by_user: BTreeMap<&str, Amplifier> = BTreeMap::new();

    for node in tree.iter().filter(|n| n.depth <= max_depth) {
        let Some(user) = &node.user else { continue };
        if user.followers_count <= min_followers {
            continue;
        }
        by_user
            .entry(user.user_id.as_str())
            .and_modify(|a| {
                a.share_count += 1;
                a.min_depth = a.min_depth.min(node.depth);
            })
            .or_insert_with(|| Amplifier {
                user: user.clone(),
                share_count: 1,
                min_depth: node.depth,
            });
    }

    let mut found: Vec<Amplifier> = by_user.into_values().collect();
    found.sort_by(|a, b| {
        b.user
            .followers_count
            .cmp(&a.user.followers_count)
            .then_with(|| a.user.user_id.cmp(&b.user.user_id))
    });
    found.truncate(limit);
    found
}

/// Aggregate spread over a traversal
pub fn spread_stats(tree: &[TreeNode]) -> SpreadStats {
    let mut sharers: BTreeMap<&str, u64> = BTreeMap::new();
    for user in tree.iter().filter_map(|n| n.user.as_ref()) {
        sharers.insert(user.user_id.as_str(), user.followers_count);
    }

    SpreadStats {
        total_shares: tree.len(),
        unique_sharers: sharers.len(),
        total_reach: sharers.values().sum(),
        max_amplifier_followers: sharers.values().copied().max().unwrap_or(0),
    }
}

/// Users with more than `threshold` postings inside any window of `window_secs`
///
/// The window is half-open: postings at `t` and `t + window_secs` fall in
/// different windows. Ordered by peak descending then `user_id`.
pub fn burst_posters(
    postings: &[Posting],
    threshold: usize,
    window_secs: u64,
    limit: usize,
) -> Vec<BurstPoster> {
    let window_secs = window_secs.max(1);
    let mut by_user: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for posting in postings {
        by_user
            .entry(posting.user_id.as_str())
            .or_default()
            .push(posting.posted_at);
    }

    let mut found = Vec::new();
    for (user_id, mut times) in by_user {
        times.sort_unstable();

        let (mut left, mut peak, mut window_start) = (0, 0, 0);
        for right in 0..times.len() {
            while times[right] - times[left] >= window_secs {
                left += 1;
            }
            let count = right - left + 1;
            if count > peak {
                peak = count;
                window_start = times[left];
            }
        }

        if peak > threshold {
            found.push(BurstPoster {
                user_id: user_id.to_string(),
                peak_posts: peak,
                window_start,
            });
        }
    }

    found.sort_by(|a, b| {
        b.peak_posts
            .cmp(&a.peak_posts)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    found.truncate(limit);
    found
}

/// Texts posted verbatim by at least `min_users` distinct users
///
/// Ordered by distinct users descending then text, capped at `limit`.
/// Blank texts are ignored.
pub fn identical_text_clusters(
    postings: &[Posting],
    min_users: usize,
    limit: usize,
) -> Vec<TextCluster> {
    let mut by_text: BTreeMap<&str, (BTreeSet<&str>, usize)> = BTreeMap::new();
    for posting in postings.iter().filter(|p| !p.text.trim().is_empty()) {
        let entry = by_text.entry(posting.text.as_str()).or_default();
        entry.0.insert(posting.user_id.as_str());
        entry.1 += 1;
    }

    let mut found: Vec<TextCluster> = by_text
        .into_iter()
        .filter(|(_, (users, _))| users.len() >= min_users)
        .map(|(text, (users, post_count))| TextCluster {
            text: text.to_string(),
            user_ids: users.into_iter().map(str::to_string).collect(),
            post_count,
        })
        .collect();

    found.sort_by(|a, b| {
        b.user_ids
            .len()
            .cmp(&a.user_ids.len())
            .then_with(|| a.text.cmp(&b.text))
    });
    found.truncate(limit);
    found
}
