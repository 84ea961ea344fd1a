//! Grouping of moments into timeline clusters.
//!
//! Every moment lands in exactly one cluster, keyed by its explicit group or,
//! without one, by its own identity. Each cluster carries the full extent of
//! its moments and the "core" sub-range where the most of them overlap.

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::model::{GroupId, Moment, MomentId, TimeRange};

/// Anything that can be clustered: a time range with an identity and an optional group.
pub trait Span {
    fn id(&self) -> &MomentId;
    fn group_id(&self) -> Option<&GroupId>;
    fn range(&self) -> TimeRange;

    fn cluster_key(&self) -> ClusterKey {
        match self.group_id() {
            Some(group) => ClusterKey::Group(group.clone()),
            None => ClusterKey::Moment(self.id().clone()),
        }
    }
}

impl Span for Moment {
    fn id(&self) -> &MomentId {
        &self.id
    }

    fn group_id(&self) -> Option<&GroupId> {
        self.group_id.as_ref()
    }

    fn range(&self) -> TimeRange {
        Moment::range(self)
    }
}

impl<T: Span + ?Sized> Span for &T {
    fn id(&self) -> &MomentId {
        (**self).id()
    }

    fn group_id(&self) -> Option<&GroupId> {
        (**self).group_id()
    }

    fn range(&self) -> TimeRange {
        (**self).range()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ClusterKey {
    Group(GroupId),
    Moment(MomentId),
}

impl ClusterKey {
    pub fn cluster_id(&self) -> ClusterId {
        ClusterId(self.to_string())
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterKey::Group(id) => write!(f, "group:{id}"),
            ClusterKey::Moment(id) => write!(f, "moment:{id}"),
        }
    }
}

/// Stable identifier of a cluster. The prefix keeps group keys and moment ids apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(String);

impl ClusterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster<M> {
    pub id: ClusterId,
    pub key: ClusterKey,
    pub moments: Vec<M>,
    pub total_range: TimeRange,
    pub core_range: TimeRange,
}

impl<M> Cluster<M> {
    pub fn start(&self) -> f64 {
        self.total_range.start
    }

    pub fn len(&self) -> usize {
        self.moments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }
}

/// Group `moments` into clusters, in order of each key's first appearance.
pub fn cluster<M: Span + Clone>(moments: &[M]) -> Vec<Cluster<M>> {
    let mut index: HashMap<ClusterKey, usize> = HashMap::new();
    let mut groups: Vec<(ClusterKey, Vec<M>)> = Vec::new();

    for moment in moments {
        let key = moment.cluster_key();
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(moment.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![moment.clone()]));
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, moments)| {
            let ranges = moments.iter().map(Span::range).collect_vec();
            let total_range = total_range(&ranges)?;
            let core_range = core_range(&ranges)?;

            Some(Cluster {
                id: key.cluster_id(),
                key,
                moments,
                total_range,
                core_range,
            })
        })
        .collect()
}

/// The union bounding range, `None` when `ranges` is empty.
pub fn total_range(ranges: &[TimeRange]) -> Option<TimeRange> {
    let start = ranges.iter().map(|r| r.start).min_by(f64::total_cmp)?;
    let end = ranges.iter().map(|r| r.end).max_by(f64::total_cmp)?;

    Some(TimeRange::normalized(start, end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Edge {
    // starts sort before ends at the same instant: ranges are closed
    Start,
    End,
}

/// The earliest sub-range covered by the largest number of `ranges` at once.
///
/// Ranges are treated as closed, so `[0, 10]` and `[10, 20]` overlap at `10`.
pub fn core_range(ranges: &[TimeRange]) -> Option<TimeRange> {
    let events = ranges
        .iter()
        .map(|r| TimeRange::normalized(r.start, r.end))
        .flat_map(|r| [(r.start, Edge::Start), (r.end, Edge::End)])
        .sorted_by(|(a_time, a_edge), (b_time, b_edge)| {
            a_time.total_cmp(b_time).then(a_edge.cmp(b_edge))
        })
        .collect_vec();

    let mut depth = 0usize;
    let mut best_depth = 0usize;
    let mut best = None;

    for (i, &(time, edge)) in events.iter().enumerate() {
        match edge {
            Edge::End => depth = depth.saturating_sub(1),
            Edge::Start => {
                depth += 1;

                // a strictly deeper level replaces the best, ties keep the earlier region
                if depth > best_depth {
                    best_depth = depth;
                    // the next event is always present since every start has a matching end
                    let until = events.get(i + 1).map_or(time, |&(next, _)| next);
                    best = Some(TimeRange::normalized(time, until));
                }
            }
        }
    }

    best
}
