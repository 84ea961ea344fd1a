use serde::Serialize;

use crate::chapters::Chapter;
use crate::service::clustering::Cluster;

/// Something drawn along a media timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineEntry<M> {
    Chapter(Chapter),
    Cluster(Cluster<M>),
}

impl<M> TimelineEntry<M> {
    pub fn start(&self) -> f64 {
        match self {
            TimelineEntry::Chapter(chapter) => f64::from(chapter.start_sec),
            TimelineEntry::Cluster(cluster) => cluster.start(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TimelineEntry::Chapter(_) => 0,
            TimelineEntry::Cluster(_) => 1,
        }
    }
}

/// Interleave clusters with chapter markers by start time.
///
/// A chapter sorts before a cluster starting at the same second; otherwise input order is kept.
pub fn merge<M>(clusters: Vec<Cluster<M>>, chapters: Vec<Chapter>) -> Vec<TimelineEntry<M>> {
    let mut entries: Vec<TimelineEntry<M>> = chapters
        .into_iter()
        .map(TimelineEntry::Chapter)
        .chain(clusters.into_iter().map(TimelineEntry::Cluster))
        .collect();

    entries.sort_by(|a, b| a.start().total_cmp(&b.start()).then(a.rank().cmp(&b.rank())));
    entries
}
