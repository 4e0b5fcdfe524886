//! Cross-reference resolution.
//!
//! Listings embed `{<target>Id, distance, unit}` tuples pointing at other
//! listings. Resolution pairs each tuple with a summary of its target, drops
//! tuples whose target is missing or not active, and orders the result by
//! distance (absent distances last, ties in input order).

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::db::models::{EntityKind, NearbyLink, PublishStatus, Summary};
use crate::db::sections::NearbyRef;
use crate::db::store::Store;
use crate::error::AppResult;

/// The summary half of a resolved entry, keyed by the target's kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Linked {
    Destination(Summary),
    Hotel(Summary),
    Restaurant(Summary),
}

impl Linked {
    fn new(kind: EntityKind, summary: Summary) -> Self {
        match kind {
            EntityKind::Destination => Linked::Destination(summary),
            EntityKind::Hotel => Linked::Hotel(summary),
            EntityKind::Restaurant => Linked::Restaurant(summary),
        }
    }

    pub fn summary(&self) -> &Summary {
        match self {
            Linked::Destination(s) | Linked::Hotel(s) | Linked::Restaurant(s) => s,
        }
    }
}

/// A reference tuple plus the row it points at, serialized flat:
/// `{hotelId, distance, unit, hotel: {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<R> {
    #[serde(flatten)]
    pub reference: R,
    #[serde(flatten)]
    pub target: Linked,
}

fn by_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Pure join of reference tuples against already-fetched target summaries.
pub fn join<R: NearbyRef>(refs: &[R], targets: &[Summary]) -> Vec<Resolved<R>> {
    let active: HashMap<i64, &Summary> = targets
        .iter()
        .filter(|s| s.status == PublishStatus::Active)
        .map(|s| (s.id, s))
        .collect();

    let mut resolved: Vec<Resolved<R>> = refs
        .iter()
        .filter_map(|reference| {
            let summary = active.get(&reference.target_id()?)?;
            Some(Resolved {
                reference: reference.clone(),
                target: Linked::new(R::TARGET, (*summary).clone()),
            })
        })
        .collect();

    // sort_by is stable, so equal distances keep input order
    resolved.sort_by(|a, b| by_distance(a.reference.distance(), b.reference.distance()));
    resolved
}

/// Resolve a stored reference list against the store.
pub async fn resolve<R: NearbyRef>(store: &dyn Store, refs: &[R]) -> AppResult<Vec<Resolved<R>>> {
    let mut ids: Vec<i64> = refs.iter().filter_map(|r| r.target_id()).collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let targets = store.summaries(R::TARGET, &ids).await?;
    Ok(join(refs, &targets))
}

/// Listings of kind `R::TARGET` whose own reference lists point at
/// `(target_kind, target_id)`, e.g. hotels near a destination.
pub async fn reverse<R: NearbyRef>(
    store: &dyn Store,
    target_kind: EntityKind,
    target_id: i64,
) -> AppResult<Vec<Resolved<R>>> {
    let links = store.links_to(target_kind, target_id, R::TARGET).await?;
    let refs: Vec<R> = links
        .into_iter()
        .map(|link| R::from_parts(link.source_id, link.distance, link.unit))
        .collect();
    resolve(store, &refs).await
}

/// Association rows mirroring a source's reference list.
pub fn links_for<R: NearbyRef>(
    source_kind: EntityKind,
    source_id: i64,
    refs: &[R],
) -> Vec<NearbyLink> {
    refs.iter()
        .filter_map(|reference| {
            Some(NearbyLink {
                source_kind,
                source_id,
                target_kind: R::TARGET,
                target_id: reference.target_id()?,
                distance: reference.distance(),
                unit: reference.unit().to_string(),
            })
        })
        .collect()
}

/// Rewrites the association rows owned by a source after a write.
pub async fn sync_links<R: NearbyRef>(
    store: &dyn Store,
    source_kind: EntityKind,
    source_id: i64,
    refs: &[R],
) -> AppResult<()> {
    let links = links_for(source_kind, source_id, refs);
    store.replace_links(source_kind, source_id, &links).await
}
