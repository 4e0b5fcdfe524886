//! Slug derivation and publish stamping, run before every listing write.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::db::models::{Destination, EntityKind, Hotel, PublishStatus, Restaurant};

lazy_static! {
    static ref SLUG_STRIP: Regex = Regex::new(r"[^A-Za-z0-9_\s-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Lowercase, drop punctuation, collapse whitespace runs into one hyphen.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lower, "");
    WHITESPACE.replace_all(&stripped, "-").into_owned()
}

/// A row with a derived slug and a publish lifecycle.
pub trait Publishable {
    const KIND: EntityKind;

    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn slug(&self) -> &str;
    fn set_slug(&mut self, slug: String);
    fn status(&self) -> PublishStatus;
    fn set_status(&mut self, status: PublishStatus);
    fn published_date(&self) -> Option<DateTime<Utc>>;
    fn set_published_date(&mut self, at: DateTime<Utc>);
    fn touch(&mut self, at: DateTime<Utc>);
}

macro_rules! publishable {
    ($($ty:ty => $kind:expr),+ $(,)?) => {
        $(impl Publishable for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> i64 {
                self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn slug(&self) -> &str {
                &self.slug
            }

            fn set_slug(&mut self, slug: String) {
                self.slug = slug;
            }

            fn status(&self) -> PublishStatus {
                self.status
            }

            fn set_status(&mut self, status: PublishStatus) {
                self.status = status;
            }

            fn published_date(&self) -> Option<DateTime<Utc>> {
                self.published_date
            }

            fn set_published_date(&mut self, at: DateTime<Utc>) {
                self.published_date = Some(at);
            }

            fn touch(&mut self, at: DateTime<Utc>) {
                self.updated_at = at;
            }
        })+
    };
}

publishable!(
    Destination => EntityKind::Destination,
    Hotel => EntityKind::Hotel,
    Restaurant => EntityKind::Restaurant,
);

/// Applies the slug and publish rules to `item`.
///
/// `previous` is the stored row for updates and `None` for inserts. The slug
/// is recomputed only when the name differs from the stored one, and the
/// publish date is stamped only on a transition into `active` when none is
/// set yet.
pub fn before_save<P: Publishable>(previous: Option<&P>, item: &mut P, now: DateTime<Utc>) {
    let name_changed = previous.map_or(true, |p| p.name() != item.name());
    if name_changed {
        item.set_slug(slugify(item.name()));
    }

    let was_active = previous.map_or(false, |p| p.status() == PublishStatus::Active);
    if item.status() == PublishStatus::Active && !was_active && item.published_date().is_none() {
        item.set_published_date(now);
    }

    item.touch(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::defaults;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Galle Fort"), "galle-fort");
        assert_eq!(slugify("Sigiriya: Lion Rock!"), "sigiriya-lion-rock");
        assert_eq!(slugify("  Nine   Arches\tBridge "), "-nine-arches-bridge-");
        assert_eq!(slugify("Mirissa_Beach - South"), "mirissa_beach---south");
        assert_eq!(slugify("Café Kandy"), "caf-kandy");
    }

    #[test]
    fn test_slug_recomputed_only_when_name_changes() {
        let now = Utc::now();
        let mut stored = defaults::blank_hotel(now);
        stored.name = "Old Name".into();
        before_save(None, &mut stored, now);
        assert_eq!(stored.slug, "old-name");

        let mut edited = stored.clone();
        edited.slug = "hand-edited".into();
        before_save(Some(&stored), &mut edited, now);
        assert_eq!(edited.slug, "hand-edited");

        let mut renamed = stored.clone();
        renamed.name = "New Name".into();
        before_save(Some(&stored), &mut renamed, now);
        assert_eq!(renamed.slug, "new-name");
    }

    #[test]
    fn test_publish_date_stamped_once() {
        let t0 = Utc::now();
        let mut draft = defaults::blank_destination(t0);
        draft.name = "Ella".into();
        before_save(None, &mut draft, t0);
        assert_eq!(draft.published_date, None);

        let t1 = t0 + chrono::Duration::minutes(1);
        let mut active = draft.clone();
        active.status = PublishStatus::Active;
        before_save(Some(&draft), &mut active, t1);
        assert_eq!(active.published_date, Some(t1));

        let t2 = t1 + chrono::Duration::minutes(1);
        let mut inactive = active.clone();
        inactive.status = PublishStatus::Inactive;
        before_save(Some(&active), &mut inactive, t2);
        assert_eq!(inactive.published_date, Some(t1));

        let t3 = t2 + chrono::Duration::minutes(1);
        let mut again = inactive.clone();
        again.status = PublishStatus::Active;
        before_save(Some(&inactive), &mut again, t3);
        assert_eq!(again.published_date, Some(t1));
        assert_eq!(again.updated_at, t3);
    }

    #[test]
    fn test_created_active_is_stamped() {
        let now = Utc::now();
        let mut restaurant = defaults::blank_restaurant(now);
        restaurant.name = "Ministry of Crab".into();
        restaurant.status = PublishStatus::Active;
        before_save(None, &mut restaurant, now);
        assert_eq!(restaurant.published_date, Some(now));
        assert_eq!(restaurant.slug, "ministry-of-crab");
    }
}
