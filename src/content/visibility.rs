//! Who may see what: public callers only see published content, admins see
//! everything and may filter by any status.

use std::str::FromStr;

use crate::db::models::{PublishStatus, ReviewStatus, SlideStatus};
use crate::error::{AppError, AppResult};

/// A status column with one publicly visible value.
pub trait PublicStatus: FromStr<Err = String> + Copy + PartialEq {
    const PUBLIC: Self;
}

impl PublicStatus for PublishStatus {
    const PUBLIC: Self = PublishStatus::Active;
}

impl PublicStatus for ReviewStatus {
    const PUBLIC: Self = ReviewStatus::Approved;
}

impl PublicStatus for SlideStatus {
    const PUBLIC: Self = SlideStatus::Active;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Public,
    Admin,
}

impl Viewer {
    pub fn is_admin(self) -> bool {
        self == Viewer::Admin
    }

    /// Status filter for a listing query. Public callers are pinned to the
    /// public value and their `?status=` is ignored.
    pub fn status_filter<S: PublicStatus>(self, requested: Option<&str>) -> AppResult<Option<S>> {
        match self {
            Viewer::Public => Ok(Some(S::PUBLIC)),
            Viewer::Admin => match requested.map(str::trim) {
                None | Some("") | Some("all") => Ok(None),
                Some(raw) => raw
                    .parse::<S>()
                    .map(Some)
                    .map_err(|e| AppError::validation(format!("Invalid status: {e}"))),
            },
        }
    }

    pub fn can_see<S: PublicStatus>(self, status: S) -> bool {
        self.is_admin() || status == S::PUBLIC
    }

    /// Returns the item when it exists and is visible. Hidden rows produce
    /// the same error as missing ones.
    pub fn visible<T, S: PublicStatus>(
        self,
        item: Option<T>,
        status: impl Fn(&T) -> S,
        not_found: &str,
    ) -> AppResult<T> {
        match item {
            Some(item) if self.can_see(status(&item)) => Ok(item),
            _ => Err(AppError::not_found(not_found)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_status_filter_is_pinned() {
        let filter: Option<PublishStatus> = Viewer::Public.status_filter(Some("draft")).unwrap();
        assert_eq!(filter, Some(PublishStatus::Active));

        let filter: Option<ReviewStatus> = Viewer::Public.status_filter(None).unwrap();
        assert_eq!(filter, Some(ReviewStatus::Approved));
    }

    #[test]
    fn test_admin_status_filter() {
        let none: Option<PublishStatus> = Viewer::Admin.status_filter(None).unwrap();
        assert_eq!(none, None);

        let all: Option<PublishStatus> = Viewer::Admin.status_filter(Some("all")).unwrap();
        assert_eq!(all, None);

        let draft: Option<PublishStatus> = Viewer::Admin.status_filter(Some("draft")).unwrap();
        assert_eq!(draft, Some(PublishStatus::Draft));

        let bad = Viewer::Admin.status_filter::<PublishStatus>(Some("archived"));
        assert!(matches!(bad, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_hidden_and_missing_are_indistinguishable() {
        let hidden = Viewer::Public
            .visible(Some(PublishStatus::Draft), |s| *s, "Hotel not found")
            .unwrap_err();
        let missing = Viewer::Public
            .visible(None::<PublishStatus>, |s| *s, "Hotel not found")
            .unwrap_err();
        assert_eq!(hidden.to_string(), missing.to_string());
        assert_eq!(hidden.status(), missing.status());

        let seen = Viewer::Admin.visible(Some(PublishStatus::Draft), |s| *s, "Hotel not found");
        assert!(seen.is_ok());
    }
}
