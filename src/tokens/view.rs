use chrono::{DateTime, TimeDelta, Utc};

use crate::payload::ScannedIdentity;
use crate::tokens::format::format_remaining;
use crate::tokens::model::IssuedToken;

/// An [`IssuedToken`] evaluated against one wall-clock sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenView {
    pub token: IssuedToken,
    pub expiry_time: DateTime<Utc>,
    /// Whole seconds until expiry, truncated toward zero; negative once expired.
    pub remaining_seconds: i64,
    pub is_active: bool,
}

impl TokenView {
    pub fn compute(token: &IssuedToken, now: DateTime<Utc>) -> Self {
        match token.expires_in_seconds() {
            Some(seconds) => {
                let expiry_time = TimeDelta::try_seconds(seconds)
                    .and_then(|lifetime| token.date_created.checked_add_signed(lifetime))
                    .unwrap_or(if seconds < 0 {
                        DateTime::<Utc>::MIN_UTC
                    } else {
                        DateTime::<Utc>::MAX_UTC
                    });
                Self {
                    token: token.clone(),
                    expiry_time,
                    remaining_seconds: (expiry_time - now).num_seconds(),
                    is_active: expiry_time > now,
                }
            }
            // An unreadable lifetime never counts as active.
            None => Self {
                token: token.clone(),
                expiry_time: token.date_created,
                remaining_seconds: 0,
                is_active: false,
            },
        }
    }

    pub fn matches_facility(&self, facility_id: &str) -> bool {
        self.is_active && self.token.facility_id == facility_id
    }

    pub fn matches_identity(&self, identity: &ScannedIdentity) -> bool {
        self.matches_facility(identity.facility_id())
            && self.token.counter_code == identity.counter_id()
    }

    /// `"1h 2m"`, `"2m 5s"`, `"9s"` or `"Expired"`.
    pub fn remaining_label(&self) -> String {
        format_remaining(self.remaining_seconds, self.is_active)
    }
}

/// Every token of one listing, evaluated against a single shared `now`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenBoard {
    now: DateTime<Utc>,
    views: Vec<TokenView>,
}

impl TokenBoard {
    pub fn at(tokens: &[IssuedToken], now: DateTime<Utc>) -> Self {
        let views = tokens
            .iter()
            .map(|token| TokenView::compute(token, now))
            .collect();
        Self { now, views }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn views(&self) -> &[TokenView] {
        &self.views
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// An active token already issued by `facility_id`, at any counter.
    pub fn active_for_facility(&self, facility_id: &str) -> Option<&TokenView> {
        self.views
            .iter()
            .find(|view| view.matches_facility(facility_id))
    }

    /// An active token issued by exactly the scanned facility and counter.
    pub fn active_for_identity(&self, identity: &ScannedIdentity) -> Option<&TokenView> {
        self.views
            .iter()
            .find(|view| view.matches_identity(identity))
    }

    /// Newest-first views, at most `limit` of them.
    pub fn recent(&self, limit: usize) -> Vec<TokenView> {
        let mut views = self.views.clone();
        views.sort_by(|a, b| b.token.date_created.cmp(&a.token.date_created));
        views.truncate(limit);
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::parse_scanned_text;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn token(id: i64, facility: &str, counter: &str, age_secs: i64, expires_in: &str) -> IssuedToken {
        IssuedToken {
            id,
            patient_id: "patient".into(),
            token_number: format!("T-{id}"),
            facility_id: facility.into(),
            facility_name: format!("{facility} hospital"),
            facility_address: String::new(),
            expires_in: expires_in.into(),
            client_id: "client".into(),
            date_created: now() - TimeDelta::seconds(age_secs),
            counter_code: counter.into(),
        }
    }

    fn identity(facility: &str, counter: &str) -> ScannedIdentity {
        parse_scanned_text(&format!(
            "https://phr.example.org/share-profile?hip-id={facility}&counter-id={counter}"
        ))
        .unwrap()
    }

    #[test]
    fn half_elapsed_token_is_active() {
        let view = TokenView::compute(&token(1, "F", "C", 30, "60"), now());
        assert!(view.is_active);
        assert_eq!(view.remaining_seconds, 30);
        assert_eq!(view.expiry_time, now() + TimeDelta::seconds(30));
    }

    #[test]
    fn outlived_token_is_expired() {
        let view = TokenView::compute(&token(1, "F", "C", 30, "10"), now());
        assert!(!view.is_active);
        assert_eq!(view.remaining_seconds, -20);
        assert_eq!(view.remaining_label(), "Expired");
    }

    #[test]
    fn token_expiring_exactly_now_is_inactive() {
        let view = TokenView::compute(&token(1, "F", "C", 60, "60"), now());
        assert!(!view.is_active);
        assert_eq!(view.remaining_seconds, 0);
    }

    #[test]
    fn remaining_seconds_truncate_toward_zero() {
        let mut raw = token(1, "F", "C", 0, "10");
        raw.date_created = now() - TimeDelta::milliseconds(2_500);
        assert_eq!(TokenView::compute(&raw, now()).remaining_seconds, 7);

        raw.expires_in = "1".into();
        let view = TokenView::compute(&raw, now());
        assert_eq!(view.remaining_seconds, -1);
        assert!(!view.is_active);
    }

    #[test]
    fn unreadable_lifetime_is_inactive() {
        let view = TokenView::compute(&token(1, "F", "C", -600, "soon"), now());
        assert!(!view.is_active);
        assert_eq!(view.remaining_seconds, 0);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let tokens = vec![token(1, "F", "C", 5, "60"), token(2, "G", "D", 100, "60")];
        assert_eq!(TokenBoard::at(&tokens, now()), TokenBoard::at(&tokens, now()));
    }

    #[test]
    fn facility_lookup_ignores_counter_but_requires_activity() {
        let tokens = vec![
            token(1, "F", "OLD", 500, "60"),
            token(2, "F", "OTHER", 10, "60"),
        ];
        let board = TokenBoard::at(&tokens, now());
        assert_eq!(board.active_for_facility("F").map(|v| v.token.id), Some(2));
        assert!(board.active_for_facility("G").is_none());
    }

    #[test]
    fn identity_lookup_requires_exact_counter() {
        let tokens = vec![
            token(1, "F", "C2", 10, "60"),
            token(2, "F", "C1", 500, "60"),
            token(3, "F", "C1", 10, "60"),
        ];
        let board = TokenBoard::at(&tokens, now());
        assert_eq!(board.active_for_identity(&identity("F", "C1")).map(|v| v.token.id), Some(3));
        assert!(board.active_for_identity(&identity("F", "C9")).is_none());
        assert!(board.active_for_identity(&identity("G", "C1")).is_none());
    }

    #[test]
    fn recent_sorts_newest_first_and_truncates() {
        let tokens: Vec<_> = (0..12).map(|i| token(i, "F", "C", i * 10, "60")).collect();
        let board = TokenBoard::at(&tokens, now());
        let recent = board.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.first().map(|v| v.token.id), Some(0));
        assert_eq!(recent.last().map(|v| v.token.id), Some(9));
    }
}
