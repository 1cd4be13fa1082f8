//! Admin user-list filters: committed criteria, the filter panel's draft copy,
//! and the predicate shared by the list and the export.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::types::TypeConstraintError;
use crate::domain::user::{MembershipType, ProfessionalStatus, User, UserStatus};

/// Deserializes an optional query-string value, treating blanks as absent.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Criteria used to fetch and export the admin user list.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFilters {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub membership_type: Option<MembershipType>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub professional_status: Option<ProfessionalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub created_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub created_to: Option<NaiveDate>,
}

impl UserFilters {
    pub fn is_empty(&self) -> bool {
        self == &UserFilters::default()
    }

    /// Returns `true` when `user` satisfies every configured criterion.
    ///
    /// The creation-date bounds are inclusive; no check is made that
    /// `created_from` precedes `created_to`.
    pub fn matches(&self, user: &User) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let haystacks = [
                Some(user.full_name.as_str()),
                Some(user.email.as_str()),
                user.phone.as_ref().map(|p| p.as_str()),
                user.industry.as_deref(),
            ];
            if !haystacks
                .into_iter()
                .flatten()
                .any(|value| value.to_lowercase().contains(&term))
            {
                return false;
            }
        }

        if self.membership_type.is_some_and(|t| t != user.membership_type) {
            return false;
        }
        if self
            .professional_status
            .is_some_and(|s| s != user.professional_status)
        {
            return false;
        }
        if self.status.is_some_and(|s| s != user.status) {
            return false;
        }
        if let Some(industry) = &self.industry {
            let matches_industry = user
                .industry
                .as_deref()
                .is_some_and(|value| value.eq_ignore_ascii_case(industry.trim()));
            if !matches_industry {
                return false;
            }
        }

        let created = user.created_at.date();
        if self.created_from.is_some_and(|from| created < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| created > to) {
            return false;
        }

        true
    }

    /// Encodes the criteria as a URL query string (without leading `?`).
    pub fn to_query(&self) -> String {
        serde_html_form::to_string(self).unwrap_or_default()
    }
}

/// One-click shortcuts in the filter panel that commit immediately.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QuickFilter {
    ActiveMembers,
    PendingApproval,
    PremiumMembers,
    Students,
    JoinedLast30Days,
}

impl QuickFilter {
    pub const ALL: &'static [QuickFilter] = &[
        QuickFilter::ActiveMembers,
        QuickFilter::PendingApproval,
        QuickFilter::PremiumMembers,
        QuickFilter::Students,
        QuickFilter::JoinedLast30Days,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            QuickFilter::ActiveMembers => "active-members",
            QuickFilter::PendingApproval => "pending-approval",
            QuickFilter::PremiumMembers => "premium-members",
            QuickFilter::Students => "students",
            QuickFilter::JoinedLast30Days => "joined-last30-days",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            QuickFilter::ActiveMembers => "Active members",
            QuickFilter::PendingApproval => "Pending approval",
            QuickFilter::PremiumMembers => "Premium members",
            QuickFilter::Students => "Students",
            QuickFilter::JoinedLast30Days => "Joined in last 30 days",
        }
    }

    fn apply_to(self, filters: &mut UserFilters, today: NaiveDate) {
        match self {
            QuickFilter::ActiveMembers => filters.status = Some(UserStatus::Active),
            QuickFilter::PendingApproval => filters.status = Some(UserStatus::Pending),
            QuickFilter::PremiumMembers => filters.membership_type = Some(MembershipType::Premium),
            QuickFilter::Students => filters.professional_status = Some(ProfessionalStatus::Student),
            QuickFilter::JoinedLast30Days => {
                filters.created_from = Some(today - Duration::days(30));
                filters.created_to = None;
            }
        }
    }
}

impl FromStr for QuickFilter {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuickFilter::ALL
            .iter()
            .copied()
            .find(|quick| quick.as_str() == s.trim())
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown quick filter: {s}")))
    }
}

/// Draft/committed pair backing the filter panel.
///
/// Only `committed` is used to fetch data. Search text is committed on every
/// change; the other fields wait for [`FilterPanel::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPanel {
    pub draft: UserFilters,
    pub committed: UserFilters,
}

impl FilterPanel {
    pub fn new(committed: UserFilters) -> Self {
        Self {
            draft: committed.clone(),
            committed,
        }
    }

    pub fn set_search(&mut self, search: Option<String>) {
        let search = search.filter(|s| !s.trim().is_empty());
        self.draft.search = search.clone();
        self.committed.search = search;
    }

    /// Replaces every draft field except the search text.
    pub fn edit_draft(&mut self, draft: UserFilters) {
        let search = self.draft.search.take();
        self.draft = UserFilters { search, ..draft };
    }

    pub fn apply(&mut self) {
        self.committed = self.draft.clone();
    }

    pub fn apply_quick(&mut self, quick: QuickFilter, today: NaiveDate) {
        quick.apply_to(&mut self.draft, today);
        self.apply();
    }

    pub fn clear(&mut self) {
        self.draft = UserFilters::default();
        self.committed = UserFilters::default();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::domain::types::{Email, FullName, UserId};

    pub(crate) fn sample_user(id: &str, status: UserStatus, membership: MembershipType) -> User {
        User {
            id: UserId::new(id).unwrap(),
            full_name: FullName::new(format!("User {id}")).unwrap(),
            email: Email::new(format!("{id}@example.com")).unwrap(),
            phone: None,
            professional_status: ProfessionalStatus::WorkingProfessional,
            years_of_experience: Some("3-5".to_string()),
            industry: Some("Finance".to_string()),
            membership_type: membership,
            status,
            created_at: NaiveDateTime::parse_from_str("2024-03-10 09:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            last_login: None,
            certifications: vec!["CISA".to_string()],
            cpe_score: 12,
            events_attended: 3,
            custom_fields: BTreeMap::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn empty_search_matches_everything() {
        let users = vec![
            sample_user("a", UserStatus::Active, MembershipType::Basic),
            sample_user("b", UserStatus::Pending, MembershipType::Premium),
        ];
        let filters = UserFilters {
            search: Some(String::new()),
            ..UserFilters::default()
        };
        assert_eq!(users.iter().filter(|u| filters.matches(u)).count(), users.len());
    }

    #[test]
    fn membership_filter_keeps_only_that_tier() {
        let users = vec![
            sample_user("a", UserStatus::Active, MembershipType::Basic),
            sample_user("b", UserStatus::Active, MembershipType::Premium),
            sample_user("c", UserStatus::Active, MembershipType::Premium),
        ];
        let filters = UserFilters {
            membership_type: Some(MembershipType::Premium),
            ..UserFilters::default()
        };
        let kept: Vec<_> = users.iter().filter(|u| filters.matches(u)).collect();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|u| u.membership_type == MembershipType::Premium));
    }

    #[test]
    fn status_filter_selects_the_single_active_user() {
        let users = vec![
            sample_user("u1", UserStatus::Active, MembershipType::Basic),
            sample_user("u2", UserStatus::Pending, MembershipType::Basic),
            sample_user("u3", UserStatus::Suspended, MembershipType::Basic),
        ];
        let filters = UserFilters {
            status: Some(UserStatus::Active),
            ..UserFilters::default()
        };
        let kept: Vec<_> = users.iter().filter(|u| filters.matches(u)).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "u1");
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let user = sample_user("jane", UserStatus::Active, MembershipType::Basic);
        let by_email = UserFilters {
            search: Some("JANE@EXAMPLE".to_string()),
            ..UserFilters::default()
        };
        let by_industry = UserFilters {
            search: Some("finan".to_string()),
            ..UserFilters::default()
        };
        let miss = UserFilters {
            search: Some("nobody".to_string()),
            ..UserFilters::default()
        };
        assert!(by_email.matches(&user));
        assert!(by_industry.matches(&user));
        assert!(!miss.matches(&user));
    }

    #[test]
    fn inverted_date_range_is_kept_and_matches_nothing() {
        let user = sample_user("a", UserStatus::Active, MembershipType::Basic);
        let filters = UserFilters {
            created_from: NaiveDate::from_ymd_opt(2024, 12, 1),
            created_to: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..UserFilters::default()
        };
        assert!(!filters.matches(&user));
    }

    #[test]
    fn query_string_round_trip() {
        let filters = UserFilters {
            search: Some("ann lee".to_string()),
            status: Some(UserStatus::Suspended),
            created_from: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..UserFilters::default()
        };
        let query = filters.to_query();
        let parsed: UserFilters = serde_html_form::from_str(&query).unwrap();
        assert_eq!(parsed, filters);

        let blanks: UserFilters =
            serde_html_form::from_str("search=&membership_type=&status=active").unwrap();
        assert_eq!(blanks.status, Some(UserStatus::Active));
        assert_eq!(blanks.membership_type, None);
    }

    #[test]
    fn draft_fields_wait_for_apply_but_search_commits() {
        let mut panel = FilterPanel::default();
        panel.edit_draft(UserFilters {
            status: Some(UserStatus::Inactive),
            ..UserFilters::default()
        });
        panel.set_search(Some("bob".to_string()));

        assert_eq!(panel.committed.status, None);
        assert_eq!(panel.committed.search.as_deref(), Some("bob"));

        panel.apply();
        assert_eq!(panel.committed.status, Some(UserStatus::Inactive));
        assert_eq!(panel.committed.search.as_deref(), Some("bob"));
    }

    #[test]
    fn quick_filter_commits_immediately() {
        let mut panel = FilterPanel::default();
        panel.apply_quick(QuickFilter::JoinedLast30Days, today());
        assert_eq!(panel.committed.created_from, NaiveDate::from_ymd_opt(2024, 5, 2));

        panel.apply_quick(QuickFilter::PremiumMembers, today());
        assert_eq!(panel.committed.membership_type, Some(MembershipType::Premium));
        assert_eq!(panel.committed, panel.draft);
    }

    #[test]
    fn clear_resets_draft_and_committed() {
        let mut panel = FilterPanel::new(UserFilters {
            status: Some(UserStatus::Active),
            ..UserFilters::default()
        });
        panel.clear();
        assert!(panel.committed.is_empty());
        assert!(panel.draft.is_empty());
    }

    #[test]
    fn quick_filter_names_match_serde() {
        for quick in QuickFilter::ALL {
            let json = serde_json::to_string(quick).unwrap();
            assert_eq!(json, format!("\"{}\"", quick.as_str()));
            assert_eq!(quick.as_str().parse::<QuickFilter>().unwrap(), *quick);
        }
    }
}
