//! Public pages of the chapter site.

use crate::domain::user::MembershipType;
use crate::dto::main::{HomePageData, MembershipTier};
use crate::repository::EventReader;
use crate::services::events::upcoming_events;

/// Number of upcoming events featured on the home page.
pub const HOME_EVENT_COUNT: usize = 3;

/// Loads the home page. A backend failure leaves the events list empty.
pub async fn load_home_page<R>(repo: &R) -> HomePageData
where
    R: EventReader + ?Sized,
{
    match upcoming_events(repo, HOME_EVENT_COUNT).await {
        Ok(upcoming) => HomePageData {
            upcoming,
            events_unavailable: false,
        },
        Err(err) => {
            log::warn!("Home page rendered without events: {err}");
            HomePageData {
                upcoming: Vec::new(),
                events_unavailable: true,
            }
        }
    }
}

/// Tiers in display order.
pub fn membership_tiers() -> Vec<MembershipTier> {
    MembershipType::ALL
        .iter()
        .map(|tier| match tier {
            MembershipType::Basic => MembershipTier {
                key: tier.as_str(),
                name: tier.label(),
                price: "$135 / year",
                benefits: &[
                    "Member pricing on chapter events",
                    "Monthly newsletter",
                    "Access to the member directory",
                ],
            },
            MembershipType::Premium => MembershipTier {
                key: tier.as_str(),
                name: tier.label(),
                price: "$250 / year",
                benefits: &[
                    "Everything in Basic",
                    "Free admission to quarterly workshops",
                    "CPE tracking and certificates",
                    "Mentorship program",
                ],
            },
            MembershipType::Student => MembershipTier {
                key: tier.as_str(),
                name: tier.label(),
                price: "$25 / year",
                benefits: &[
                    "Member pricing on chapter events",
                    "Career nights and resume reviews",
                    "Exam study groups",
                ],
            },
            MembershipType::Trial => MembershipTier {
                key: tier.as_str(),
                name: tier.label(),
                price: "Free for 30 days",
                benefits: &["Attend one chapter event at member pricing", "Monthly newsletter"],
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_membership_type_has_a_tier() {
        let tiers = membership_tiers();
        assert_eq!(tiers.len(), MembershipType::ALL.len());
        assert_eq!(tiers[0].key, "basic");
        assert!(tiers.iter().all(|tier| !tier.benefits.is_empty()));
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod mock_tests {
    use super::*;
    use crate::formatting::tests::sample_event;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    #[actix_web::test]
    async fn home_page_asks_for_upcoming_events_only() {
        let mut repo = MockRepository::new();
        repo.expect_list_events()
            .withf(|query| query.upcoming && query.pagination.map(|p| p.per_page) == Some(HOME_EVENT_COUNT))
            .times(1)
            .returning(|_| Ok((1, vec![sample_event("e1")])));

        let data = load_home_page(&repo).await;

        assert_eq!(data.upcoming.len(), 1);
        assert!(!data.events_unavailable);
    }

    #[actix_web::test]
    async fn home_page_survives_backend_failure() {
        let mut repo = MockRepository::new();
        repo.expect_list_events()
            .times(1)
            .returning(|_| Err(RepositoryError::ConnectionError("refused".to_string())));

        let data = load_home_page(&repo).await;

        assert!(data.upcoming.is_empty());
        assert!(data.events_unavailable);
    }
}
