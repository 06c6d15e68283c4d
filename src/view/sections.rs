//! Public and member-panel listing sections.

use crate::access::{Gate, ListingClick, Route};
use crate::api::ListingQuery;
use crate::models::{Category, Listing, ListingKind};
use crate::stores::{ListingStore, SessionStore};
use crate::view::detail::ListingDetail;
use crate::view::mount::MountHandle;
use crate::view::reconcile::{display_unit, price_label, primary_image, CardImage};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryTab {
    #[default]
    All,
    Category(i64),
}

/// Client-side refinements applied after the status fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionFilter {
    pub member_panel: bool,
    pub tab: CategoryTab,
    pub sort: Option<SortDirection>,
}

impl SectionFilter {
    pub fn for_route(route: &Route) -> Self {
        Self {
            member_panel: route.is_member_panel(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingCard {
    pub id: i64,
    pub kind: ListingKind,
    pub name: String,
    pub address: String,
    pub price: String,
    pub unit: String,
    pub image: CardImage,
    pub featured: bool,
    pub rent_time: Option<String>,
}

impl ListingCard {
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            kind: listing.kind(),
            name: listing.name.clone(),
            address: listing.address.clone(),
            price: price_label(listing.price),
            unit: display_unit(&listing.unit_of_numeration),
            image: primary_image(&listing.rentals_images),
            featured: listing.featured,
            rent_time: listing.rent_time.as_ref().map(|r| r.name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionView {
    pub tabs: Vec<Category>,
    pub cards: Vec<ListingCard>,
}

/// Distinct categories present in `listings`, first-seen order.
pub fn category_tabs(listings: &[Listing]) -> Vec<Category> {
    let mut seen = HashSet::new();
    listings
        .iter()
        .filter_map(|l| l.category.as_ref())
        .filter(|c| seen.insert(c.id))
        .cloned()
        .collect()
}

/// Compose a section from a status-scoped result set.
///
/// Tabs come from the status-scoped set; outside the member panel only
/// featured listings are shown; category tab and price sort apply last.
pub fn compose_section(status_scoped: &[Listing], filter: &SectionFilter) -> SectionView {
    let tabs = category_tabs(status_scoped);

    let mut visible: Vec<&Listing> = status_scoped
        .iter()
        .filter(|l| filter.member_panel || l.featured)
        .filter(|l| match filter.tab {
            CategoryTab::All => true,
            CategoryTab::Category(id) => l.category_id() == Some(id),
        })
        .collect();

    if let Some(direction) = filter.sort {
        visible.sort_by(|a, b| {
            let ord = a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    SectionView {
        tabs,
        cards: visible.into_iter().map(ListingCard::from_listing).collect(),
    }
}

/// Outcome of clicking a card
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Wait,
    RegistrationPrompt,
    AwaitingApproval,
    Blocked,
    Detail(Box<ListingDetail>),
    Missing,
}

/// One listing section bound to the stores it reads.
pub struct ListingSection {
    status: String,
    filter: SectionFilter,
    listings: Arc<ListingStore>,
    session: Arc<SessionStore>,
    mount: MountHandle,
    view: Option<SectionView>,
}

impl ListingSection {
    pub fn new(
        status: impl Into<String>,
        route: &Route,
        listings: Arc<ListingStore>,
        session: Arc<SessionStore>,
        mount: MountHandle,
    ) -> Self {
        Self {
            status: status.into(),
            filter: SectionFilter::for_route(route),
            listings,
            session,
            mount,
            view: None,
        }
    }

    /// `None` while the first fetch is still pending.
    pub fn view(&self) -> Option<&SectionView> {
        self.view.as_ref()
    }

    pub fn filter(&self) -> SectionFilter {
        self.filter
    }

    /// Fetch the status-scoped set and compose it, unless unmounted meanwhile.
    pub async fn load(&mut self) {
        self.listings.load_by_status(&self.status).await;
        if !self.mount.is_mounted() {
            debug!("Section '{}' unmounted before load finished", self.status);
            return;
        }
        self.recompose();
    }

    pub fn select_tab(&mut self, tab: CategoryTab) {
        self.filter.tab = tab;
        self.recompose();
    }

    pub fn toggle_sort(&mut self) {
        self.filter.sort = Some(self.filter.sort.map(SortDirection::toggled).unwrap_or_default());
        self.recompose();
    }

    fn query(&self) -> ListingQuery {
        ListingQuery::Status(self.status.clone())
    }

    fn recompose(&mut self) {
        let state = self.listings.snapshot();
        if let Some(listings) = state.results_for(&self.query()) {
            self.view = Some(compose_section(listings, &self.filter));
        }
    }

    /// Apply the access gate to a card click.
    pub fn click(&self, listing_id: i64) -> ClickOutcome {
        let gate = Gate::evaluate(&self.session.snapshot());
        match ListingClick::decide(gate) {
            ListingClick::Wait => ClickOutcome::Wait,
            ListingClick::OpenRegistration => ClickOutcome::RegistrationPrompt,
            ListingClick::ShowAwaitingApproval => ClickOutcome::AwaitingApproval,
            ListingClick::ShowBlocked => ClickOutcome::Blocked,
            ListingClick::OpenDetail => {
                let state = self.listings.snapshot();
                let listing = state
                    .results_for(&self.query())
                    .and_then(|listings| listings.iter().find(|l| l.id == listing_id))
                    .or_else(|| state.get(listing_id));
                match listing {
                    Some(listing) => ClickOutcome::Detail(Box::new(ListingDetail::from_listing(listing))),
                    None => ClickOutcome::Missing,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            icon: None,
            is_locked: false,
            custom_fields: vec![],
        }
    }

    fn listing(id: i64, price: f64, featured: bool, category_id: i64) -> Listing {
        Listing {
            id,
            name: format!("Listing {}", id),
            description: String::new(),
            address: String::new(),
            price,
            unit_of_numeration: String::new(),
            status: "our portfolio".to_string(),
            featured,
            kind: None,
            category: Some(category(category_id, &format!("Category {}", category_id))),
            rent_time: None,
            rentals_images: vec![],
            rental_custom_data: vec![],
        }
    }

    fn ids(view: &SectionView) -> Vec<i64> {
        view.cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_public_section_hides_unfeatured() {
        let listings = vec![listing(1, 100.0, true, 1), listing(2, 200.0, false, 1)];
        let view = compose_section(&listings, &SectionFilter::for_route(&Route::Home));
        assert_eq!(ids(&view), vec![1]);

        let panel = compose_section(&listings, &SectionFilter::for_route(&Route::MemberPanel));
        assert_eq!(ids(&panel), vec![1, 2]);
    }

    #[test]
    fn test_tabs_are_derived_before_featured_filter() {
        let listings = vec![
            listing(1, 100.0, true, 3),
            listing(2, 100.0, false, 7),
            listing(3, 100.0, true, 3),
        ];
        let view = compose_section(&listings, &SectionFilter::default());
        let tab_ids: Vec<i64> = view.tabs.iter().map(|c| c.id).collect();
        assert_eq!(tab_ids, vec![3, 7]);
    }

    #[test]
    fn test_category_tab_and_stable_sort() {
        let listings = vec![
            listing(1, 300.0, true, 1),
            listing(2, 100.0, true, 1),
            listing(3, 300.0, true, 2),
            listing(4, 300.0, true, 1),
        ];

        let asc = SectionFilter {
            sort: Some(SortDirection::Asc),
            ..SectionFilter::default()
        };
        assert_eq!(ids(&compose_section(&listings, &asc)), vec![2, 1, 3, 4]);

        let desc = SectionFilter {
            sort: Some(SortDirection::Desc),
            ..SectionFilter::default()
        };
        assert_eq!(ids(&compose_section(&listings, &desc)), vec![1, 3, 4, 2]);

        let tab = SectionFilter {
            tab: CategoryTab::Category(1),
            sort: Some(SortDirection::Desc),
            ..SectionFilter::default()
        };
        assert_eq!(ids(&compose_section(&listings, &tab)), vec![1, 4, 2]);
    }

    #[test]
    fn test_card_uses_placeholder_without_images() {
        let card = ListingCard::from_listing(&listing(1, 0.0, true, 1));
        assert_eq!(card.image, CardImage::Placeholder);
        assert_eq!(card.price, "Price on request");
    }
}
