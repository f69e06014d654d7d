//! Customer list view-model.
//!
//! Holds the full customer snapshot plus everything the list screen layers
//! on top of it: search text, vehicle filter, active/archive view, sort key,
//! multi-select, the row being edited and the two-step bulk delete prompt.
//!
//! The visible rows are recomputed from the snapshot on every
//! [`CustomerListView::visible`] call, so local mutations after a successful
//! write ([`upsert`](CustomerListView::upsert),
//! [`remove`](CustomerListView::remove)) are reflected immediately.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use bizdesk_core::{CustomerId, SortDirection};

use crate::models::Customer;

/// Sortable customer columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Business code, compared by numeric suffix.
    #[default]
    CustomerId,
    Name,
    Contact,
    Email,
    Address,
    /// Vehicle types, compared as one joined string.
    VehicleTypes,
}

impl SortField {
    /// Every sortable field, in column order.
    pub const ALL: [Self; 6] = [
        Self::CustomerId,
        Self::Name,
        Self::Contact,
        Self::Email,
        Self::Address,
        Self::VehicleTypes,
    ];

    /// Column key, matching the document field name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CustomerId => "customerId",
            Self::Name => "name",
            Self::Contact => "contact",
            Self::Email => "email",
            Self::Address => "address",
            Self::VehicleTypes => "vehicleTypes",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown sort field: {wanted}"))
    }
}

/// Column and direction the list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Two-step confirmation for permanently deleting the selection.
///
/// The IDs are captured when the prompt opens, so later selection changes
/// do not alter what gets deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkDeleteConfirmation {
    /// First prompt shown.
    AwaitingFirst(Vec<CustomerId>),
    /// First prompt accepted; final prompt shown.
    AwaitingSecond(Vec<CustomerId>),
    /// Both prompts accepted; the caller may delete these.
    Confirmed(Vec<CustomerId>),
}

impl BulkDeleteConfirmation {
    /// Customers covered by the prompt.
    #[must_use]
    pub fn ids(&self) -> &[CustomerId] {
        match self {
            Self::AwaitingFirst(ids) | Self::AwaitingSecond(ids) | Self::Confirmed(ids) => ids,
        }
    }

    /// Number of prompts accepted so far.
    #[must_use]
    pub const fn confirmations(&self) -> u8 {
        match self {
            Self::AwaitingFirst(_) => 0,
            Self::AwaitingSecond(_) => 1,
            Self::Confirmed(_) => 2,
        }
    }
}

/// List screen state over a customer snapshot.
#[derive(Debug, Clone, Default)]
pub struct CustomerListView {
    records: Vec<Customer>,
    search: String,
    vehicle_filter: Option<String>,
    show_archived: bool,
    sort: SortKey,
    selecting: bool,
    selection: BTreeSet<CustomerId>,
    editing: Option<CustomerId>,
    pending_delete: Option<BulkDeleteConfirmation>,
}

impl CustomerListView {
    /// Create a view over a snapshot, showing active customers by code.
    #[must_use]
    pub fn new(records: Vec<Customer>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// The full snapshot, in load order.
    #[must_use]
    pub fn records(&self) -> &[Customer] {
        &self.records
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Rows to display: archived visibility, vehicle filter and search
    /// applied, then sorted.
    #[must_use]
    pub fn visible(&self) -> Vec<&Customer> {
        let needle = self.search.trim().to_lowercase();
        let vehicle = self
            .vehicle_filter
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<&Customer> = self
            .records
            .iter()
            .filter(|c| c.is_archived() == self.show_archived)
            .filter(|c| vehicle.as_deref().is_none_or(|v| has_vehicle_type(c, v)))
            .filter(|c| needle.is_empty() || matches_search(c, &needle))
            .collect();

        let sort = self.sort;
        rows.sort_by(|a, b| {
            let ordering = compare(a, b, sort.field);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        rows
    }

    /// Current search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Set the free-text search.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Current vehicle filter.
    #[must_use]
    pub fn vehicle_filter(&self) -> Option<&str> {
        self.vehicle_filter.as_deref()
    }

    /// Restrict to customers with this vehicle type; `None` clears.
    pub fn set_vehicle_filter(&mut self, vehicle: Option<String>) {
        self.vehicle_filter = vehicle;
    }

    /// Whether the archive view is shown.
    #[must_use]
    pub const fn show_archived(&self) -> bool {
        self.show_archived
    }

    /// Switch between the active list and the archive.
    ///
    /// Switching views drops the selection and any open delete prompt.
    pub fn set_show_archived(&mut self, show_archived: bool) {
        if self.show_archived != show_archived {
            self.show_archived = show_archived;
            self.exit_selection();
        }
    }

    /// Current sort key.
    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    /// Replace the sort key.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Column header click: same field flips direction, a new field sorts
    /// ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort = if self.sort.field == field {
            SortKey {
                field,
                direction: self.sort.direction.toggled(),
            }
        } else {
            SortKey {
                field,
                direction: SortDirection::Asc,
            }
        };
    }

    /// Distinct vehicle types across the whole snapshot, for the filter
    /// dropdown. Case variants collapse to the first spelling seen.
    #[must_use]
    pub fn vehicle_type_options(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut options: Vec<String> = self
            .records
            .iter()
            .flat_map(|c| c.vehicle_types.iter())
            .filter(|v| seen.insert(v.to_lowercase()))
            .cloned()
            .collect();
        options.sort_by_key(|v| v.to_lowercase());
        options
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Whether multi-select mode is on.
    #[must_use]
    pub const fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Turn on multi-select mode.
    pub const fn enter_selection(&mut self) {
        self.selecting = true;
    }

    /// Turn off multi-select mode and clear the selection.
    pub fn exit_selection(&mut self) {
        self.selecting = false;
        self.selection.clear();
        self.pending_delete = None;
    }

    /// Flip one row's selection. Selecting a row turns on multi-select mode.
    pub fn toggle_selected(&mut self, id: &CustomerId) {
        if !self.selection.remove(id) {
            self.selecting = true;
            self.selection.insert(id.clone());
        }
    }

    /// Whether a row is selected.
    #[must_use]
    pub fn is_selected(&self, id: &CustomerId) -> bool {
        self.selection.contains(id)
    }

    /// Add every visible row to the selection.
    pub fn select_all_visible(&mut self) {
        let ids: Vec<CustomerId> = self.visible().into_iter().map(|c| c.id.clone()).collect();
        self.selecting = true;
        self.selection.extend(ids);
    }

    /// Selected IDs that still exist in the snapshot.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<CustomerId> {
        self.selection
            .iter()
            .filter(|id| self.records.iter().any(|c| &c.id == *id))
            .cloned()
            .collect()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Row currently being edited.
    #[must_use]
    pub fn editing(&self) -> Option<&CustomerId> {
        self.editing.as_ref()
    }

    /// Start editing a row. Unknown IDs are ignored.
    pub fn begin_edit(&mut self, id: &CustomerId) {
        if self.records.iter().any(|c| &c.id == id) {
            self.editing = Some(id.clone());
        }
    }

    /// Abandon the edit without saving.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // =========================================================================
    // Local mutations
    // =========================================================================

    /// Insert or replace a record after a successful write.
    pub fn upsert(&mut self, record: Customer) {
        if self.editing.as_ref() == Some(&record.id) {
            self.editing = None;
        }
        match self.records.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Drop a record after a successful delete.
    pub fn remove(&mut self, id: &CustomerId) {
        self.records.retain(|c| &c.id != id);
        self.selection.remove(id);
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
    }

    /// Replace the snapshot after a reload. Selection and edit state for
    /// customers that disappeared are dropped.
    pub fn replace_all(&mut self, records: Vec<Customer>) {
        self.records = records;
        let present: BTreeSet<CustomerId> = self.records.iter().map(|c| c.id.clone()).collect();
        self.selection.retain(|id| present.contains(id));
        if self.editing.as_ref().is_some_and(|id| !present.contains(id)) {
            self.editing = None;
        }
    }

    // =========================================================================
    // Bulk delete confirmation
    // =========================================================================

    /// Current delete prompt, if open.
    #[must_use]
    pub const fn pending_delete(&self) -> Option<&BulkDeleteConfirmation> {
        self.pending_delete.as_ref()
    }

    /// Open the delete prompt for the current selection. Does nothing when
    /// nothing is selected.
    pub fn request_bulk_delete(&mut self) -> Option<&BulkDeleteConfirmation> {
        let ids = self.selected_ids();
        self.pending_delete = if ids.is_empty() {
            None
        } else {
            Some(BulkDeleteConfirmation::AwaitingFirst(ids))
        };
        self.pending_delete.as_ref()
    }

    /// Accept the current prompt and advance to the next step.
    pub fn confirm_bulk_delete(&mut self) -> Option<&BulkDeleteConfirmation> {
        self.pending_delete = self.pending_delete.take().map(|pending| match pending {
            BulkDeleteConfirmation::AwaitingFirst(ids) => {
                BulkDeleteConfirmation::AwaitingSecond(ids)
            }
            BulkDeleteConfirmation::AwaitingSecond(ids)
            | BulkDeleteConfirmation::Confirmed(ids) => BulkDeleteConfirmation::Confirmed(ids),
        });
        self.pending_delete.as_ref()
    }

    /// Close the prompt without deleting.
    pub fn cancel_bulk_delete(&mut self) {
        self.pending_delete = None;
    }
}

fn has_vehicle_type(customer: &Customer, wanted_lower: &str) -> bool {
    customer
        .vehicle_types
        .iter()
        .any(|v| v.trim().to_lowercase() == wanted_lower)
}

fn matches_search(customer: &Customer, needle_lower: &str) -> bool {
    [
        &customer.customer_id,
        &customer.name,
        &customer.contact,
        &customer.email,
        &customer.address,
    ]
    .into_iter()
    .chain(customer.vehicle_types.iter())
    .any(|field| field.to_lowercase().contains(needle_lower))
}

fn compare(a: &Customer, b: &Customer, field: SortField) -> Ordering {
    match field {
        // Codes sort numerically and before anything that is not a code
        SortField::CustomerId => {
            let key = |c: &Customer| {
                let code = c.code();
                (code.is_none(), code, c.customer_id.to_lowercase())
            };
            key(a).cmp(&key(b))
        }
        SortField::Name => compare_text(&a.name, &b.name),
        SortField::Contact => compare_text(&a.contact, &b.contact),
        SortField::Email => compare_text(&a.email, &b.email),
        SortField::Address => compare_text(&a.address, &b.address),
        SortField::VehicleTypes => compare_text(&joined(a), &joined(b)),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn joined(customer: &Customer) -> String {
    customer
        .vehicle_types
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// List parameters as they arrive on the query string or command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerListQuery {
    /// Free-text search.
    pub q: Option<String>,
    /// Vehicle type filter.
    pub vehicle: Option<String>,
    /// Show the archive instead of the active list.
    pub archived: bool,
    /// Sort field key.
    pub sort: Option<SortField>,
    /// Sort direction.
    pub dir: Option<SortDirection>,
}

impl CustomerListQuery {
    /// Apply the parameters to a view.
    pub fn apply(self, view: &mut CustomerListView) {
        view.set_search(self.q.unwrap_or_default());
        view.set_vehicle_filter(self.vehicle);
        view.set_show_archived(self.archived);
        view.set_sort(SortKey {
            field: self.sort.unwrap_or_default(),
            direction: self.dir.unwrap_or_default(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use bizdesk_core::ArchiveState;

    use super::*;

    fn customer(id: &str, code: &str, name: &str, vehicles: &[&str]) -> Customer {
        Customer {
            id: CustomerId::new(id),
            customer_id: code.to_string(),
            name: name.to_string(),
            contact: String::new(),
            email: String::new(),
            address: String::new(),
            vehicle_types: vehicles.iter().map(ToString::to_string).collect(),
            archive: ArchiveState::Active,
        }
    }

    fn archived(mut c: Customer) -> Customer {
        c.archive.archive("Maria", Utc::now());
        c
    }

    fn codes(view: &CustomerListView) -> Vec<String> {
        view.visible()
            .iter()
            .map(|c| c.customer_id.clone())
            .collect()
    }

    fn sample() -> CustomerListView {
        CustomerListView::new(vec![
            customer("a", "CUS-010", "Pedro", &["Van"]),
            customer("b", "CUS-002", "Ana", &["Truck", "Sedan"]),
            customer("c", "CUS-123", "Carlos", &[]),
            customer("d", "CUS-004", "Juan123", &["truck"]),
            archived(customer("e", "CUS-001", "Old Co", &["Truck"])),
        ])
    }

    #[test]
    fn test_default_view_hides_archived_and_sorts_by_code() {
        let view = sample();
        assert_eq!(codes(&view), vec!["CUS-002", "CUS-004", "CUS-010", "CUS-123"]);
    }

    #[test]
    fn test_archive_view_shows_only_archived() {
        let mut view = sample();
        view.set_show_archived(true);
        assert_eq!(codes(&view), vec!["CUS-001"]);
    }

    #[test]
    fn test_search_matches_code_and_name() {
        let mut view = sample();
        view.set_search(" 123 ");
        assert_eq!(codes(&view), vec!["CUS-004", "CUS-123"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let mut view = sample();
        view.set_search("SEDAN");
        assert_eq!(codes(&view), vec!["CUS-002"]);

        view.set_search("");
        assert_eq!(view.visible().len(), 4);
    }

    #[test]
    fn test_vehicle_filter_exact_case_insensitive() {
        let mut view = sample();
        view.set_vehicle_filter(Some("TRUCK".to_string()));
        assert_eq!(codes(&view), vec!["CUS-002", "CUS-004"]);

        // Substrings do not count for the filter
        view.set_vehicle_filter(Some("Tru".to_string()));
        assert!(view.visible().is_empty());
    }

    #[test]
    fn test_toggle_sort_cycles_direction() {
        let mut view = sample();
        view.toggle_sort(SortField::Name);
        assert_eq!(view.sort().direction, SortDirection::Asc);
        assert_eq!(view.visible()[0].name, "Ana");

        view.toggle_sort(SortField::Name);
        assert_eq!(view.sort().direction, SortDirection::Desc);
        assert_eq!(view.visible()[0].name, "Pedro");

        view.toggle_sort(SortField::Name);
        assert_eq!(view.sort().direction, SortDirection::Asc);

        view.toggle_sort(SortField::CustomerId);
        assert_eq!(
            view.sort(),
            SortKey {
                field: SortField::CustomerId,
                direction: SortDirection::Asc
            }
        );
    }

    #[test]
    fn test_code_sort_is_numeric() {
        let mut view = CustomerListView::new(vec![
            customer("a", "CUS-1000", "", &[]),
            customer("b", "legacy", "", &[]),
            customer("c", "CUS-999", "", &[]),
        ]);
        assert_eq!(codes(&view), vec!["CUS-999", "CUS-1000", "legacy"]);

        view.toggle_sort(SortField::CustomerId);
        assert_eq!(codes(&view), vec!["legacy", "CUS-1000", "CUS-999"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let view = {
            let mut v = CustomerListView::new(vec![
                customer("x", "CUS-001", "Same", &[]),
                customer("y", "CUS-002", "same", &[]),
            ]);
            v.toggle_sort(SortField::Name);
            v
        };
        let ids: Vec<&str> = view.visible().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn test_selection_lifecycle() {
        let mut view = sample();
        assert!(!view.is_selecting());

        view.toggle_selected(&CustomerId::new("a"));
        assert!(view.is_selecting());
        assert!(view.is_selected(&CustomerId::new("a")));

        view.toggle_selected(&CustomerId::new("a"));
        assert!(!view.is_selected(&CustomerId::new("a")));

        view.set_search("Ana");
        view.select_all_visible();
        assert_eq!(view.selected_ids(), vec![CustomerId::new("b")]);

        view.exit_selection();
        assert!(!view.is_selecting());
        assert!(view.selected_ids().is_empty());
    }

    #[test]
    fn test_selected_ids_skip_removed_records() {
        let mut view = sample();
        view.select_all_visible();
        view.remove(&CustomerId::new("b"));
        assert!(!view.selected_ids().contains(&CustomerId::new("b")));
        assert_eq!(view.selected_ids().len(), 3);
    }

    #[test]
    fn test_edit_state() {
        let mut view = sample();
        view.begin_edit(&CustomerId::new("zzz"));
        assert!(view.editing().is_none());

        view.begin_edit(&CustomerId::new("a"));
        assert_eq!(view.editing(), Some(&CustomerId::new("a")));

        view.cancel_edit();
        assert!(view.editing().is_none());

        view.begin_edit(&CustomerId::new("a"));
        let mut updated = view.records()[0].clone();
        updated.name = "Pedro Reyes".to_string();
        view.upsert(updated);
        assert!(view.editing().is_none());
        assert_eq!(view.records()[0].name, "Pedro Reyes");
    }

    #[test]
    fn test_upsert_new_record_and_replace_all() {
        let mut view = sample();
        view.upsert(customer("f", "CUS-124", "New", &[]));
        assert_eq!(view.records().len(), 6);

        view.toggle_selected(&CustomerId::new("a"));
        view.begin_edit(&CustomerId::new("a"));
        view.replace_all(vec![customer("f", "CUS-124", "New", &[])]);
        assert!(view.selected_ids().is_empty());
        assert!(view.editing().is_none());
    }

    #[test]
    fn test_vehicle_type_options_distinct() {
        let view = sample();
        assert_eq!(view.vehicle_type_options(), vec!["Sedan", "Truck", "Van"]);
    }

    #[test]
    fn test_bulk_delete_needs_two_confirmations() {
        let mut view = sample();
        view.set_show_archived(true);
        assert!(view.request_bulk_delete().is_none());

        view.select_all_visible();
        let ids = vec![CustomerId::new("e")];
        assert_eq!(
            view.request_bulk_delete(),
            Some(&BulkDeleteConfirmation::AwaitingFirst(ids.clone()))
        );
        assert_eq!(
            view.confirm_bulk_delete(),
            Some(&BulkDeleteConfirmation::AwaitingSecond(ids.clone()))
        );
        let confirmed = view.confirm_bulk_delete().unwrap();
        assert_eq!(confirmed, &BulkDeleteConfirmation::Confirmed(ids));
        assert_eq!(confirmed.confirmations(), 2);
    }

    #[test]
    fn test_cancel_bulk_delete() {
        let mut view = sample();
        view.set_show_archived(true);
        view.select_all_visible();
        view.request_bulk_delete();
        view.confirm_bulk_delete();
        view.cancel_bulk_delete();
        assert!(view.pending_delete().is_none());
        assert!(view.confirm_bulk_delete().is_none());
    }

    #[test]
    fn test_switching_views_clears_selection() {
        let mut view = sample();
        view.select_all_visible();
        view.set_show_archived(true);
        assert!(view.selected_ids().is_empty());
        assert!(!view.is_selecting());
    }

    #[test]
    fn test_query_apply() {
        let mut view = sample();
        CustomerListQuery {
            q: Some("a".to_string()),
            vehicle: None,
            archived: false,
            sort: Some(SortField::Name),
            dir: Some(SortDirection::Desc),
        }
        .apply(&mut view);

        assert_eq!(view.visible()[0].name, "Pedro");
        assert_eq!(view.search(), "a");
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!("customerId".parse::<SortField>(), Ok(SortField::CustomerId));
        assert_eq!("VEHICLETYPES".parse::<SortField>(), Ok(SortField::VehicleTypes));
        assert!("price".parse::<SortField>().is_err());
    }
}
