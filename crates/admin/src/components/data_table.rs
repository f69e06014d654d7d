//! Data table configuration.
//!
//! Describes the customer table to the front end: which columns exist and
//! sort, which filters apply, and which bulk actions the current view
//! offers. Served from `GET /api/customers/table`.

use serde::Serialize;

use bizdesk_core::Permission;

use super::customer_list::SortField;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Whether the column is sortable.
    pub sortable: bool,
    /// Whether the column is visible by default.
    pub default_visible: bool,
}

impl TableColumn {
    /// A column backed by a sortable field.
    #[must_use]
    pub fn sortable(field: SortField, label: &str) -> Self {
        Self {
            key: field.key().to_string(),
            label: label.to_string(),
            sortable: true,
            default_visible: true,
        }
    }

    /// A display-only column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
            default_visible: true,
        }
    }

    /// Set whether the column is visible by default.
    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.default_visible = visible;
        self
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Single-select dropdown.
    Select,
    /// On/off switch.
    Toggle,
}

/// Filter definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    /// Query parameter the filter sets.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Filter type.
    pub filter_type: FilterType,
    /// Available options (selects).
    pub options: Vec<FilterOption>,
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// An option whose label is its value.
    #[must_use]
    pub fn plain(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

impl TableFilter {
    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            options,
        }
    }

    /// Create a toggle filter.
    #[must_use]
    pub fn toggle(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Toggle,
            options: vec![],
        }
    }
}

/// Bulk action definition for data tables.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAction {
    /// Action key; the endpoint is `POST /api/customers/bulk/{key}`.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Phosphor icon class.
    pub icon: String,
    /// Whether this is a destructive action.
    pub destructive: bool,
    /// How many times the user must confirm before the request is sent.
    pub confirmations: u8,
}

impl BulkAction {
    /// Create a new bulk action needing no confirmation.
    #[must_use]
    pub fn new(key: &str, label: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            destructive: false,
            confirmations: 0,
        }
    }

    /// Mark this action as destructive, requiring `confirmations` prompts.
    #[must_use]
    pub const fn destructive(mut self, confirmations: u8) -> Self {
        self.destructive = true;
        self.confirmations = confirmations;
        self
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Bulk action definitions.
    pub bulk_actions: Vec<BulkAction>,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Icon for empty state.
    pub empty_icon: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
    /// Whether to show bulk action bar.
    pub has_bulk_actions: bool,
    /// Whether to show filter panel.
    pub has_filters: bool,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            filters: vec![],
            bulk_actions: vec![],
            search_placeholder: "Search...".to_string(),
            empty_icon: "ph-list".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
            has_bulk_actions: false,
            has_filters: false,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.has_filters = true;
        self.filters.push(filter);
        self
    }

    /// Add a bulk action.
    #[must_use]
    pub fn bulk_action(mut self, action: BulkAction) -> Self {
        self.has_bulk_actions = true;
        self.bulk_actions.push(action);
        self
    }

    /// Add a bulk action only when `allowed`.
    #[must_use]
    pub fn bulk_action_if(self, allowed: bool, action: BulkAction) -> Self {
        if allowed { self.bulk_action(action) } else { self }
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, icon: &str, title: &str, description: Option<&str>) -> Self {
        self.empty_icon = icon.to_string();
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Get default visible columns.
    #[must_use]
    pub fn default_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.default_visible)
            .map(|c| c.key.clone())
            .collect()
    }
}

/// Build the customers table configuration.
///
/// `vehicle_types` fills the vehicle filter. Bulk actions depend on the view
/// (archive in the active list; restore and delete in the archive) and on
/// what `can` allows.
#[must_use]
pub fn customers_table_config(
    vehicle_types: &[String],
    show_archived: bool,
    can: impl Fn(Permission) -> bool,
) -> DataTableConfig {
    let config = DataTableConfig::new("customers")
        .column(TableColumn::sortable(SortField::CustomerId, "Customer ID"))
        .column(TableColumn::sortable(SortField::Name, "Name"))
        .column(TableColumn::sortable(SortField::Contact, "Contact"))
        .column(TableColumn::sortable(SortField::Email, "Email"))
        .column(TableColumn::sortable(SortField::Address, "Address").visible(false))
        .column(TableColumn::sortable(SortField::VehicleTypes, "Vehicle Types"))
        .column(TableColumn::new("archivedAt", "Archived").visible(show_archived))
        .filter(TableFilter::select(
            "vehicle",
            "Vehicle Type",
            vehicle_types.iter().map(|v| FilterOption::plain(v)).collect(),
        ))
        .filter(TableFilter::toggle("archived", "Show Archived"))
        .search_placeholder("Search by ID, name, contact, email, address or vehicle...");

    let config = if show_archived {
        config
            .bulk_action_if(
                can(Permission::ArchiveCustomers),
                BulkAction::new("unarchive", "Restore", "ph-arrow-counter-clockwise"),
            )
            .bulk_action_if(
                can(Permission::DeleteCustomers),
                BulkAction::new("delete", "Delete Permanently", "ph-trash").destructive(2),
            )
    } else {
        config.bulk_action_if(
            can(Permission::ArchiveCustomers),
            BulkAction::new("archive", "Archive", "ph-archive"),
        )
    };

    config.empty_state(
        "ph-users",
        if show_archived {
            "No archived customers"
        } else {
            "No customers found"
        },
        Some("Try adjusting your search or filters"),
    )
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn keys(config: &DataTableConfig) -> Vec<&str> {
        config.bulk_actions.iter().map(|a| a.key.as_str()).collect()
    }

    #[test]
    fn test_active_view_offers_archive() {
        let config = customers_table_config(&["Truck".to_string()], false, |_| true);
        assert_eq!(keys(&config), vec!["archive"]);
        assert_eq!(config.filters[0].options.len(), 1);
        assert!(!config.default_columns().contains(&"archivedAt".to_string()));
    }

    #[test]
    fn test_archive_view_offers_restore_and_delete() {
        let config = customers_table_config(&[], true, |_| true);
        assert_eq!(keys(&config), vec!["unarchive", "delete"]);

        let delete = &config.bulk_actions[1];
        assert!(delete.destructive);
        assert_eq!(delete.confirmations, 2);
        assert!(config.default_columns().contains(&"archivedAt".to_string()));
    }

    #[test]
    fn test_delete_hidden_without_permission() {
        let config =
            customers_table_config(&[], true, |p| p != Permission::DeleteCustomers);
        assert_eq!(keys(&config), vec!["unarchive"]);
        assert!(config.has_bulk_actions);

        let viewer = customers_table_config(&[], false, |p| p == Permission::ViewCustomers);
        assert!(!viewer.has_bulk_actions);
    }

    #[test]
    fn test_sortable_columns_use_sort_keys() {
        let config = customers_table_config(&[], false, |_| true);
        let sortable: Vec<&str> = config
            .columns
            .iter()
            .filter(|c| c.sortable)
            .map(|c| c.key.as_str())
            .collect();
        assert_eq!(
            sortable,
            vec!["customerId", "name", "contact", "email", "address", "vehicleTypes"]
        );
    }
}
