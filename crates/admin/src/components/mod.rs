//! List-screen building blocks.
//!
//! - [`customer_list`]: the customer list view-model
//! - [`data_table`]: table configuration served to the front end

pub mod customer_list;
pub mod data_table;

pub use customer_list::{
    BulkDeleteConfirmation, CustomerListQuery, CustomerListView, SortField, SortKey,
};
pub use data_table::{DataTableConfig, customers_table_config};
