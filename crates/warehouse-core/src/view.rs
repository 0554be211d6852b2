//! # View Registry
//!
//! Hand-maintained mapping from the browser's views to database tables.
//!
//! ```text
//! ┌──────────────────┬─────────────────┬──────────────┐
//! │ view             │ table           │ display      │
//! ├──────────────────┼─────────────────┼──────────────┤
//! │ ProductsView     │ product         │ Products     │
//! │ WarehousesView   │ warehouse       │ Warehouses   │
//! │ ReportsView      │ action_log      │ Reports      │
//! │ InventoryView    │ inventory_check │ Inventory    │
//! │ SuppliesView     │ goods_receipt   │ Supplies     │
//! │ ShipmentsView    │ goods_issue     │ Shipments    │
//! │ UsersView        │ app_user        │ Users        │
//! │ TransfersView    │ stock_transfer  │ Transfers    │
//! │ InvoicesView     │ invoice         │ Invoices     │
//! │ (anything else)  │ product         │ Data         │
//! └──────────────────┴─────────────────┴──────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A browsable view of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Products,
    Warehouses,
    Reports,
    Inventory,
    Supplies,
    Shipments,
    Users,
    Transfers,
    Invoices,
    /// Fallback for unknown view names; shows the product table.
    Data,
}

impl View {
    /// Every view the browser offers, in menu order.
    pub const ALL: [View; 9] = [
        View::Products,
        View::Warehouses,
        View::Supplies,
        View::Shipments,
        View::Transfers,
        View::Inventory,
        View::Invoices,
        View::Users,
        View::Reports,
    ];

    /// Resolves a view name. Accepts the `XxxView` names and short
    /// lower-case aliases (`products`, `supplies`, ...). Unknown names
    /// fall back to [`View::Data`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "ProductsView" | "products" => View::Products,
            "WarehousesView" | "warehouses" => View::Warehouses,
            "ReportsView" | "reports" => View::Reports,
            "InventoryView" | "inventory" => View::Inventory,
            "SuppliesView" | "supplies" => View::Supplies,
            "ShipmentsView" | "shipments" => View::Shipments,
            "UsersView" | "users" => View::Users,
            "TransfersView" | "transfers" => View::Transfers,
            "InvoicesView" | "invoices" => View::Invoices,
            _ => View::Data,
        }
    }

    /// Table behind the view.
    pub fn table(&self) -> &'static str {
        match self {
            View::Products | View::Data => "product",
            View::Warehouses => "warehouse",
            View::Reports => "action_log",
            View::Inventory => "inventory_check",
            View::Supplies => "goods_receipt",
            View::Shipments => "goods_issue",
            View::Users => "app_user",
            View::Transfers => "stock_transfer",
            View::Invoices => "invoice",
        }
    }

    /// Title shown above the grid and used in export file names.
    pub fn display_name(&self) -> &'static str {
        match self {
            View::Products => "Products",
            View::Warehouses => "Warehouses",
            View::Reports => "Reports",
            View::Inventory => "Inventory",
            View::Supplies => "Supplies",
            View::Shipments => "Shipments",
            View::Users => "Users",
            View::Transfers => "Transfers",
            View::Invoices => "Invoices",
            View::Data => "Data",
        }
    }

    /// Short alias accepted on the command line.
    pub fn alias(&self) -> &'static str {
        match self {
            View::Products => "products",
            View::Warehouses => "warehouses",
            View::Reports => "reports",
            View::Inventory => "inventory",
            View::Supplies => "supplies",
            View::Shipments => "shipments",
            View::Users => "users",
            View::Transfers => "transfers",
            View::Invoices => "invoices",
            View::Data => "data",
        }
    }

    /// Read-only join that replaces foreign-key ids with names for
    /// display. `None` for views that show their table as-is.
    pub fn presentation_query(&self) -> Option<&'static str> {
        match self {
            View::Supplies => Some(
                "SELECT r.receipt_id, p.product_name, w.warehouse_name, s.supplier_name, \
                 r.quantity, r.unit_price, r.received_at \
                 FROM goods_receipt r \
                 LEFT JOIN product p ON p.product_id = r.product_id \
                 LEFT JOIN warehouse w ON w.warehouse_id = r.warehouse_id \
                 LEFT JOIN supplier s ON s.supplier_id = r.supplier_id \
                 ORDER BY r.received_at DESC LIMIT ?1",
            ),
            View::Shipments => Some(
                "SELECT i.issue_id, p.product_name, w.warehouse_name, c.customer_name, \
                 i.quantity, i.issued_at \
                 FROM goods_issue i \
                 LEFT JOIN product p ON p.product_id = i.product_id \
                 LEFT JOIN warehouse w ON w.warehouse_id = i.warehouse_id \
                 LEFT JOIN customer c ON c.customer_id = i.customer_id \
                 ORDER BY i.issued_at DESC LIMIT ?1",
            ),
            View::Transfers => Some(
                "SELECT t.transfer_id, p.product_name, wf.warehouse_name AS from_warehouse, \
                 wt.warehouse_name AS to_warehouse, t.quantity, t.transferred_at \
                 FROM stock_transfer t \
                 LEFT JOIN product p ON p.product_id = t.product_id \
                 LEFT JOIN warehouse wf ON wf.warehouse_id = t.from_warehouse_id \
                 LEFT JOIN warehouse wt ON wt.warehouse_id = t.to_warehouse_id \
                 ORDER BY t.transferred_at DESC LIMIT ?1",
            ),
            View::Inventory => Some(
                "SELECT c.check_id, w.warehouse_name, p.product_name, c.expected_quantity, \
                 c.actual_quantity, c.actual_quantity - c.expected_quantity AS difference, \
                 c.checked_at \
                 FROM inventory_check c \
                 LEFT JOIN warehouse w ON w.warehouse_id = c.warehouse_id \
                 LEFT JOIN product p ON p.product_id = c.product_id \
                 ORDER BY c.checked_at DESC LIMIT ?1",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
