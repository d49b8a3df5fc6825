//! Selector catalogs for the vendor's console pages
//!
//! Everything that couples this crate to the vendor's page layout lives
//! here as data: plain selector strings plus the few generator functions
//! for row-indexed cells and deep-link URLs.

/// Login and two-factor form
pub mod login {
    pub const URL: &str = "https://auth.cin7.com/Account/Login";

    pub const USERNAME_FIELD: &str = "#usernameInput";
    pub const PASSWORD_FIELD: &str = "#passwordInput";
    pub const SUBMIT_BUTTON: &str = "#Identity-Forms  [type='submit']";
    /// Substring the login page URL carries
    pub const LOGIN_URL_MARKER: &str = "Login";

    /// Substring the two-factor challenge URL carries
    pub const TWO_FA_URL_MARKER: &str = "LoginWith2fa";
    pub const TWO_FA_FIELD: &str = "#Input_TwoFactorCode";
    pub const TWO_FA_SUBMIT_BUTTON: &str = "#Identity-Forms  [type='submit']";
}

/// Transaction entry page, shared by credit notes and sales orders
pub mod transaction {
    /// Deep link into a transaction, parameterized by the account's
    /// application link id
    pub fn url(app_link_id: &str, order_id: &str) -> String {
        format!(
            "https://go.cin7.com/Cloud/TransactionEntry/TransactionEntry.aspx?idCustomerAppsLink={}&OrderId={}",
            app_link_id, order_id
        )
    }

    pub const ADMIN_BUTTON: &str = "#AdminButton";
    pub const VOID_BUTTON: &str = "#ctl00_ContentPlaceHolder1_DeleteLinkButton";
    pub const SAVE_BUTTON: &str = "#ctl00_ContentPlaceHolder1_SaveButton";
    pub const APPROVE_BUTTON: &str = "#ctl00_ContentPlaceHolder1_ApproveButton";
}

/// Stock grid and the quantity-entry dialog on the transaction page
pub mod stock_grid {
    /// SKU cells across all line rows
    pub const SKU_CELLS: &str = "#StockGrid tr td:nth-child(4) pre";
    /// Line-comment cells; barcodes are embedded here as "Barcode: ..."
    pub const COMMENT_CELLS: &str = "#StockGrid tr td:nth-child(18) pre";

    /// Quantity-moved cell of one row; rows start at nth-child(2)
    pub fn qty_moved_cell(nth_child: usize) -> String {
        format!("#StockGrid tr:nth-child({}) td:nth-child(13)", nth_child)
    }

    pub const ACTUAL_QTY_FIELD: &str = "#SerialNumbers_intQtyItem";
    pub const BATCH_FIELD: &str = "#SerialNumbers_strSerialAvailable";
    pub const SAVE_INTAKE_BUTTON: &str = "#SerialNumber_SaveButton";

    pub const COMPLETED_DATE_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_87";
    pub const COMPLETED_TIME_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_87_Time";
    pub const DOCUMENT_DATE_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_1";
    pub const DOCUMENT_TIME_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_1_Time";
}

/// Header fields of the sales-order form used by the date correction
pub mod order_form {
    pub const COMPLETED_DATE_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_87";
    pub const COMPLETED_TIME_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_87_Time";
    pub const INVOICE_DATE_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_3";
    pub const INVOICE_TIME_FIELD: &str = "#ctl00_ContentPlaceHolder1_datOrders_3_Time";

    pub const DELIVERY_FIRST_NAME_FIELD: &str = "#ctl00_ContentPlaceHolder1_txtOrders_12";
    pub const DELIVERY_LAST_NAME_FIELD: &str = "#ctl00_ContentPlaceHolder1_txtOrders_13";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_url_carries_both_parameters() {
        let url = transaction::url("1387", "4410021");
        assert!(url.contains("idCustomerAppsLink=1387"));
        assert!(url.contains("OrderId=4410021"));
    }

    #[test]
    fn qty_cell_targets_the_requested_row() {
        assert_eq!(
            stock_grid::qty_moved_cell(2),
            "#StockGrid tr:nth-child(2) td:nth-child(13)"
        );
    }
}
