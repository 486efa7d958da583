//! Query DTOs for payroll views.

use chrono::NaiveDate;
use serde::Deserialize;
use tidyhome_core::payroll::PaymentFilter;

/// `GET /payments?paid=&date_from=&date_to=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentListQuery {
    pub paid: Option<bool>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl From<PaymentListQuery> for PaymentFilter {
    fn from(q: PaymentListQuery) -> Self {
        PaymentFilter {
            paid: q.paid,
            date_from: q.date_from,
            date_to: q.date_to,
        }
    }
}
